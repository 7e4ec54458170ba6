// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Data transfer objects for deserializing Bybit v5 HTTP payloads.

use serde::Deserialize;
use ustr::Ustr;

/// The v5 response envelope wrapping every REST payload.
///
/// # References
/// - <https://bybit-exchange.github.io/docs/v5/error>
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitResponse<T> {
    pub ret_code: i64,
    pub ret_msg: String,
    pub result: Option<T>,
}

/// Kline payload: rows are `[start, open, high, low, close, volume, turnover]`
/// strings, newest first.
#[derive(Clone, Debug, Deserialize)]
pub struct BybitKlineResult {
    pub symbol: Option<Ustr>,
    pub category: Option<String>,
    pub list: Vec<Vec<String>>,
}

/// Recent trade row.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitTradeRaw {
    pub exec_id: String,
    pub symbol: Ustr,
    pub price: String,
    pub size: String,
    /// Taker side: `Buy` means the aggressor bought.
    pub side: String,
    pub time: String,
}

/// List container used by trades, instruments and funding payloads.
#[derive(Clone, Debug, Deserialize)]
pub struct BybitListResult<T> {
    pub list: Vec<T>,
}

/// Order book payload.
#[derive(Clone, Debug, Deserialize)]
pub struct BybitOrderBookResult {
    /// Symbol.
    pub s: Ustr,
    /// Bid levels `[price, size]`, best first.
    pub b: Vec<[String; 2]>,
    /// Ask levels `[price, size]`, best first.
    pub a: Vec<[String; 2]>,
    /// Snapshot timestamp (ms).
    pub ts: i64,
    /// Update id.
    pub u: u64,
}

/// Open-interest history row (`timestamp` is a millisecond string).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitOpenInterestRaw {
    pub open_interest: String,
    pub timestamp: String,
}

/// Funding-rate history row.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BybitFundingRateRaw {
    pub symbol: Ustr,
    pub funding_rate: String,
    pub funding_rate_timestamp: String,
}
