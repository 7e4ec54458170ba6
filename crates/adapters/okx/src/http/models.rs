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

//! Data transfer objects for deserializing OKX v5 HTTP payloads.

use serde::Deserialize;
use ustr::Ustr;

/// The v5 response envelope: `code` is `"0"` on success and `data` always an
/// array.
///
/// # References
/// - <https://www.okx.com/docs-v5/en/#error-codes>
#[derive(Clone, Debug, Deserialize)]
pub struct OkxResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// A trade row from `/api/v5/market/trades`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTradeRaw {
    pub inst_id: Ustr,
    pub trade_id: String,
    pub px: String,
    pub sz: String,
    /// Taker side, `buy` or `sell`.
    pub side: String,
    pub ts: String,
}

/// An order-book snapshot from `/api/v5/market/books`.
#[derive(Clone, Debug, Deserialize)]
pub struct OkxBookRaw {
    /// Levels are `[price, size, liquidated orders, order count]`.
    pub bids: Vec<Vec<String>>,
    pub asks: Vec<Vec<String>>,
    pub ts: String,
}

/// An instrument row from `/api/v5/public/instruments`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxInstrumentRaw {
    pub inst_id: Ustr,
    pub inst_type: String,
    #[serde(default)]
    pub base_ccy: String,
    #[serde(default)]
    pub quote_ccy: String,
    /// Contract settlement currency, set for derivatives.
    #[serde(default)]
    pub settle_ccy: String,
    /// `linear` or `inverse`, set for derivatives.
    #[serde(default)]
    pub ct_type: String,
    #[serde(default)]
    pub tick_sz: String,
    #[serde(default)]
    pub lot_sz: String,
    #[serde(default)]
    pub exp_time: String,
    /// Underlying (e.g. `BTC-USDT`), set for derivatives.
    #[serde(default)]
    pub uly: String,
}

/// An open-interest row from `/api/v5/public/open-interest`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxOpenInterestRaw {
    pub inst_id: Ustr,
    pub oi: String,
    #[serde(default)]
    pub oi_ccy: String,
    pub ts: String,
}

/// A funding-rate row (current or historical).
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxFundingRateRaw {
    pub inst_id: Ustr,
    pub funding_rate: String,
    pub funding_time: String,
}
