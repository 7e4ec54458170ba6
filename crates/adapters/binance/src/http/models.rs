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

//! Data transfer objects for deserializing Binance HTTP payloads.

use serde::Deserialize;
use ustr::Ustr;

/// A trade row from `/api/v3/trades`, `/api/v3/historicalTrades` and the
/// futures equivalents.
///
/// # References
/// - <https://developers.binance.com/docs/binance-spot-api-docs/rest-api#recent-trades-list>
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTradeRaw {
    pub id: u64,
    pub price: String,
    pub qty: String,
    pub quote_qty: Option<String>,
    pub time: i64,
    pub is_buyer_maker: bool,
    pub is_best_match: Option<bool>,
}

/// An order-book snapshot from `/api/v3/depth` / `/fapi/v1/depth`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceDepthRaw {
    pub last_update_id: u64,
    /// Event time, present on futures only.
    #[serde(rename = "E")]
    pub event_time: Option<i64>,
    /// Transaction time, present on futures only.
    #[serde(rename = "T")]
    pub transaction_time: Option<i64>,
    pub bids: Vec<[String; 2]>,
    pub asks: Vec<[String; 2]>,
}

/// An exchange filter entry inside `exchangeInfo` symbols.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbolFilterRaw {
    pub filter_type: String,
    pub tick_size: Option<String>,
    pub step_size: Option<String>,
    pub min_notional: Option<String>,
    /// Spot `NOTIONAL` filter spells the field differently.
    pub notional: Option<String>,
}

/// A symbol row inside `exchangeInfo`.
///
/// # References
/// - <https://developers.binance.com/docs/binance-spot-api-docs/rest-api#exchange-information>
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceSymbolRaw {
    pub symbol: Ustr,
    pub base_asset: String,
    pub quote_asset: String,
    pub status: Option<String>,
    pub contract_type: Option<String>,
    pub delivery_date: Option<i64>,
    #[serde(default)]
    pub filters: Vec<BinanceSymbolFilterRaw>,
}

/// The `exchangeInfo` envelope.
#[derive(Clone, Debug, Deserialize)]
pub struct BinanceExchangeInfoRaw {
    pub symbols: Vec<BinanceSymbolRaw>,
}

/// Current open interest from `/fapi/v1/openInterest`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceOpenInterestRaw {
    pub symbol: Ustr,
    pub open_interest: String,
    pub time: i64,
}

/// Historical open interest row from `/futures/data/openInterestHist`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceOpenInterestHistRaw {
    pub symbol: Ustr,
    pub sum_open_interest: String,
    pub sum_open_interest_value: Option<String>,
    pub timestamp: i64,
}

/// Funding rate row from `/fapi/v1/fundingRate`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceFundingRateRaw {
    pub symbol: Ustr,
    pub funding_time: i64,
    pub funding_rate: String,
    pub mark_price: Option<String>,
}

/// Premium index (mark price) payload from `/fapi/v1/premiumIndex`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinancePremiumIndexRaw {
    pub symbol: Ustr,
    pub mark_price: String,
    pub index_price: Option<String>,
    pub last_funding_rate: Option<String>,
    pub next_funding_time: Option<i64>,
    pub time: i64,
}
