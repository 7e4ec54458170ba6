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

//! Data transfer objects for deserializing Coinbase Exchange payloads.

use serde::Deserialize;
use ustr::Ustr;

/// A trade row from `GET /products/{id}/trades`.
///
/// `side` is the **maker** order side.
#[derive(Clone, Debug, Deserialize)]
pub struct CoinbaseTradeRaw {
    pub time: String,
    pub trade_id: u64,
    pub price: String,
    pub size: String,
    pub side: String,
}

/// A level-2 order book from `GET /products/{id}/book?level=2`.
///
/// Levels are `[price, size, num_orders]`.
#[derive(Clone, Debug, Deserialize)]
pub struct CoinbaseBookRaw {
    pub sequence: u64,
    pub bids: Vec<serde_json::Value>,
    pub asks: Vec<serde_json::Value>,
    pub time: Option<String>,
}

/// A product row from `GET /products`.
#[derive(Clone, Debug, Deserialize)]
pub struct CoinbaseProductRaw {
    pub id: Ustr,
    pub base_currency: String,
    pub quote_currency: String,
    pub quote_increment: Option<String>,
    pub base_increment: Option<String>,
    pub min_market_funds: Option<String>,
    pub status: Option<String>,
}
