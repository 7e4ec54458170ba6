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

//! Tradable symbol metadata.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

/// Metadata describing a tradable symbol on a venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    /// Venue symbol in its native form (e.g. `BTC-USDT` on OKX).
    pub symbol: Ustr,
    pub base_asset: Ustr,
    pub quote_asset: Ustr,
    /// Minimum price increment, when published.
    pub tick_size: Option<Decimal>,
    /// Minimum quantity increment, when published.
    pub step_size: Option<Decimal>,
    /// Minimum order notional, when published.
    pub min_notional: Option<Decimal>,
    /// Contract classification for derivatives (e.g. `PERPETUAL`).
    pub contract_type: Option<String>,
    /// Settlement date for delivery contracts.
    pub delivery_date: Option<DateTime<Utc>>,
}

impl SymbolInfo {
    /// Creates metadata for a spot symbol with no exchange filters.
    #[must_use]
    pub fn spot(symbol: &str, base_asset: &str, quote_asset: &str) -> Self {
        Self {
            symbol: Ustr::from(symbol),
            base_asset: Ustr::from(&base_asset.to_uppercase()),
            quote_asset: Ustr::from(&quote_asset.to_uppercase()),
            tick_size: None,
            step_size: None,
            min_notional: None,
            contract_type: None,
            delivery_date: None,
        }
    }
}
