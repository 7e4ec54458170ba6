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

//! Executed trades (ticks).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::errors::MarketDataError;

/// A single executed trade.
///
/// `is_buyer_maker` follows the Binance convention: `true` when the resting
/// (maker) order was the buy side, i.e. the aggressor sold. Adapters for
/// venues that report the taker side instead derive this flag during parsing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Upper-case symbol the trade was executed on.
    pub symbol: Ustr,
    /// Venue trade identifier (synthesized for venues without numeric ids).
    pub trade_id: u64,
    pub price: Decimal,
    pub quantity: Decimal,
    /// Quote-denominated size, when the venue reports it.
    pub quote_quantity: Option<Decimal>,
    /// UTC execution time.
    pub ts: DateTime<Utc>,
    pub is_buyer_maker: bool,
    /// Binance-only best-match flag; `None` elsewhere.
    pub is_best_match: Option<bool>,
}

impl Trade {
    /// Creates a validated trade.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when price or quantity is not
    /// strictly positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: &str,
        trade_id: u64,
        price: Decimal,
        quantity: Decimal,
        quote_quantity: Option<Decimal>,
        ts: DateTime<Utc>,
        is_buyer_maker: bool,
        is_best_match: Option<bool>,
    ) -> Result<Self, MarketDataError> {
        if price <= Decimal::ZERO {
            return Err(MarketDataError::Validation(format!(
                "Trade price must be positive, was {price}"
            )));
        }
        if quantity <= Decimal::ZERO {
            return Err(MarketDataError::Validation(format!(
                "Trade quantity must be positive, was {quantity}"
            )));
        }
        Ok(Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            trade_id,
            price,
            quantity,
            quote_quantity,
            ts,
            is_buyer_maker,
            is_best_match,
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::time::ms_to_datetime;

    #[test]
    fn trade_rejects_non_positive_price_and_quantity() {
        let ts = ms_to_datetime(1_700_000_000_000).unwrap();
        assert!(Trade::new("BTCUSDT", 1, dec!(0), dec!(1), None, ts, false, None).is_err());
        assert!(Trade::new("BTCUSDT", 1, dec!(1), dec!(-1), None, ts, false, None).is_err());

        let trade = Trade::new("btcusdt", 1, dec!(1), dec!(2), None, ts, true, None).unwrap();
        assert_eq!(trade.symbol.as_str(), "BTCUSDT");
    }
}
