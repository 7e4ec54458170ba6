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

//! Order book snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::errors::MarketDataError;

/// One aggregated price level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

impl BookLevel {
    #[must_use]
    pub const fn new(price: Decimal, quantity: Decimal) -> Self {
        Self { price, quantity }
    }
}

/// An order book snapshot with bids descending and asks ascending.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Upper-case symbol the book belongs to.
    pub symbol: Ustr,
    /// Venue sequence / update id for the snapshot.
    pub last_update_id: u64,
    /// Bid levels, best (highest) first.
    pub bids: Vec<BookLevel>,
    /// Ask levels, best (lowest) first.
    pub asks: Vec<BookLevel>,
    /// UTC snapshot time.
    pub ts: DateTime<Utc>,
}

impl OrderBook {
    /// Creates a validated snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when either side is empty,
    /// bids are not strictly descending, or asks are not strictly ascending.
    pub fn new(
        symbol: &str,
        last_update_id: u64,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
        ts: DateTime<Utc>,
    ) -> Result<Self, MarketDataError> {
        if bids.is_empty() || asks.is_empty() {
            return Err(MarketDataError::Validation(
                "Order book requires at least one level on each side".to_string(),
            ));
        }
        for pair in bids.windows(2) {
            if pair[1].price >= pair[0].price {
                return Err(MarketDataError::Validation(format!(
                    "Bids must be strictly descending: {} !> {}",
                    pair[0].price, pair[1].price
                )));
            }
        }
        for pair in asks.windows(2) {
            if pair[1].price <= pair[0].price {
                return Err(MarketDataError::Validation(format!(
                    "Asks must be strictly ascending: {} !< {}",
                    pair[0].price, pair[1].price
                )));
            }
        }
        Ok(Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            last_update_id,
            bids,
            asks,
            ts,
        })
    }

    /// Best bid price, if any depth remains.
    #[must_use]
    pub fn best_bid(&self) -> Option<&BookLevel> {
        self.bids.first()
    }

    /// Best ask price, if any depth remains.
    #[must_use]
    pub fn best_ask(&self) -> Option<&BookLevel> {
        self.asks.first()
    }
}
