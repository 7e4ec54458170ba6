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

//! Derivatives market data: open interest, funding, mark prices, liquidations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::enums::Side;

/// An open-interest sample.
///
/// The timestamp is the venue's reported sample time; venues that only expose
/// current open interest return a single sample stamped by the venue, not a
/// client-chosen window.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenInterest {
    pub symbol: Ustr,
    /// Venue-reported sample time (UTC).
    pub ts: DateTime<Utc>,
    /// Open interest in contracts (or base units, per venue).
    pub open_interest: Decimal,
    /// Quote-denominated open interest value, when reported.
    pub open_interest_value: Option<Decimal>,
}

impl OpenInterest {
    #[must_use]
    pub fn new(
        symbol: &str,
        ts: DateTime<Utc>,
        open_interest: Decimal,
        open_interest_value: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            ts,
            open_interest,
            open_interest_value,
        }
    }
}

/// A funding-rate settlement (or the upcoming rate, for current queries).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingRate {
    pub symbol: Ustr,
    /// UTC settlement time of the rate.
    pub funding_time: DateTime<Utc>,
    pub funding_rate: Decimal,
    /// Mark price at settlement, when the venue reports it.
    pub mark_price: Option<Decimal>,
}

impl FundingRate {
    #[must_use]
    pub fn new(
        symbol: &str,
        funding_time: DateTime<Utc>,
        funding_rate: Decimal,
        mark_price: Option<Decimal>,
    ) -> Self {
        Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            funding_time,
            funding_rate,
            mark_price,
        }
    }
}

/// A mark-price update for a derivatives contract.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkPrice {
    pub symbol: Ustr,
    pub mark_price: Decimal,
    pub index_price: Option<Decimal>,
    pub last_funding_rate: Option<Decimal>,
    /// UTC time of the next funding settlement, when known.
    pub next_funding_time: Option<DateTime<Utc>>,
    /// UTC event time.
    pub ts: DateTime<Utc>,
}

impl MarkPrice {
    #[must_use]
    pub fn new(
        symbol: &str,
        mark_price: Decimal,
        index_price: Option<Decimal>,
        last_funding_rate: Option<Decimal>,
        next_funding_time: Option<DateTime<Utc>>,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            mark_price,
            index_price,
            last_funding_rate,
            next_funding_time,
            ts,
        }
    }
}

/// A forced liquidation order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidation {
    pub symbol: Ustr,
    /// Side of the forced order (a `Sell` liquidation closes a long).
    pub side: Side,
    /// Contract quantity liquidated.
    pub quantity: Decimal,
    /// Order price of the forced order.
    pub price: Decimal,
    /// Average fill price, when reported.
    pub avg_price: Option<Decimal>,
    /// UTC event time.
    pub ts: DateTime<Utc>,
}

impl Liquidation {
    #[must_use]
    pub fn new(
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
        avg_price: Option<Decimal>,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            side,
            quantity,
            price,
            avg_price,
            ts,
        }
    }
}
