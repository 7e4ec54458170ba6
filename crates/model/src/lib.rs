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

//! Domain model for the Polyfeed market-data aggregation library.
//!
//! The `polyfeed-model` crate defines the immutable value types shared by every
//! venue connector — bars, trades, order books, derivatives data and symbol
//! metadata — together with the wire-facing enumerations and the error
//! taxonomy used across the workspace.
//!
//! All monetary values are [`rust_decimal::Decimal`] (never binary floats) and
//! all timestamps are UTC [`chrono::DateTime`]s. Venue-specific units
//! (milliseconds, microseconds, seconds) are converted at the adapter boundary
//! using the helpers in [`time`].

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod data;
pub mod enums;
pub mod errors;
pub mod time;

// Re-exports
pub use crate::{
    data::{
        Bar, BookLevel, FundingRate, Liquidation, MarkPrice, Ohlcv, OpenInterest, OrderBook,
        SeriesMeta, StreamingBar, SymbolInfo, Trade,
    },
    enums::{
        DataFeature, Exchange, InstrumentType, MarketType, MarketVariant, Side, Timeframe,
        TransportKind,
    },
    errors::MarketDataError,
};
