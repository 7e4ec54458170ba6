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

//! [Coinbase Exchange](https://www.coinbase.com) venue connector for Polyfeed.
//!
//! Wraps the public market-data endpoints of the Exchange (formerly GDAX)
//! API — <https://docs.cdp.coinbase.com/exchange/docs> — which is spot-only;
//! every request for another market fails validation before any I/O.
//!
//! Quirks handled here: candle rows are JSON numbers ordered
//! `[time, low, high, open, close, volume]` newest first with
//! second-granularity buckets, and the `side` on trades is the **maker**
//! side, so `side == "buy"` already means the buyer was the maker.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod http;
pub mod provider;
pub mod ws;

// Re-exports
pub use crate::provider::CoinbaseProvider;
