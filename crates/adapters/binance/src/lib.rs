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

//! [Binance](https://www.binance.com) venue connector for Polyfeed.
//!
//! Covers the spot (`/api/v3`) and USDⓈ-M futures (`/fapi/v1`) market-data
//! surfaces plus the public market streams. The official API reference can be
//! found at <https://developers.binance.com/docs>.
//!
//! Binance timestamps are milliseconds, prices are decimal strings, and the
//! `m` flag on trades already encodes buyer-is-maker, so normalization here
//! is the lightest of all venues.

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
pub use crate::provider::BinanceProvider;
