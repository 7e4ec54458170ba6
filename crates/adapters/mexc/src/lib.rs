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

//! [MEXC](https://www.mexc.com) venue connector for Polyfeed (REST only).
//!
//! The spot API (<https://mexcdevelop.github.io/apidocs/spot_v3_en/>) is
//! Binance-shaped; the contract API under `contract.mexc.com` wraps payloads
//! in `{success, code, data}` and uses underscore symbols (`BTC_USDT`).
//! Only current open interest is exposed from the contract side.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod http;
pub mod provider;

// Re-exports
pub use crate::provider::MexcProvider;
