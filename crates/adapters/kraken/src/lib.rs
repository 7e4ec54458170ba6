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

//! [Kraken](https://www.kraken.com) venue connector for Polyfeed.
//!
//! Spot market data comes from the classic REST API
//! (<https://docs.kraken.com/api/docs/rest-api/get-ohlc-data>) whose
//! `{error: [], result: {…}}` envelope keys payloads by pair name and spells
//! Bitcoin `XBT`; derivatives data (open interest, funding) comes from the
//! separate futures API under `futures.kraken.com`. The futures OHLC
//! endpoint name differs per contract variant and is kept as a per-variant
//! constant in [`config`], with only the spot history path wired to fetches.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod http;
pub mod provider;
pub mod symbol;

// Re-exports
pub use crate::{provider::KrakenProvider, symbol::KrakenSymbolMapper};
