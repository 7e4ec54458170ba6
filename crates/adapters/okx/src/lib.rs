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

//! [OKX](https://www.okx.com) venue connector for Polyfeed.
//!
//! Wraps the market-data subset of the **OKX v5 API**
//! (<https://www.okx.com/docs-v5/en/>). Every payload arrives in the
//! `{code, msg, data}` envelope with millisecond timestamps as strings and
//! newest-first candle lists; instruments use dash-separated ids with a
//! `-SWAP` suffix for perpetuals (`BTC-USDT-SWAP`).

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
pub mod ws;

// Re-exports
pub use crate::{provider::OkxProvider, symbol::OkxSymbolMapper};
