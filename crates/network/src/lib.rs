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

//! Network transports for the Polyfeed market-data library.
//!
//! Provides the rate-limit-cooperative HTTP client, the auto-reconnecting
//! WebSocket client with exponential backoff, and a bounded in-memory sink
//! used as the only persisted state in the workspace.
//!
//! Venue connectors own these transports; nothing in this crate knows about
//! any particular exchange.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod backoff;
pub mod http;
pub mod sink;
pub mod websocket;

// Re-exports
pub use crate::{
    backoff::ExponentialBackoff,
    http::{HttpClient, HttpClientError, HttpResponse},
    sink::InMemorySink,
    websocket::{ConnectionState, WsClient, WsClientError, WsConfig, WsMessage},
};
