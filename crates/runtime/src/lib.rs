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

//! Request pipeline and runtimes shared by every venue connector.
//!
//! This crate carries the capability-routed request model ([`DataRequest`],
//! [`RequestParams`]), the declarative endpoint contracts
//! ([`RestEndpointSpec`], [`WsEndpointSpec`], [`ResponseAdapter`],
//! [`MessageAdapter`]), the REST runner, the chunking engine that splits
//! over-limit historical requests into windowed sub-requests, the streaming
//! runtime with its filter chain, the static capability registry and the
//! symbol mapping contract.
//!
//! Venue crates contribute endpoint tables and adapters; nothing here issues
//! a request on its own.

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod capability;
pub mod chunking;
pub mod endpoint;
pub mod json;
pub mod payload;
pub mod provider;
pub mod request;
pub mod rest;
pub mod stream;
pub mod symbol;

// Re-exports
pub use crate::{
    capability::{CapabilityKey, CapabilitySource, CapabilityStatus, supports},
    chunking::{ChunkHint, ChunkPlan, ChunkPlanner, ChunkPolicy, ChunkResult, WeightPolicy},
    endpoint::{
        HttpMethod, MessageAdapter, ResponseAdapter, RestEndpointSpec, RestEntry, WsEndpointSpec,
        WsEntry,
    },
    payload::{DataPayload, StreamItem},
    provider::DataProvider,
    request::{DataRequest, DataRequestBuilder, RequestParams},
    rest::{RestRunner, fetch_with_chunking},
    stream::{StreamFilters, StreamRunner},
    symbol::{SymbolMapper, SymbolSpec},
};
