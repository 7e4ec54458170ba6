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

//! Declarative endpoint specifications and adapter contracts.
//!
//! A venue's REST surface is a table of [`RestEndpointSpec`]s — records of
//! pure builder functions over [`RequestParams`] — paired with
//! [`ResponseAdapter`]s that own all payload knowledge. WebSocket surfaces
//! are [`WsEndpointSpec`]s paired with [`MessageAdapter`]s. Runners never
//! inspect payloads.

use std::fmt::Debug;

use polyfeed_model::MarketDataError;

use crate::{
    chunking::{ChunkHint, ChunkPolicy, WeightPolicy},
    payload::{DataPayload, StreamItem},
    request::RequestParams,
};

/// HTTP method of a REST endpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Builds the request path (may be absolute to override the base URL).
pub type PathBuilder = fn(&RequestParams) -> Result<String, MarketDataError>;
/// Builds query parameters as ordered pairs.
pub type QueryBuilder = fn(&RequestParams) -> Result<Vec<(String, String)>, MarketDataError>;
/// Builds a JSON request body.
pub type BodyBuilder = fn(&RequestParams) -> Result<serde_json::Value, MarketDataError>;
/// Builds additional request headers.
pub type HeaderBuilder = fn(&RequestParams) -> Vec<(String, String)>;
/// Extracts the next-page cursor from a parsed chunk, if pagination continues.
pub type CursorExtractor = fn(&DataPayload) -> Option<serde_json::Value>;

/// Declarative description of one REST endpoint.
///
/// All builder fields are pure functions over the parameter bag; chunking
/// metadata is attached here so the planner needs no venue knowledge.
#[derive(Copy, Clone, Debug)]
pub struct RestEndpointSpec {
    /// Stable endpoint identifier used in telemetry (e.g. `"binance.ohlcv"`).
    pub id: &'static str,
    pub method: HttpMethod,
    pub build_path: PathBuilder,
    pub build_query: Option<QueryBuilder>,
    pub build_body: Option<BodyBuilder>,
    pub build_headers: Option<HeaderBuilder>,
    pub next_cursor: Option<CursorExtractor>,
    pub chunk_policy: Option<ChunkPolicy>,
    pub chunk_hint: Option<ChunkHint>,
    pub weight_policy: Option<WeightPolicy>,
}

impl RestEndpointSpec {
    /// Creates a GET endpoint with only a path builder.
    #[must_use]
    pub const fn get(id: &'static str, build_path: PathBuilder) -> Self {
        Self {
            id,
            method: HttpMethod::Get,
            build_path,
            build_query: None,
            build_body: None,
            build_headers: None,
            next_cursor: None,
            chunk_policy: None,
            chunk_hint: None,
            weight_policy: None,
        }
    }

    /// Creates a POST endpoint with a path and body builder.
    #[must_use]
    pub const fn post(id: &'static str, build_path: PathBuilder, build_body: BodyBuilder) -> Self {
        Self {
            id,
            method: HttpMethod::Post,
            build_path,
            build_query: None,
            build_body: Some(build_body),
            build_headers: None,
            next_cursor: None,
            chunk_policy: None,
            chunk_hint: None,
            weight_policy: None,
        }
    }

    /// Attaches a query builder.
    #[must_use]
    pub const fn with_query(mut self, build_query: QueryBuilder) -> Self {
        self.build_query = Some(build_query);
        self
    }

    /// Attaches chunking metadata.
    #[must_use]
    pub const fn with_chunking(mut self, policy: ChunkPolicy, hint: ChunkHint) -> Self {
        self.chunk_policy = Some(policy);
        self.chunk_hint = Some(hint);
        self
    }

    /// Attaches a weight policy for rate-limit telemetry.
    #[must_use]
    pub const fn with_weight(mut self, weight_policy: WeightPolicy) -> Self {
        self.weight_policy = Some(weight_policy);
        self
    }

    /// Attaches a cursor extractor for cursor-windowed pagination.
    #[must_use]
    pub const fn with_cursor(mut self, next_cursor: CursorExtractor) -> Self {
        self.next_cursor = Some(next_cursor);
        self
    }
}

/// Builds the stream name for one symbol (e.g. `btcusdt@kline_1m`).
pub type StreamNameBuilder = fn(&str, &RequestParams) -> Result<String, MarketDataError>;
/// Builds the URL for a single-stream connection.
pub type SingleUrlBuilder = fn(&RequestParams, &str) -> String;
/// Builds the URL for a combined (multiplexed) connection.
pub type CombinedUrlBuilder = fn(&RequestParams, &[String]) -> String;
/// Builds post-connect subscription frames for venues that subscribe via ops.
pub type SubscribeBuilder = fn(&[String]) -> Vec<serde_json::Value>;

/// Declarative description of one WebSocket endpoint.
#[derive(Copy, Clone, Debug)]
pub struct WsEndpointSpec {
    /// Stable endpoint identifier used in telemetry (e.g. `"bybit.ws.ohlcv"`).
    pub id: &'static str,
    /// Whether one connection may multiplex several streams.
    pub combined_supported: bool,
    /// Per-connection topic cap; `1` for single-stream venues.
    pub max_streams_per_connection: usize,
    pub build_stream_name: StreamNameBuilder,
    pub build_single_url: SingleUrlBuilder,
    pub build_combined_url: CombinedUrlBuilder,
    /// Subscription frames sent after connect (and again after reconnect);
    /// `None` for venues that encode streams in the URL.
    pub build_subscribe_payloads: Option<SubscribeBuilder>,
    /// Application-level heartbeat interval, when the venue expects one.
    pub heartbeat_secs: Option<u64>,
    /// Heartbeat frame (e.g. `{"op":"ping"}` on Bybit).
    pub heartbeat_msg: Option<&'static str>,
}

/// One row of a venue's REST registry: the spec plus its response adapter.
#[derive(Copy, Clone, Debug)]
pub struct RestEntry {
    pub spec: RestEndpointSpec,
    pub adapter: &'static dyn ResponseAdapter,
}

/// One row of a venue's WebSocket registry: the spec plus its message
/// adapter.
#[derive(Copy, Clone, Debug)]
pub struct WsEntry {
    pub spec: WsEndpointSpec,
    pub adapter: &'static dyn MessageAdapter,
}

/// Normalizes one venue's REST response into a [`DataPayload`].
///
/// Implementations validate the venue envelope, convert units to the internal
/// representation and enforce ascending ordering before constructing domain
/// types.
pub trait ResponseAdapter: Send + Sync + Debug {
    /// Parses a decoded JSON response.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Provider`] for venue-signaled errors and
    /// [`MarketDataError::Data`] for structural mismatches.
    fn parse(
        &self,
        raw: &serde_json::Value,
        params: &RequestParams,
    ) -> Result<DataPayload, MarketDataError>;
}

/// Normalizes one venue's WebSocket messages into [`StreamItem`]s.
pub trait MessageAdapter: Send + Sync + Debug {
    /// Cheap relevance check before parsing.
    fn is_relevant(&self, payload: &serde_json::Value) -> bool;

    /// Parses a relevant message into zero or more stream items.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Data`] for structural mismatches; the
    /// stream runner logs and drops the message.
    fn parse(&self, payload: &serde_json::Value) -> Result<Vec<StreamItem>, MarketDataError>;
}
