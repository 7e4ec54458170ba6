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

//! REST execution: running endpoint specs against the HTTP transport.

use std::sync::Arc;

use polyfeed_model::MarketDataError;
use polyfeed_network::http::{HttpClient, HttpClientError};

use crate::{
    chunking::{ChunkExecutor, ChunkHint, ChunkPlanner},
    endpoint::{HttpMethod, ResponseAdapter, RestEndpointSpec},
    payload::DataPayload,
    request::RequestParams,
};

/// Maps a transport error into the shared taxonomy.
#[must_use]
pub fn map_http_error(error: HttpClientError) -> MarketDataError {
    match error {
        HttpClientError::Network(msg) => MarketDataError::Network(msg),
        HttpClientError::RateLimited { retry_after } => MarketDataError::RateLimit { retry_after },
        HttpClientError::UnexpectedStatus { status, body } => {
            MarketDataError::provider(status.as_str(), body)
        }
        HttpClientError::Json(msg) => MarketDataError::Data(msg),
    }
}

/// Executes a [`RestEndpointSpec`] against the HTTP transport and delegates
/// response decoding to a [`ResponseAdapter`].
///
/// No retry beyond what the transport does, and no chunking awareness —
/// chunking wraps the runner from above via [`fetch_with_chunking`].
#[derive(Clone, Debug)]
pub struct RestRunner {
    client: Arc<HttpClient>,
}

impl RestRunner {
    #[must_use]
    pub fn new(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Returns the underlying HTTP client (for response-hook registration).
    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Runs one endpoint spec with the given parameters.
    ///
    /// # Errors
    ///
    /// Propagates builder validation failures, transport errors (mapped into
    /// the shared taxonomy) and adapter parse failures.
    pub async fn run(
        &self,
        spec: &RestEndpointSpec,
        adapter: &dyn ResponseAdapter,
        params: &RequestParams,
    ) -> Result<DataPayload, MarketDataError> {
        let path = (spec.build_path)(params)?;
        let query = spec.build_query.map(|build| build(params)).transpose()?;
        let body = spec.build_body.map(|build| build(params)).transpose()?;
        let headers = spec.build_headers.map(|build| build(params));

        let response = match spec.method {
            HttpMethod::Get => self.client.get(&path, query.as_deref(), headers).await,
            HttpMethod::Post => self.client.post(&path, body.as_ref(), headers).await,
        }
        .map_err(map_http_error)?;

        let raw: serde_json::Value = response.json().map_err(map_http_error)?;
        adapter.parse(&raw, params)
    }
}

/// Fetches an endpoint with automatic chunking when its spec carries a
/// [`crate::chunking::ChunkPolicy`]; plain single-shot execution otherwise.
///
/// # Errors
///
/// Propagates planner validation failures and any chunk failure (partial
/// aggregates are never returned).
pub async fn fetch_with_chunking(
    runner: &RestRunner,
    spec: &RestEndpointSpec,
    adapter: &dyn ResponseAdapter,
    params: &RequestParams,
) -> Result<DataPayload, MarketDataError> {
    let Some(policy) = spec.chunk_policy else {
        return runner.run(spec, adapter, params).await;
    };
    if !policy.supports_auto_chunking {
        return runner.run(spec, adapter, params).await;
    }

    let hint = spec.chunk_hint.unwrap_or_default();
    let planner = ChunkPlanner::new(spec.id, policy, hint);
    let plans = planner.plan(
        params.limit,
        params.start_time,
        params.end_time,
        params.timeframe,
        params.max_chunks,
    )?;

    let executor = ChunkExecutor::new(spec.id, policy, hint, spec.weight_policy);
    let result = executor
        .execute(
            plans,
            spec.next_cursor,
            params.limit,
            params.max_chunks,
            |plan| {
                let mut chunk_params = params.clone();
                chunk_params.apply_plan(&plan);
                async move { runner.run(spec, adapter, &chunk_params).await }
            },
        )
        .await?;

    Ok(result.data)
}
