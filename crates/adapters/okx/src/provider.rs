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

//! The unified OKX data provider.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use futures::stream::BoxStream;
use polyfeed_model::{DataFeature, Exchange, MarketDataError, MarketType};
use polyfeed_network::http::{HttpClient, POLYFEED_USER_AGENT};
use polyfeed_runtime::{
    DataPayload, DataProvider, DataRequest, RequestParams, RestRunner, StreamFilters, StreamItem,
    StreamRunner, fetch_with_chunking, symbol::SymbolMapper,
};
use ustr::Ustr;

use crate::{config, http, symbol::OkxSymbolMapper, ws};

/// Unified provider for OKX spot and swap market data.
pub struct OkxProvider {
    client: Arc<HttpClient>,
    runner: RestRunner,
    mapper: OkxSymbolMapper,
}

impl Debug for OkxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(OkxProvider)).finish_non_exhaustive()
    }
}

impl Default for OkxProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl OkxProvider {
    /// Creates a provider with an owned HTTP client.
    #[must_use]
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let client = Arc::new(HttpClient::new(
            Some(config::OKX_HTTP_URL.to_string()),
            vec![("user-agent".to_string(), POLYFEED_USER_AGENT.to_string())],
            timeout_secs,
        ));
        Self::with_client(client)
    }

    /// Creates a provider around an injected HTTP client.
    #[must_use]
    pub fn with_client(client: Arc<HttpClient>) -> Self {
        Self {
            runner: RestRunner::new(Arc::clone(&client)),
            client,
            mapper: OkxSymbolMapper,
        }
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    fn validate(&self, request: &DataRequest) -> Result<(), MarketDataError> {
        if request.market_type == MarketType::Options {
            return Err(MarketDataError::Validation(
                "OKX options market data is not supported".to_string(),
            ));
        }
        let derivatives_only = matches!(
            request.feature,
            DataFeature::OpenInterest | DataFeature::FundingRate
        );
        if derivatives_only && request.market_type == MarketType::Spot {
            return Err(MarketDataError::Validation(format!(
                "{} is not available on the OKX spot market",
                request.feature
            )));
        }
        Ok(())
    }

    fn resolve_params(&self, request: &DataRequest) -> Result<RequestParams, MarketDataError> {
        let variant = request.resolve_variant()?;
        let mut params = RequestParams::from_request(request, variant);
        if let Some(symbol) = params.symbol {
            params.venue_symbol =
                Some(self.mapper.to_venue(symbol.as_str(), request.market_type)?);
        }
        Ok(params)
    }
}

#[async_trait]
impl DataProvider for OkxProvider {
    fn exchange(&self) -> Exchange {
        Exchange::Okx
    }

    async fn fetch(&self, request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        self.validate(request)?;
        let entry = http::endpoints::rest_entry(request.feature).ok_or_else(|| {
            MarketDataError::Capability(format!("okx does not serve {} over REST", request.feature))
        })?;
        let params = self.resolve_params(request)?;
        fetch_with_chunking(&self.runner, &entry.spec, entry.adapter, &params).await
    }

    async fn stream(
        &self,
        request: &DataRequest,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError> {
        self.validate(request)?;
        let entry = ws::endpoints::ws_entry(request.feature).ok_or_else(|| {
            MarketDataError::Capability(format!(
                "okx does not serve {} over WebSocket",
                request.feature
            ))
        })?;
        let params = self.resolve_params(request)?;

        let mut venue_symbols = Vec::with_capacity(params.symbols.len());
        for symbol in &params.symbols {
            let venue = self.mapper.to_venue(symbol.as_str(), request.market_type)?;
            venue_symbols.push(Ustr::from(&venue));
        }

        let filters = StreamFilters::new(request.closed_only, request.throttle_ms, request.dedupe);
        StreamRunner::open(entry.spec, entry.adapter, &venue_symbols, &params, filters).await
    }

    async fn close(&self) {
        tracing::debug!("OKX provider closed");
    }
}
