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

//! The unified MEXC data provider (REST only).

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use futures::stream::BoxStream;
use polyfeed_model::{Exchange, MarketDataError, MarketType};
use polyfeed_network::http::{HttpClient, POLYFEED_USER_AGENT};
use polyfeed_runtime::{
    DataPayload, DataProvider, DataRequest, RequestParams, RestRunner, StreamItem,
    fetch_with_chunking,
    symbol::{PassthroughMapper, SymbolMapper},
};

use crate::http;

/// Unified provider for MEXC spot market data and contract open interest.
pub struct MexcProvider {
    client: Arc<HttpClient>,
    runner: RestRunner,
    mapper: PassthroughMapper,
}

impl Debug for MexcProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(MexcProvider)).finish_non_exhaustive()
    }
}

impl Default for MexcProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MexcProvider {
    /// Creates a provider with an owned HTTP client.
    #[must_use]
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let client = Arc::new(HttpClient::new(
            None,
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
            mapper: PassthroughMapper,
        }
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
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
impl DataProvider for MexcProvider {
    fn exchange(&self) -> Exchange {
        Exchange::Mexc
    }

    async fn fetch(&self, request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        if request.market_type == MarketType::Options {
            return Err(MarketDataError::Validation(
                "MEXC options market data is not supported".to_string(),
            ));
        }
        let entry =
            http::endpoints::rest_entry(request.feature, request.market_type).ok_or_else(|| {
                MarketDataError::Capability(format!(
                    "mexc does not serve {} on the {} market",
                    request.feature, request.market_type
                ))
            })?;
        let params = self.resolve_params(request)?;
        fetch_with_chunking(&self.runner, &entry.spec, entry.adapter, &params).await
    }

    async fn stream(
        &self,
        request: &DataRequest,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError> {
        Err(MarketDataError::Capability(format!(
            "mexc does not serve {} over WebSocket",
            request.feature
        )))
    }

    async fn close(&self) {
        tracing::debug!("MEXC provider closed");
    }
}

#[cfg(test)]
mod tests {
    use polyfeed_model::DataFeature;
    use polyfeed_runtime::DataRequestBuilder;

    use super::*;

    #[tokio::test]
    async fn spot_order_book_is_a_capability_error() {
        let provider = MexcProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::OrderBook)
            .exchange(Exchange::Mexc)
            .symbol("BTCUSDT")
            .build()
            .unwrap();
        let result = provider.fetch(&request).await;
        assert!(matches!(result, Err(MarketDataError::Capability(_))));
    }

    #[tokio::test]
    async fn streaming_is_a_capability_error() {
        let provider = MexcProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Mexc)
            .symbol("BTCUSDT")
            .build()
            .unwrap();
        let result = provider.stream(&request).await;
        assert!(matches!(result, Err(MarketDataError::Capability(_))));
    }
}
