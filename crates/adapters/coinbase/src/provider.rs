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

//! The unified Coinbase Exchange data provider (spot only).

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use futures::stream::BoxStream;
use polyfeed_model::{Exchange, MarketDataError, MarketType, MarketVariant};
use polyfeed_network::http::{HttpClient, POLYFEED_USER_AGENT};
use polyfeed_runtime::{
    DataPayload, DataProvider, DataRequest, RequestParams, RestRunner, StreamFilters, StreamItem,
    StreamRunner, fetch_with_chunking,
    symbol::{DashPairMapper, SymbolMapper},
};
use ustr::Ustr;

use crate::{config, http, ws};

/// Unified provider for Coinbase Exchange market data.
///
/// Coinbase Exchange serves spot markets only: any request for futures or
/// options fails validation immediately, with no network activity.
pub struct CoinbaseProvider {
    client: Arc<HttpClient>,
    runner: RestRunner,
    mapper: DashPairMapper,
}

impl Debug for CoinbaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CoinbaseProvider))
            .finish_non_exhaustive()
    }
}

impl Default for CoinbaseProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CoinbaseProvider {
    /// Creates a provider with an owned HTTP client.
    #[must_use]
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let client = Arc::new(HttpClient::new(
            Some(config::COINBASE_HTTP_URL.to_string()),
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
            mapper: DashPairMapper,
        }
    }

    /// Returns the underlying HTTP client.
    #[must_use]
    pub fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    fn validate(&self, request: &DataRequest) -> Result<(), MarketDataError> {
        if request.market_type != MarketType::Spot {
            return Err(MarketDataError::Validation(format!(
                "Coinbase Exchange serves spot markets only, got {}",
                request.market_type
            )));
        }
        Ok(())
    }

    fn resolve_params(&self, request: &DataRequest) -> Result<RequestParams, MarketDataError> {
        let mut params = RequestParams::from_request(request, MarketVariant::Spot);
        if let Some(symbol) = params.symbol {
            params.venue_symbol =
                Some(self.mapper.to_venue(symbol.as_str(), request.market_type)?);
        }
        Ok(params)
    }
}

#[async_trait]
impl DataProvider for CoinbaseProvider {
    fn exchange(&self) -> Exchange {
        Exchange::Coinbase
    }

    async fn fetch(&self, request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        self.validate(request)?;
        let entry = http::endpoints::rest_entry(request.feature).ok_or_else(|| {
            MarketDataError::Capability(format!(
                "coinbase does not serve {} over REST",
                request.feature
            ))
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
                "coinbase does not serve {} over WebSocket",
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
        tracing::debug!("Coinbase provider closed");
    }
}

#[cfg(test)]
mod tests {
    use polyfeed_model::DataFeature;
    use polyfeed_runtime::DataRequestBuilder;

    use super::*;

    #[tokio::test]
    async fn futures_market_fails_validation_without_io() {
        let provider = CoinbaseProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Coinbase)
            .market_type(MarketType::Futures)
            .symbol("BTC-USD")
            .build()
            .unwrap();

        let result = provider.fetch(&request).await;
        assert!(matches!(result, Err(MarketDataError::Validation(_))));
    }

    #[test]
    fn canonical_symbols_map_to_product_ids() {
        let provider = CoinbaseProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Trades)
            .exchange(Exchange::Coinbase)
            .symbol("BTCUSD")
            .build()
            .unwrap();
        let params = provider.resolve_params(&request).unwrap();
        assert_eq!(params.venue_symbol.as_deref(), Some("BTC-USD"));
    }
}
