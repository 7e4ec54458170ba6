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

//! The unified Bybit data provider.

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use futures::stream::BoxStream;
use polyfeed_model::{DataFeature, Exchange, MarketDataError, MarketType};
use polyfeed_network::http::{HttpClient, POLYFEED_USER_AGENT};
use polyfeed_runtime::{
    DataPayload, DataProvider, DataRequest, RequestParams, RestRunner, StreamFilters, StreamItem,
    StreamRunner, fetch_with_chunking,
    symbol::{PassthroughMapper, SymbolMapper},
};
use ustr::Ustr;

use crate::{config, http, ws};

/// Unified provider for Bybit v5 market data (spot, linear and inverse).
pub struct BybitProvider {
    client: Arc<HttpClient>,
    runner: RestRunner,
    mapper: PassthroughMapper,
}

impl Debug for BybitProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(BybitProvider))
            .finish_non_exhaustive()
    }
}

impl Default for BybitProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl BybitProvider {
    /// Creates a provider with an owned HTTP client.
    #[must_use]
    pub fn new(timeout_secs: Option<u64>) -> Self {
        let client = Arc::new(HttpClient::new(
            Some(config::BYBIT_HTTP_URL.to_string()),
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

    fn validate(&self, request: &DataRequest) -> Result<(), MarketDataError> {
        if request.market_type == MarketType::Options {
            return Err(MarketDataError::Validation(
                "Bybit options market data is not supported".to_string(),
            ));
        }
        let derivatives_only = matches!(
            request.feature,
            DataFeature::OpenInterest
                | DataFeature::FundingRate
                | DataFeature::MarkPrice
                | DataFeature::Liquidations
        );
        if derivatives_only && request.market_type == MarketType::Spot {
            return Err(MarketDataError::Validation(format!(
                "{} is not available on the Bybit spot market",
                request.feature
            )));
        }
        Ok(())
    }

    fn resolve_params(&self, request: &DataRequest) -> Result<RequestParams, MarketDataError> {
        let variant = request.resolve_variant()?;
        config::category(variant)?;
        let mut params = RequestParams::from_request(request, variant);
        if let Some(symbol) = params.symbol {
            params.venue_symbol =
                Some(self.mapper.to_venue(symbol.as_str(), request.market_type)?);
        }
        Ok(params)
    }
}

#[async_trait]
impl DataProvider for BybitProvider {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    async fn fetch(&self, request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        self.validate(request)?;
        let entry = http::endpoints::rest_entry(request.feature).ok_or_else(|| {
            MarketDataError::Capability(format!(
                "bybit does not serve {} over REST",
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
                "bybit does not serve {} over WebSocket",
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
        tracing::debug!("Bybit provider closed");
    }
}

#[cfg(test)]
mod tests {
    use polyfeed_runtime::DataRequestBuilder;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn open_interest_on_spot_fails_before_any_io() {
        let provider = BybitProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::OpenInterest)
            .exchange(Exchange::Bybit)
            .market_type(MarketType::Spot)
            .symbol("BTCUSDT")
            .build()
            .unwrap();
        let result = provider.fetch(&request).await;
        assert!(matches!(result, Err(MarketDataError::Validation(_))));
    }

    #[tokio::test]
    async fn inverse_variant_resolves_from_extra_params() {
        let provider = BybitProvider::default();
        let mut extra = serde_json::Map::new();
        extra.insert("market_variant".to_string(), json!("inverse_perp"));
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Bybit)
            .market_type(MarketType::Futures)
            .symbol("BTCUSD")
            .extra_params(extra)
            .build()
            .unwrap();

        let params = provider.resolve_params(&request).unwrap();
        assert_eq!(config::category(params.market_variant).unwrap(), "inverse");
    }
}
