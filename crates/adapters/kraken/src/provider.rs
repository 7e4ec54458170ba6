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

//! The unified Kraken data provider (REST only).

use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use futures::stream::BoxStream;
use polyfeed_model::{DataFeature, Exchange, MarketDataError, MarketType};
use polyfeed_network::http::{HttpClient, POLYFEED_USER_AGENT};
use polyfeed_runtime::{
    DataPayload, DataProvider, DataRequest, RequestParams, RestRunner, StreamItem,
    fetch_with_chunking, symbol::SymbolMapper,
};

use crate::{http, symbol::KrakenSymbolMapper};

/// Unified provider for Kraken spot market data and futures derivatives
/// metrics. Streaming is not wired for this venue.
pub struct KrakenProvider {
    client: Arc<HttpClient>,
    runner: RestRunner,
    mapper: KrakenSymbolMapper,
}

impl Debug for KrakenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(KrakenProvider))
            .finish_non_exhaustive()
    }
}

impl Default for KrakenProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

impl KrakenProvider {
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
            mapper: KrakenSymbolMapper,
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
                "Kraken options market data is not supported".to_string(),
            ));
        }
        let derivatives_only = matches!(
            request.feature,
            DataFeature::OpenInterest | DataFeature::FundingRate
        );
        if derivatives_only && request.market_type == MarketType::Spot {
            return Err(MarketDataError::Validation(format!(
                "{} is not available on the Kraken spot market",
                request.feature
            )));
        }
        // Spot-only features on the futures market are not wired.
        if !derivatives_only
            && request.feature != DataFeature::Health
            && request.market_type == MarketType::Futures
        {
            return Err(MarketDataError::Validation(format!(
                "{} is only wired for the Kraken spot market",
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
impl DataProvider for KrakenProvider {
    fn exchange(&self) -> Exchange {
        Exchange::Kraken
    }

    async fn fetch(&self, request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        self.validate(request)?;
        let entry = http::endpoints::rest_entry(request.feature).ok_or_else(|| {
            MarketDataError::Capability(format!(
                "kraken does not serve {} over REST",
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
        Err(MarketDataError::Capability(format!(
            "kraken does not serve {} over WebSocket",
            request.feature
        )))
    }

    async fn close(&self) {
        tracing::debug!("Kraken provider closed");
    }
}

#[cfg(test)]
mod tests {
    use polyfeed_runtime::DataRequestBuilder;

    use super::*;

    #[tokio::test]
    async fn streaming_is_a_capability_error() {
        let provider = KrakenProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Kraken)
            .symbol("BTCUSD")
            .build()
            .unwrap();
        let result = provider.stream(&request).await;
        assert!(matches!(result, Err(MarketDataError::Capability(_))));
    }

    #[test]
    fn futures_symbols_map_to_contract_ids() {
        let provider = KrakenProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::OpenInterest)
            .exchange(Exchange::Kraken)
            .market_type(MarketType::Futures)
            .symbol("BTCUSD")
            .build()
            .unwrap();
        let params = provider.resolve_params(&request).unwrap();
        assert_eq!(params.venue_symbol.as_deref(), Some("PF_XBTUSD"));
    }

    #[tokio::test]
    async fn spot_funding_fails_validation() {
        let provider = KrakenProvider::default();
        let request = DataRequestBuilder::default()
            .feature(DataFeature::FundingRate)
            .exchange(Exchange::Kraken)
            .symbol("BTCUSD")
            .build()
            .unwrap();
        let result = provider.fetch(&request).await;
        assert!(matches!(result, Err(MarketDataError::Validation(_))));
    }
}
