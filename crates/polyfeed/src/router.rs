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

//! The request router: capability gating and provider dispatch.

use std::{collections::HashMap, fmt::Debug, sync::Arc};

use futures::stream::BoxStream;
use polyfeed_model::{Exchange, MarketDataError};
use polyfeed_runtime::{DataPayload, DataProvider, DataRequest, StreamItem, capability};

/// Constructs a provider on first use; called at most once per exchange.
pub type ProviderFactory = Box<dyn Fn() -> Arc<dyn DataProvider> + Send + Sync>;

/// Dispatches [`DataRequest`]s to venue providers.
///
/// Providers are constructed lazily and cached; the capability registry is
/// consulted before any dispatch, so unsupported combinations fail fast with
/// [`MarketDataError::Capability`] and never open a connection.
pub struct Router {
    factories: HashMap<Exchange, ProviderFactory>,
    providers: tokio::sync::Mutex<HashMap<Exchange, Arc<dyn DataProvider>>>,
}

impl Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(Router))
            .field("registered", &self.factories.len())
            .finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::with_default_providers()
    }
}

impl Router {
    /// Creates an empty router with no registered venues.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
            providers: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Creates a router with every built-in venue registered.
    #[must_use]
    pub fn with_default_providers() -> Self {
        let mut router = Self::empty();
        router.register(Exchange::Binance, || {
            Arc::new(polyfeed_binance::BinanceProvider::default())
        });
        router.register(Exchange::Bybit, || {
            Arc::new(polyfeed_bybit::BybitProvider::default())
        });
        router.register(Exchange::Okx, || {
            Arc::new(polyfeed_okx::OkxProvider::default())
        });
        router.register(Exchange::Coinbase, || {
            Arc::new(polyfeed_coinbase::CoinbaseProvider::default())
        });
        router.register(Exchange::Kraken, || {
            Arc::new(polyfeed_kraken::KrakenProvider::default())
        });
        router.register(Exchange::Mexc, || {
            Arc::new(polyfeed_mexc::MexcProvider::default())
        });
        router.register(Exchange::Hyperliquid, || {
            Arc::new(polyfeed_hyperliquid::HyperliquidProvider::default())
        });
        router
    }

    /// Registers (or replaces) a provider factory for an exchange.
    pub fn register<F>(&mut self, exchange: Exchange, factory: F)
    where
        F: Fn() -> Arc<dyn DataProvider> + Send + Sync + 'static,
    {
        self.factories.insert(exchange, Box::new(factory));
    }

    /// Returns the cached provider, constructing it on first access (a
    /// single construction per exchange; concurrent callers wait).
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Capability`] for unregistered exchanges.
    pub async fn provider(
        &self,
        exchange: Exchange,
    ) -> Result<Arc<dyn DataProvider>, MarketDataError> {
        let mut providers = self.providers.lock().await;
        if let Some(provider) = providers.get(&exchange) {
            return Ok(Arc::clone(provider));
        }

        let factory = self.factories.get(&exchange).ok_or_else(|| {
            MarketDataError::Capability(format!("No provider registered for {exchange}"))
        })?;
        let provider = factory();
        providers.insert(exchange, Arc::clone(&provider));
        Ok(provider)
    }

    fn check_capability(
        provider: &dyn DataProvider,
        request: &DataRequest,
    ) -> Result<(), MarketDataError> {
        let status = provider.describe_capability(request).unwrap_or_else(|| {
            capability::lookup(
                request.exchange,
                request.feature,
                request.transport,
                request.market_type,
                request.effective_instrument_type(),
            )
        });
        if !status.supported {
            return Err(MarketDataError::Capability(format!(
                "{} does not support {} over {} on the {} market: {}",
                request.exchange,
                request.feature,
                request.transport,
                request.market_type,
                status.reason
            )));
        }
        Ok(())
    }

    /// Routes a historical request to its provider.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Capability`] when the combination is
    /// unsupported (no transport call is made), otherwise propagates provider
    /// errors.
    pub async fn route(&self, request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        let provider = self.provider(request.exchange).await?;
        Self::check_capability(provider.as_ref(), request)?;
        provider.fetch(request).await
    }

    /// Routes a streaming request to its provider.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Router::route`].
    pub async fn route_stream(
        &self,
        request: &DataRequest,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError> {
        let provider = self.provider(request.exchange).await?;
        Self::check_capability(provider.as_ref(), request)?;
        provider.stream(request).await
    }

    /// Closes every cached provider and clears the cache.
    pub async fn close_all(&self) {
        let mut providers = self.providers.lock().await;
        for (exchange, provider) in providers.drain() {
            tracing::debug!(%exchange, "Closing provider");
            provider.close().await;
        }
    }
}
