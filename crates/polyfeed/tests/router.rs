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

//! Router and API facade tests against a scripted provider.

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use polyfeed::{DataClient, Router};
use polyfeed_model::{DataFeature, Exchange, MarketDataError, MarketType, TransportKind};
use polyfeed_runtime::{DataPayload, DataProvider, DataRequest, DataRequestBuilder, StreamItem};

/// A provider that records transport-level calls and answers with canned
/// payloads.
#[derive(Debug, Default)]
struct ScriptedProvider {
    fetch_calls: AtomicU32,
    stream_calls: AtomicU32,
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    async fn fetch(&self, _request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(DataPayload::Health(serde_json::json!({"ok": true})))
    }

    async fn stream(
        &self,
        _request: &DataRequest,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        Ok(futures::stream::empty().boxed())
    }

    async fn close(&self) {}
}

fn request(feature: DataFeature, transport: TransportKind) -> DataRequest {
    DataRequestBuilder::default()
        .feature(feature)
        .transport(transport)
        .exchange(Exchange::Binance)
        .market_type(MarketType::Spot)
        .symbol("BTCUSDT")
        .build()
        .unwrap()
}

fn scripted_router() -> (Router, Arc<ScriptedProvider>) {
    let provider = Arc::new(ScriptedProvider::default());
    let mut router = Router::empty();
    let registered = Arc::clone(&provider);
    router.register(Exchange::Binance, move || {
        Arc::clone(&registered) as Arc<dyn DataProvider>
    });
    (router, provider)
}

#[tokio::test]
async fn unsupported_capability_fails_without_any_transport_call() {
    let (router, provider) = scripted_router();

    // Liquidations over REST are not in the static table for any market.
    let result = router
        .route(&request(DataFeature::Liquidations, TransportKind::Rest))
        .await;

    assert!(matches!(result, Err(MarketDataError::Capability(_))));
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 0);

    // Same gate for streams: spot liquidation streams are unsupported.
    let result = router
        .route_stream(&request(DataFeature::Liquidations, TransportKind::Ws))
        .await;
    assert!(matches!(result, Err(MarketDataError::Capability(_))));
    assert_eq!(provider.stream_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn supported_requests_dispatch_to_the_provider() {
    let (router, provider) = scripted_router();

    let payload = router
        .route(&request(DataFeature::Health, TransportKind::Rest))
        .await
        .unwrap();

    assert!(matches!(payload, DataPayload::Health(_)));
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unregistered_exchange_is_a_capability_error() {
    let router = Router::empty();
    let result = router
        .route(&request(DataFeature::Health, TransportKind::Rest))
        .await;
    assert!(matches!(result, Err(MarketDataError::Capability(_))));
}

#[tokio::test]
async fn provider_constructed_once_and_cached() {
    let constructions = Arc::new(AtomicU32::new(0));
    let mut router = Router::empty();
    let counter = Arc::clone(&constructions);
    router.register(Exchange::Binance, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Arc::new(ScriptedProvider::default()) as Arc<dyn DataProvider>
    });

    for _ in 0..3 {
        router
            .route(&request(DataFeature::Health, TransportKind::Rest))
            .await
            .unwrap();
    }
    assert_eq!(constructions.load(Ordering::SeqCst), 1);

    // close_all drops the cache; the next route reconstructs.
    router.close_all().await;
    router
        .route(&request(DataFeature::Health, TransportKind::Rest))
        .await
        .unwrap();
    assert_eq!(constructions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn client_requires_an_exchange() {
    let (router, _provider) = scripted_router();
    let client = DataClient::with_router(router, None);

    let result = client.fetch_health(None, None).await;
    assert!(matches!(result, Err(MarketDataError::Validation(_))));
}

#[tokio::test]
async fn client_resolves_default_exchange_with_override_precedence() {
    let (router, provider) = scripted_router();
    let client = DataClient::with_router(router, Some(Exchange::Binance));

    // Default exchange applies.
    client.fetch_health(None, None).await.unwrap();
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 1);

    // An explicit exchange without a registered provider fails fast.
    let result = client.fetch_health(Some(Exchange::Okx), None).await;
    assert!(matches!(result, Err(MarketDataError::Capability(_))));
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 1);
}
