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

//! Feed-cache behavior against a scripted streaming provider.

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use polyfeed::{BarFeed, Router};
use polyfeed_model::{
    Bar, Exchange, MarketDataError, MarketType, StreamingBar, Timeframe, time::ms_to_datetime,
};
use polyfeed_runtime::{DataPayload, DataProvider, DataRequest, StreamItem};
use rust_decimal_macros::dec;

fn closed_bar(minute: i64) -> Bar {
    Bar::new(
        ms_to_datetime(minute * 60_000).unwrap(),
        dec!(100),
        dec!(101),
        dec!(99),
        dec!(100.5),
        dec!(1),
        true,
    )
    .unwrap()
}

/// Streams one closed bar per requested symbol, then stays open forever.
#[derive(Debug, Default)]
struct StreamingStub {
    streams_opened: AtomicU32,
}

#[async_trait]
impl DataProvider for StreamingStub {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    async fn fetch(&self, _request: &DataRequest) -> Result<DataPayload, MarketDataError> {
        Err(MarketDataError::Capability("stream-only stub".to_string()))
    }

    async fn stream(
        &self,
        request: &DataRequest,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError> {
        self.streams_opened.fetch_add(1, Ordering::SeqCst);
        let bars: Vec<StreamItem> = request
            .all_symbols()
            .into_iter()
            .map(|symbol| StreamItem::Bar(StreamingBar::new(symbol.as_str(), closed_bar(1))))
            .collect();
        Ok(futures::stream::iter(bars)
            .chain(futures::stream::pending())
            .boxed())
    }

    async fn close(&self) {}
}

fn feed_with_stub() -> (BarFeed, Arc<StreamingStub>) {
    let stub = Arc::new(StreamingStub::default());
    let mut router = Router::empty();
    let registered = Arc::clone(&stub);
    router.register(Exchange::Binance, move || {
        Arc::clone(&registered) as Arc<dyn DataProvider>
    });
    let feed = BarFeed::new(
        Arc::new(router),
        Exchange::Binance,
        MarketType::Spot,
        Timeframe::M1,
    );
    (feed, stub)
}

async fn wait_for_latest(feed: &BarFeed, symbol: &str) -> StreamingBar {
    for _ in 0..100 {
        if let Some(bar) = feed.latest(symbol) {
            return bar;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("No cached bar for {symbol} within the deadline");
}

#[tokio::test]
async fn start_populates_the_latest_bar_cache() {
    let (feed, _stub) = feed_with_stub();
    feed.start(&["btcusdt"]).await.unwrap();

    let bar = wait_for_latest(&feed, "BTCUSDT").await;
    assert_eq!(bar.symbol.as_str(), "BTCUSDT");
    assert_eq!(bar.bar.close, dec!(100.5));

    feed.stop();
}

#[tokio::test]
async fn add_symbols_extends_the_stream_and_keeps_the_cache() {
    let (feed, stub) = feed_with_stub();
    feed.start(&["BTCUSDT"]).await.unwrap();
    wait_for_latest(&feed, "BTCUSDT").await;

    feed.add_symbols(&["ETHUSDT"]).await.unwrap();
    wait_for_latest(&feed, "ETHUSDT").await;

    // The original symbol's cache entry survived the restart.
    assert!(feed.latest("BTCUSDT").is_some());
    assert_eq!(stub.streams_opened.load(Ordering::SeqCst), 2);

    feed.stop();
}

#[tokio::test]
async fn late_subscribers_receive_the_cached_snapshot() {
    let (feed, _stub) = feed_with_stub();
    feed.start(&["BTCUSDT", "ETHUSDT"]).await.unwrap();
    wait_for_latest(&feed, "BTCUSDT").await;
    wait_for_latest(&feed, "ETHUSDT").await;

    let received: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    feed.subscribe(
        Arc::new(move |bar| {
            sink.lock().unwrap().push(bar.symbol.to_string());
        }),
        Some(&["BTCUSDT"]),
        false,
    );

    let snapshot = received.lock().unwrap().clone();
    assert_eq!(snapshot, vec!["BTCUSDT".to_string()], "filtered snapshot");

    feed.stop();
}

#[tokio::test]
async fn panicking_subscribers_are_isolated() {
    let (feed, _stub) = feed_with_stub();
    feed.start(&["BTCUSDT"]).await.unwrap();
    wait_for_latest(&feed, "BTCUSDT").await;

    feed.subscribe(Arc::new(|_| panic!("bad consumer")), None, false);

    // A healthy subscriber registered afterwards still gets the snapshot.
    let delivered = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&delivered);
    feed.subscribe(
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        None,
        false,
    );
    assert_eq!(delivered.load(Ordering::SeqCst), 1);

    feed.stop();
}

#[tokio::test]
async fn unsubscribed_consumers_stop_receiving() {
    let (feed, _stub) = feed_with_stub();
    feed.start(&["BTCUSDT"]).await.unwrap();
    wait_for_latest(&feed, "BTCUSDT").await;

    let delivered = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&delivered);
    let id = feed.subscribe(
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
        None,
        false,
    );
    let after_snapshot = delivered.load(Ordering::SeqCst);
    feed.unsubscribe(id);

    // A stream restart re-emits bars; the removed consumer sees none of them.
    feed.add_symbols(&["ETHUSDT"]).await.unwrap();
    wait_for_latest(&feed, "ETHUSDT").await;
    assert_eq!(delivered.load(Ordering::SeqCst), after_snapshot);

    feed.stop();
}
