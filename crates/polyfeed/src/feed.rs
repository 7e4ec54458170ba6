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

//! The feed cache: a long-running multi-symbol OHLCV subscriber with a
//! latest-bar map and dynamic symbol addition.

use std::{
    collections::HashSet,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;
use futures::StreamExt;
use polyfeed_model::{Exchange, MarketDataError, MarketType, StreamingBar, Timeframe};
use polyfeed_runtime::{DataRequestBuilder, StreamItem};
use tokio::task::JoinHandle;
use ustr::Ustr;

use crate::router::Router;

/// Callback invoked for every matching bar emission.
pub type BarCallback = Arc<dyn Fn(&StreamingBar) + Send + Sync>;

struct Subscriber {
    callback: BarCallback,
    /// `None` subscribes to every symbol on the feed.
    symbols: Option<HashSet<Ustr>>,
    closed_only: bool,
}

impl Subscriber {
    fn matches(&self, bar: &StreamingBar) -> bool {
        if self.closed_only && !bar.bar.is_closed {
            return false;
        }
        match &self.symbols {
            Some(symbols) => symbols.contains(&bar.symbol),
            None => true,
        }
    }

    fn deliver(&self, bar: &StreamingBar) {
        // Consumer panics are isolated; one bad consumer must not take down
        // the feed or its peers.
        if catch_unwind(AssertUnwindSafe(|| (self.callback)(bar))).is_err() {
            tracing::warn!(symbol = %bar.symbol, "Feed subscriber panicked, ignoring");
        }
    }
}

/// A long-running multi-symbol bar feed with a per-`(symbol, timeframe)`
/// latest-bar cache.
///
/// The cache is written only by the stream task (entries swapped whole,
/// never mutated) and read by any number of consumers. Adding symbols
/// re-opens the underlying stream with the union set; the cache survives the
/// restart, so late subscribers still observe the last known bars.
pub struct BarFeed {
    router: Arc<Router>,
    exchange: Exchange,
    market_type: MarketType,
    timeframe: Timeframe,
    symbols: Mutex<Vec<Ustr>>,
    latest: Arc<DashMap<(Ustr, Timeframe), StreamingBar>>,
    subscribers: Arc<DashMap<u64, Subscriber>>,
    next_subscriber_id: AtomicU64,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for BarFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(BarFeed))
            .field("exchange", &self.exchange)
            .field("timeframe", &self.timeframe)
            .field("cached", &self.latest.len())
            .field("subscribers", &self.subscribers.len())
            .finish_non_exhaustive()
    }
}

impl BarFeed {
    /// Creates a stopped feed for one venue, market and timeframe.
    #[must_use]
    pub fn new(
        router: Arc<Router>,
        exchange: Exchange,
        market_type: MarketType,
        timeframe: Timeframe,
    ) -> Self {
        Self {
            router,
            exchange,
            market_type,
            timeframe,
            symbols: Mutex::new(Vec::new()),
            latest: Arc::new(DashMap::new()),
            subscribers: Arc::new(DashMap::new()),
            next_subscriber_id: AtomicU64::new(1),
            task: Mutex::new(None),
        }
    }

    /// Starts the feed over the given symbols.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy; the feed
    /// stays stopped on failure.
    pub async fn start(&self, symbols: &[&str]) -> Result<(), MarketDataError> {
        {
            let mut current = self.symbols.lock().expect("symbol set poisoned");
            current.clear();
            for symbol in symbols {
                let upper = Ustr::from(&symbol.to_uppercase());
                if !current.contains(&upper) {
                    current.push(upper);
                }
            }
            if current.is_empty() {
                return Err(MarketDataError::Validation(
                    "Feed requires at least one symbol".to_string(),
                ));
            }
        }
        self.respawn().await
    }

    /// Adds symbols to a running feed, re-opening the underlying stream with
    /// the union set. The latest-bar cache is preserved across the restart.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn add_symbols(&self, symbols: &[&str]) -> Result<(), MarketDataError> {
        {
            let mut current = self.symbols.lock().expect("symbol set poisoned");
            for symbol in symbols {
                let upper = Ustr::from(&symbol.to_uppercase());
                if !current.contains(&upper) {
                    current.push(upper);
                }
            }
        }
        self.respawn().await
    }

    async fn respawn(&self) -> Result<(), MarketDataError> {
        let symbols: Vec<String> = {
            let current = self.symbols.lock().expect("symbol set poisoned");
            current.iter().map(|s| s.to_string()).collect()
        };

        let request = DataRequestBuilder::default()
            .feature(polyfeed_model::DataFeature::Ohlcv)
            .transport(polyfeed_model::TransportKind::Ws)
            .exchange(self.exchange)
            .market_type(self.market_type)
            .symbols(symbols)
            .timeframe(self.timeframe)
            .build()
            .map_err(|e| MarketDataError::Validation(e.to_string()))?;

        let mut stream = self.router.route_stream(&request).await?;

        // Swap in the new stream task only after the new stream is open.
        let previous = {
            let mut task = self.task.lock().expect("task slot poisoned");
            task.take()
        };
        if let Some(previous) = previous {
            previous.abort();
        }

        let latest = Arc::clone(&self.latest);
        let subscribers = Arc::clone(&self.subscribers);
        let timeframe = self.timeframe;
        let handle = tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                let StreamItem::Bar(bar) = item else {
                    continue;
                };
                latest.insert((bar.symbol, timeframe), bar);
                for subscriber in subscribers.iter() {
                    if subscriber.matches(&bar) {
                        subscriber.deliver(&bar);
                    }
                }
            }
            tracing::debug!("Feed stream ended");
        });

        let mut task = self.task.lock().expect("task slot poisoned");
        *task = Some(handle);
        Ok(())
    }

    /// Registers a consumer; it immediately receives the cached snapshot for
    /// its symbols, then every subsequent matching emission. Returns the
    /// subscription id.
    pub fn subscribe(
        &self,
        callback: BarCallback,
        symbols: Option<&[&str]>,
        closed_only: bool,
    ) -> u64 {
        let subscriber = Subscriber {
            callback,
            symbols: symbols.map(|list| {
                list.iter()
                    .map(|s| Ustr::from(&s.to_uppercase()))
                    .collect()
            }),
            closed_only,
        };

        // Replay the current snapshot before wiring live updates.
        for entry in self.latest.iter() {
            if subscriber.matches(entry.value()) {
                subscriber.deliver(entry.value());
            }
        }

        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, subscriber);
        id
    }

    /// Removes a consumer registration.
    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.remove(&id);
    }

    /// Returns the latest cached bar for a symbol on this feed's timeframe.
    #[must_use]
    pub fn latest(&self, symbol: &str) -> Option<StreamingBar> {
        let key = (Ustr::from(&symbol.to_uppercase()), self.timeframe);
        self.latest.get(&key).map(|entry| *entry.value())
    }

    /// Stops the feed, cancelling the stream task (which closes the
    /// underlying sockets).
    pub fn stop(&self) {
        let mut task = self.task.lock().expect("task slot poisoned");
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

impl Drop for BarFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
