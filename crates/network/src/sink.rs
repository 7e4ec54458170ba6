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

//! Bounded in-memory queue, the only persisted state in the workspace.

use std::sync::{Arc, Mutex};

use futures::stream::BoxStream;
use thiserror::Error;
use tokio::sync::mpsc;

/// Error returned when publishing to a closed sink.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("Sink is closed")]
pub struct SinkClosed;

/// A bounded in-memory queue with backpressure.
///
/// Producers block on [`InMemorySink::publish`] when the queue is full;
/// consumers drain via [`InMemorySink::get`], [`InMemorySink::get_nowait`] or
/// [`InMemorySink::stream`].
#[derive(Debug)]
pub struct InMemorySink<T> {
    tx: Mutex<Option<mpsc::Sender<T>>>,
    rx: tokio::sync::Mutex<mpsc::Receiver<T>>,
}

impl<T: Send + 'static> InMemorySink<T> {
    /// Creates a sink holding at most `capacity` items (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx: Mutex::new(Some(tx)),
            rx: tokio::sync::Mutex::new(rx),
        }
    }

    /// Publishes an item, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`SinkClosed`] if the sink has been closed.
    pub async fn publish(&self, item: T) -> Result<(), SinkClosed> {
        let tx = {
            let guard = self.tx.lock().expect("sink sender poisoned");
            guard.clone().ok_or(SinkClosed)?
        };
        tx.send(item).await.map_err(|_| SinkClosed)
    }

    /// Awaits the next item; `None` once the sink is closed and drained.
    pub async fn get(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }

    /// Returns the next item if one is immediately available.
    #[must_use]
    pub fn get_nowait(&self) -> Option<T> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }

    /// Returns a stream draining the sink until it is closed.
    #[must_use]
    pub fn stream(self: Arc<Self>) -> BoxStream<'static, T> {
        Box::pin(async_stream::stream! {
            while let Some(item) = self.get().await {
                yield item;
            }
        })
    }

    /// Closes the sink; pending items remain readable, publishes fail.
    pub fn close(&self) {
        self.tx.lock().expect("sink sender poisoned").take();
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn publish_get_round_trip() {
        let sink = InMemorySink::new(4);
        sink.publish(1_u32).await.unwrap();
        sink.publish(2).await.unwrap();

        assert_eq!(sink.get().await, Some(1));
        assert_eq!(sink.get_nowait(), Some(2));
        assert_eq!(sink.get_nowait(), None);
    }

    #[tokio::test]
    async fn publish_blocks_when_full() {
        let sink = Arc::new(InMemorySink::new(1));
        sink.publish(1_u32).await.unwrap();

        let blocked = {
            let sink = Arc::clone(&sink);
            tokio::spawn(async move { sink.publish(2).await })
        };

        // The publish cannot complete until a slot frees up.
        tokio::task::yield_now().await;
        assert!(!blocked.is_finished());

        assert_eq!(sink.get().await, Some(1));
        blocked.await.unwrap().unwrap();
        assert_eq!(sink.get().await, Some(2));
    }

    #[tokio::test]
    async fn close_rejects_publish_but_drains() {
        let sink = Arc::new(InMemorySink::new(4));
        sink.publish(1_u32).await.unwrap();
        sink.close();

        assert_eq!(sink.publish(2).await, Err(SinkClosed));

        let items: Vec<u32> = sink.stream().collect().await;
        assert_eq!(items, vec![1]);
    }
}
