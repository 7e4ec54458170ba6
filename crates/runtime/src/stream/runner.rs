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

//! The stream runner: opening multiplexed WebSocket connections for a
//! [`WsEndpointSpec`] and fanning messages through a [`MessageAdapter`] and
//! the per-consumer filter chain.
//!
//! Combined mode (one connection for all streams) is selected iff the spec
//! supports it and the symbol count fits the per-connection cap; otherwise
//! names are partitioned into `ceil(n / max)` groups with one connection per
//! group. Messages from different connections merge without a global order;
//! per-symbol order within one socket is preserved end-to-end.

use futures::stream::BoxStream;
use polyfeed_model::MarketDataError;
use polyfeed_network::websocket::{WsClient, WsConfig, WsMessage};
use tokio::sync::mpsc;
use ustr::Ustr;

use super::filters::{FilterChain, StreamFilters};
use crate::{
    endpoint::{MessageAdapter, WsEndpointSpec},
    payload::StreamItem,
    request::RequestParams,
};

const STREAM_CHANNEL_CAPACITY: usize = 1024;

/// Splits stream names into connection groups of at most `max` names.
#[must_use]
pub fn partition_stream_names(names: Vec<String>, max: usize) -> Vec<Vec<String>> {
    let max = max.max(1);
    names
        .chunks(max)
        .map(<[String]>::to_vec)
        .collect()
}

/// One planned connection: its URL plus any post-connect subscribe frames.
#[derive(Clone, Debug)]
struct ConnectionPlan {
    url: String,
    subscribe_payloads: Option<Vec<serde_json::Value>>,
}

/// Partitions stream names into `ceil(n / max)` groups and resolves each
/// group's URL: combined mode multiplexes via `build_combined_url` (with
/// subscribe frames where the venue uses them), otherwise each group dials
/// `build_single_url`. The flag never changes the group size.
fn plan_connections(
    spec: &WsEndpointSpec,
    params: &RequestParams,
    names: Vec<String>,
) -> Vec<ConnectionPlan> {
    partition_stream_names(names, spec.max_streams_per_connection)
        .into_iter()
        .map(|group| {
            if spec.combined_supported {
                ConnectionPlan {
                    url: (spec.build_combined_url)(params, &group),
                    subscribe_payloads: spec.build_subscribe_payloads.map(|build| build(&group)),
                }
            } else {
                ConnectionPlan {
                    url: (spec.build_single_url)(params, &group[0]),
                    subscribe_payloads: None,
                }
            }
        })
        .collect()
}

/// Aborts connection tasks when the consumer drops the stream.
#[derive(Debug)]
struct ConnectionGuard {
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// Executes [`WsEndpointSpec`]s against the WebSocket transport.
#[derive(Copy, Clone, Debug, Default)]
pub struct StreamRunner;

impl StreamRunner {
    /// Opens the stream for the given symbols.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when no symbols are given and
    /// propagates stream-name builder failures. Transport-level connect
    /// failures after this point are handled by the per-connection reconnect
    /// loop.
    pub async fn open(
        spec: WsEndpointSpec,
        adapter: &'static dyn MessageAdapter,
        symbols: &[Ustr],
        params: &RequestParams,
        filters: StreamFilters,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError> {
        if symbols.is_empty() {
            return Err(MarketDataError::Validation(
                "Streaming requires at least one symbol".to_string(),
            ));
        }

        let mut names = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            names.push((spec.build_stream_name)(symbol.as_str(), params)?);
        }

        let plans = plan_connections(&spec, params, names);
        tracing::debug!(
            endpoint_id = spec.id,
            connections = plans.len(),
            combined = spec.combined_supported,
            "Opening stream"
        );

        let (tx, rx) = mpsc::channel::<StreamItem>(STREAM_CHANNEL_CAPACITY);
        let mut handles = Vec::with_capacity(plans.len());

        for plan in plans {
            let mut config = WsConfig::new(plan.url);
            config.heartbeat_secs = spec.heartbeat_secs;
            config.heartbeat_msg = spec.heartbeat_msg.map(str::to_string);

            let tx = tx.clone();
            let endpoint_id = spec.id;
            handles.push(tokio::spawn(run_connection(
                endpoint_id,
                config,
                plan.subscribe_payloads,
                adapter,
                tx,
            )));
        }
        drop(tx);

        let guard = ConnectionGuard { handles };
        let mut chain = FilterChain::new(filters);
        let stream = async_stream::stream! {
            let _guard = guard;
            let mut rx = rx;
            while let Some(item) = rx.recv().await {
                if let Some(item) = chain.apply(item) {
                    yield item;
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

async fn run_connection(
    endpoint_id: &'static str,
    config: WsConfig,
    subscribe_payloads: Option<Vec<serde_json::Value>>,
    adapter: &'static dyn MessageAdapter,
    tx: mpsc::Sender<StreamItem>,
) {
    let url = config.url.clone();
    let mut client = match WsClient::connect(config).await {
        Ok(client) => client,
        Err(err) => {
            tracing::error!(endpoint_id, %url, error = %err, "Stream connection failed");
            return;
        }
    };

    send_subscriptions(&mut client, subscribe_payloads.as_deref()).await;

    enum Next {
        ConsumerGone,
        Message(Option<WsMessage>),
    }

    loop {
        let next = tokio::select! {
            // The consumer dropped the stream: close the socket promptly.
            () = tx.closed() => Next::ConsumerGone,
            message = client.next() => Next::Message(message),
        };

        match next {
            Next::ConsumerGone => {
                client.close().await;
                return;
            }
            Next::Message(None) => return,
            Next::Message(Some(WsMessage::Reconnected)) => {
                tracing::debug!(endpoint_id, %url, "Resubscribing after reconnect");
                send_subscriptions(&mut client, subscribe_payloads.as_deref()).await;
            }
            Next::Message(Some(WsMessage::Json(payload))) => {
                if !adapter.is_relevant(&payload) {
                    continue;
                }
                match adapter.parse(&payload) {
                    Ok(items) => {
                        for item in items {
                            if tx.send(item).await.is_err() {
                                client.close().await;
                                return;
                            }
                        }
                    }
                    // One bad tick must not kill the stream.
                    Err(err) => {
                        tracing::warn!(endpoint_id, error = %err, "Dropping unparseable message");
                    }
                }
            }
            Next::Message(Some(WsMessage::Text(_) | WsMessage::Pong)) => {}
        }
    }
}

async fn send_subscriptions(client: &mut WsClient, payloads: Option<&[serde_json::Value]>) {
    if let Some(payloads) = payloads {
        for payload in payloads {
            if let Err(err) = client.send_text(&payload.to_string()).await {
                tracing::warn!(error = %err, "Subscribe send failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use polyfeed_model::{DataFeature, Exchange, MarketVariant};
    use rstest::rstest;

    use super::*;
    use crate::request::DataRequestBuilder;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("stream-{i}")).collect()
    }

    fn test_params() -> RequestParams {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Trades)
            .exchange(Exchange::Binance)
            .build()
            .unwrap();
        RequestParams::from_request(&request, MarketVariant::Spot)
    }

    fn test_spec(combined_supported: bool, max: usize) -> WsEndpointSpec {
        fn stream_name(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
            Ok(symbol.to_string())
        }
        fn single_url(_params: &RequestParams, name: &str) -> String {
            format!("wss://venue.test/ws/{name}")
        }
        fn combined_url(_params: &RequestParams, names: &[String]) -> String {
            format!("wss://venue.test/stream?streams={}", names.join("/"))
        }
        fn subscribe(names: &[String]) -> Vec<serde_json::Value> {
            vec![serde_json::json!({"op": "subscribe", "args": names})]
        }
        WsEndpointSpec {
            id: "test.ws",
            combined_supported,
            max_streams_per_connection: max,
            build_stream_name: stream_name,
            build_single_url: single_url,
            build_combined_url: combined_url,
            build_subscribe_payloads: Some(subscribe),
            heartbeat_secs: None,
            heartbeat_msg: None,
        }
    }

    #[rstest]
    #[case(3, 10, 1)] // fits one combined connection
    #[case(10, 10, 1)] // exactly at the cap
    #[case(11, 10, 2)] // one over the cap
    #[case(45, 10, 5)] // ceil(45 / 10)
    #[case(4, 1, 4)] // single-stream venue
    fn partition_matches_ceiling(
        #[case] total: usize,
        #[case] max: usize,
        #[case] expected_groups: usize,
    ) {
        let groups = partition_stream_names(names(total), max);
        assert_eq!(groups.len(), expected_groups);
        assert!(groups.iter().all(|g| g.len() <= max));
        assert_eq!(groups.iter().map(Vec::len).sum::<usize>(), total);
    }

    #[rstest]
    fn combined_plans_multiplex_each_group() {
        let params = test_params();
        let plans = plan_connections(&test_spec(true, 10), &params, names(12));

        assert_eq!(plans.len(), 2);
        assert!(plans[0].url.starts_with("wss://venue.test/stream?streams=stream-0/"));
        assert_eq!(plans[1].url, "wss://venue.test/stream?streams=stream-10/stream-11");
        for plan in &plans {
            assert!(plan.subscribe_payloads.is_some());
        }
    }

    #[rstest]
    fn non_combined_plans_partition_by_the_same_cap() {
        // The cap bounds the group size even without combined support; only
        // the URL resolution changes.
        let params = test_params();
        let plans = plan_connections(&test_spec(false, 5), &params, names(12));

        assert_eq!(plans.len(), 3, "ceil(12 / 5) connections");
        assert_eq!(plans[0].url, "wss://venue.test/ws/stream-0");
        assert_eq!(plans[1].url, "wss://venue.test/ws/stream-5");
        assert_eq!(plans[2].url, "wss://venue.test/ws/stream-10");
        for plan in &plans {
            assert!(plan.subscribe_payloads.is_none());
        }
    }
}
