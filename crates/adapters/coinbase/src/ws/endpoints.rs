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

//! The Coinbase Exchange WebSocket endpoint registry.
//!
//! Stream names are product ids; a single `{"type":"subscribe"}` frame with
//! the `matches` channel covers every product on the connection.

use polyfeed_model::{DataFeature, MarketDataError};
use polyfeed_runtime::{RequestParams, WsEndpointSpec, WsEntry};
use serde_json::json;

use super::parse::CoinbaseMatchMessageAdapter;
use crate::config;

fn product_stream_name(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(symbol.to_uppercase())
}

fn feed_url(_params: &RequestParams, _name: &str) -> String {
    config::COINBASE_WS_URL.to_string()
}

fn feed_url_combined(_params: &RequestParams, _names: &[String]) -> String {
    config::COINBASE_WS_URL.to_string()
}

fn subscribe_payloads(names: &[String]) -> Vec<serde_json::Value> {
    vec![json!({
        "type": "subscribe",
        "product_ids": names,
        "channels": ["matches"],
    })]
}

static MATCH_ADAPTER: CoinbaseMatchMessageAdapter = CoinbaseMatchMessageAdapter;

/// Resolves the WebSocket registry row for a feature.
#[must_use]
pub fn ws_entry(feature: DataFeature) -> Option<WsEntry> {
    match feature {
        DataFeature::Trades => Some(WsEntry {
            spec: WsEndpointSpec {
                id: "coinbase.ws.trades",
                combined_supported: true,
                max_streams_per_connection: config::COINBASE_MAX_PRODUCTS_PER_CONNECTION,
                build_stream_name: product_stream_name,
                build_single_url: feed_url,
                build_combined_url: feed_url_combined,
                build_subscribe_payloads: Some(subscribe_payloads),
                heartbeat_secs: None,
                heartbeat_msg: None,
            },
            adapter: &MATCH_ADAPTER,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_frame_lists_products_on_matches_channel() {
        let payloads =
            subscribe_payloads(&["BTC-USD".to_string(), "ETH-USD".to_string()]);
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0]["type"], "subscribe");
        assert_eq!(payloads[0]["channels"][0], "matches");
        assert_eq!(payloads[0]["product_ids"].as_array().unwrap().len(), 2);
    }
}
