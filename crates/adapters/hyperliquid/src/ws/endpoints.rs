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

//! The Hyperliquid WebSocket endpoint registry.
//!
//! Stream names encode `channel:coin[:interval]`; the subscribe builder
//! expands them into `{"method":"subscribe","subscription":{…}}` frames.

use polyfeed_model::{DataFeature, MarketDataError};
use polyfeed_runtime::{RequestParams, WsEndpointSpec, WsEntry};
use serde_json::json;

use super::parse::{HyperliquidCandleMessageAdapter, HyperliquidTradeMessageAdapter};
use crate::config;

fn candle_stream_name(symbol: &str, params: &RequestParams) -> Result<String, MarketDataError> {
    let interval = config::interval_str(params.require_timeframe()?)?;
    Ok(format!("candle:{}:{interval}", symbol.to_uppercase()))
}

fn trade_stream_name(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("trades:{}", symbol.to_uppercase()))
}

fn ws_url(_params: &RequestParams, _name: &str) -> String {
    config::HYPERLIQUID_WS_URL.to_string()
}

fn ws_url_combined(_params: &RequestParams, _names: &[String]) -> String {
    config::HYPERLIQUID_WS_URL.to_string()
}

fn subscribe_payloads(names: &[String]) -> Vec<serde_json::Value> {
    names
        .iter()
        .filter_map(|name| {
            let mut parts = name.split(':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some("candle"), Some(coin), Some(interval)) => Some(json!({
                    "method": "subscribe",
                    "subscription": {"type": "candle", "coin": coin, "interval": interval},
                })),
                (Some("trades"), Some(coin), None) => Some(json!({
                    "method": "subscribe",
                    "subscription": {"type": "trades", "coin": coin},
                })),
                _ => None,
            }
        })
        .collect()
}

const fn spec(
    id: &'static str,
    build_stream_name: fn(&str, &RequestParams) -> Result<String, MarketDataError>,
) -> WsEndpointSpec {
    WsEndpointSpec {
        id,
        combined_supported: true,
        max_streams_per_connection: config::HYPERLIQUID_MAX_STREAMS_PER_CONNECTION,
        build_stream_name,
        build_single_url: ws_url,
        build_combined_url: ws_url_combined,
        build_subscribe_payloads: Some(subscribe_payloads),
        heartbeat_secs: Some(30),
        heartbeat_msg: Some(r#"{"method":"ping"}"#),
    }
}

static CANDLE_ADAPTER: HyperliquidCandleMessageAdapter = HyperliquidCandleMessageAdapter;
static TRADE_ADAPTER: HyperliquidTradeMessageAdapter = HyperliquidTradeMessageAdapter;

/// Resolves the WebSocket registry row for a feature.
#[must_use]
pub fn ws_entry(feature: DataFeature) -> Option<WsEntry> {
    let entry = match feature {
        DataFeature::Ohlcv => WsEntry {
            spec: spec("hyperliquid.ws.ohlcv", candle_stream_name),
            adapter: &CANDLE_ADAPTER,
        },
        DataFeature::Trades => WsEntry {
            spec: spec("hyperliquid.ws.trades", trade_stream_name),
            adapter: &TRADE_ADAPTER,
        },
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_frames_expand_stream_names() {
        let payloads = subscribe_payloads(&[
            "candle:BTC:1m".to_string(),
            "trades:ETH".to_string(),
        ]);
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0]["subscription"]["type"], "candle");
        assert_eq!(payloads[0]["subscription"]["coin"], "BTC");
        assert_eq!(payloads[0]["subscription"]["interval"], "1m");
        assert_eq!(payloads[1]["subscription"]["type"], "trades");
    }
}
