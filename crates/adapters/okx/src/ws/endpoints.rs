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

//! The OKX WebSocket endpoint registry.
//!
//! Stream names encode `channel:instId` (e.g. `candle1m:BTC-USDT`); the
//! subscribe builder splits them back into v5 `{"channel", "instId"}` args.
//! Candle channels live on the business endpoint, trades on the public one.

use polyfeed_model::{DataFeature, MarketDataError};
use polyfeed_runtime::{RequestParams, WsEndpointSpec, WsEntry};
use serde_json::json;

use super::parse::{OkxCandleMessageAdapter, OkxTradeMessageAdapter};
use crate::config;

fn candle_stream_name(symbol: &str, params: &RequestParams) -> Result<String, MarketDataError> {
    let bar = config::bar_str(params.require_timeframe()?)?;
    Ok(format!("candle{bar}:{}", symbol.to_uppercase()))
}

fn trade_stream_name(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("trades:{}", symbol.to_uppercase()))
}

fn business_url(_params: &RequestParams, _name: &str) -> String {
    config::OKX_WS_BUSINESS_URL.to_string()
}

fn business_url_combined(_params: &RequestParams, _names: &[String]) -> String {
    config::OKX_WS_BUSINESS_URL.to_string()
}

fn public_url(_params: &RequestParams, _name: &str) -> String {
    config::OKX_WS_PUBLIC_URL.to_string()
}

fn public_url_combined(_params: &RequestParams, _names: &[String]) -> String {
    config::OKX_WS_PUBLIC_URL.to_string()
}

fn subscribe_payloads(names: &[String]) -> Vec<serde_json::Value> {
    let args: Vec<serde_json::Value> = names
        .iter()
        .filter_map(|name| {
            name.split_once(':')
                .map(|(channel, inst_id)| json!({"channel": channel, "instId": inst_id}))
        })
        .collect();
    vec![json!({"op": "subscribe", "args": args})]
}

static CANDLE_ADAPTER: OkxCandleMessageAdapter = OkxCandleMessageAdapter;
static TRADE_ADAPTER: OkxTradeMessageAdapter = OkxTradeMessageAdapter;

/// Resolves the WebSocket registry row for a feature.
#[must_use]
pub fn ws_entry(feature: DataFeature) -> Option<WsEntry> {
    let entry = match feature {
        DataFeature::Ohlcv => WsEntry {
            spec: WsEndpointSpec {
                id: "okx.ws.ohlcv",
                combined_supported: true,
                max_streams_per_connection: config::OKX_MAX_STREAMS_PER_CONNECTION,
                build_stream_name: candle_stream_name,
                build_single_url: business_url,
                build_combined_url: business_url_combined,
                build_subscribe_payloads: Some(subscribe_payloads),
                heartbeat_secs: Some(config::OKX_HEARTBEAT_SECS),
                heartbeat_msg: Some(config::OKX_PING_MESSAGE),
            },
            adapter: &CANDLE_ADAPTER,
        },
        DataFeature::Trades => WsEntry {
            spec: WsEndpointSpec {
                id: "okx.ws.trades",
                combined_supported: true,
                max_streams_per_connection: config::OKX_MAX_STREAMS_PER_CONNECTION,
                build_stream_name: trade_stream_name,
                build_single_url: public_url,
                build_combined_url: public_url_combined,
                build_subscribe_payloads: Some(subscribe_payloads),
                heartbeat_secs: Some(config::OKX_HEARTBEAT_SECS),
                heartbeat_msg: Some(config::OKX_PING_MESSAGE),
            },
            adapter: &TRADE_ADAPTER,
        },
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use polyfeed_model::{Exchange, MarketVariant, Timeframe};
    use polyfeed_runtime::DataRequestBuilder;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn stream_names_and_subscribe_args_round_trip() {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Okx)
            .symbol("BTCUSDT")
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        let params = RequestParams::from_request(&request, MarketVariant::Spot);

        let name = candle_stream_name("BTC-USDT", &params).unwrap();
        assert_eq!(name, "candle1m:BTC-USDT");

        let payloads = subscribe_payloads(&[name, "trades:ETH-USDT".to_string()]);
        assert_eq!(payloads.len(), 1);
        let args = payloads[0]["args"].as_array().unwrap();
        assert_eq!(args[0]["channel"], "candle1m");
        assert_eq!(args[0]["instId"], "BTC-USDT");
        assert_eq!(args[1]["channel"], "trades");
    }
}
