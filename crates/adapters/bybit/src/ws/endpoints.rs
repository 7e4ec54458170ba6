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

//! The Bybit WebSocket endpoint registry.
//!
//! Topics are subscribed after connect with `{"op":"subscribe","args":[…]}`
//! frames (at most ten args per frame) and re-sent after every reconnect.

use polyfeed_model::{DataFeature, MarketDataError};
use polyfeed_runtime::{RequestParams, WsEndpointSpec, WsEntry};
use serde_json::json;

use super::parse::{
    BybitKlineMessageAdapter, BybitLiquidationMessageAdapter, BybitOrderBookMessageAdapter,
    BybitTickerFundingAdapter, BybitTickerMarkPriceAdapter, BybitTickerOpenInterestAdapter,
    BybitTradeMessageAdapter,
};
use crate::config;

fn kline_topic(symbol: &str, params: &RequestParams) -> Result<String, MarketDataError> {
    let interval = config::interval_str(params.require_timeframe()?)?;
    Ok(format!("kline.{interval}.{}", symbol.to_uppercase()))
}

fn trade_topic(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("publicTrade.{}", symbol.to_uppercase()))
}

fn order_book_topic(symbol: &str, params: &RequestParams) -> Result<String, MarketDataError> {
    let depth = params.depth.unwrap_or(50);
    Ok(format!("orderbook.{depth}.{}", symbol.to_uppercase()))
}

fn ticker_topic(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("tickers.{}", symbol.to_uppercase()))
}

fn liquidation_topic(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("liquidation.{}", symbol.to_uppercase()))
}

fn public_url(params: &RequestParams, _name: &str) -> String {
    config::ws_url(params.market_variant)
        .unwrap_or(config::BYBIT_WS_LINEAR_URL)
        .to_string()
}

fn public_url_combined(params: &RequestParams, _names: &[String]) -> String {
    config::ws_url(params.market_variant)
        .unwrap_or(config::BYBIT_WS_LINEAR_URL)
        .to_string()
}

fn subscribe_payloads(names: &[String]) -> Vec<serde_json::Value> {
    names
        .chunks(config::BYBIT_MAX_ARGS_PER_SUBSCRIPTION_REQUEST)
        .map(|chunk| json!({"op": "subscribe", "args": chunk}))
        .collect()
}

const fn spec(
    id: &'static str,
    build_stream_name: fn(&str, &RequestParams) -> Result<String, MarketDataError>,
) -> WsEndpointSpec {
    WsEndpointSpec {
        id,
        combined_supported: true,
        max_streams_per_connection: config::BYBIT_MAX_TOPICS_PER_CONNECTION,
        build_stream_name,
        build_single_url: public_url,
        build_combined_url: public_url_combined,
        build_subscribe_payloads: Some(subscribe_payloads),
        heartbeat_secs: Some(config::BYBIT_HEARTBEAT_SECS),
        heartbeat_msg: Some(config::BYBIT_PING_MESSAGE),
    }
}

static KLINE_ADAPTER: BybitKlineMessageAdapter = BybitKlineMessageAdapter;
static TRADE_ADAPTER: BybitTradeMessageAdapter = BybitTradeMessageAdapter;
static BOOK_ADAPTER: BybitOrderBookMessageAdapter = BybitOrderBookMessageAdapter;
static MARK_PRICE_ADAPTER: BybitTickerMarkPriceAdapter = BybitTickerMarkPriceAdapter;
static OPEN_INTEREST_ADAPTER: BybitTickerOpenInterestAdapter = BybitTickerOpenInterestAdapter;
static FUNDING_ADAPTER: BybitTickerFundingAdapter = BybitTickerFundingAdapter;
static LIQUIDATION_ADAPTER: BybitLiquidationMessageAdapter = BybitLiquidationMessageAdapter;

/// Resolves the WebSocket registry row for a feature.
///
/// Mark price, open interest and funding all ride the `tickers` topic with
/// feature-specific adapters.
#[must_use]
pub fn ws_entry(feature: DataFeature) -> Option<WsEntry> {
    let entry = match feature {
        DataFeature::Ohlcv => WsEntry {
            spec: spec("bybit.ws.ohlcv", kline_topic),
            adapter: &KLINE_ADAPTER,
        },
        DataFeature::Trades => WsEntry {
            spec: spec("bybit.ws.trades", trade_topic),
            adapter: &TRADE_ADAPTER,
        },
        DataFeature::OrderBook => WsEntry {
            spec: spec("bybit.ws.order_book", order_book_topic),
            adapter: &BOOK_ADAPTER,
        },
        DataFeature::MarkPrice => WsEntry {
            spec: spec("bybit.ws.mark_price", ticker_topic),
            adapter: &MARK_PRICE_ADAPTER,
        },
        DataFeature::OpenInterest => WsEntry {
            spec: spec("bybit.ws.open_interest", ticker_topic),
            adapter: &OPEN_INTEREST_ADAPTER,
        },
        DataFeature::FundingRate => WsEntry {
            spec: spec("bybit.ws.funding_rate", ticker_topic),
            adapter: &FUNDING_ADAPTER,
        },
        DataFeature::Liquidations => WsEntry {
            spec: spec("bybit.ws.liquidations", liquidation_topic),
            adapter: &LIQUIDATION_ADAPTER,
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

    fn params() -> RequestParams {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Bybit)
            .symbol("btcusdt")
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        RequestParams::from_request(&request, MarketVariant::LinearPerp)
    }

    #[rstest]
    fn topics_use_v5_format() {
        let p = params();
        assert_eq!(kline_topic("btcusdt", &p).unwrap(), "kline.1.BTCUSDT");
        assert_eq!(trade_topic("BTCUSDT", &p).unwrap(), "publicTrade.BTCUSDT");
        assert_eq!(order_book_topic("BTCUSDT", &p).unwrap(), "orderbook.50.BTCUSDT");
        assert_eq!(ticker_topic("BTCUSDT", &p).unwrap(), "tickers.BTCUSDT");
    }

    #[rstest]
    fn subscribe_frames_chunk_at_ten_args() {
        let names: Vec<String> = (0..25).map(|i| format!("kline.1.SYM{i}")).collect();
        let payloads = subscribe_payloads(&names);
        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0]["op"], "subscribe");
        assert_eq!(payloads[0]["args"].as_array().unwrap().len(), 10);
        assert_eq!(payloads[2]["args"].as_array().unwrap().len(), 5);
    }
}
