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

//! The Binance WebSocket endpoint registry.
//!
//! Streams are multiplexed by URL (`/stream?streams=a/b/c`); the combined
//! frame format is used even for single streams so payloads always carry
//! their stream name.

use polyfeed_model::{DataFeature, MarketDataError, MarketVariant};
use polyfeed_runtime::{RequestParams, WsEndpointSpec, WsEntry};

use super::parse::{
    BinanceKlineMessageAdapter, BinanceLiquidationMessageAdapter, BinanceMarkPriceMessageAdapter,
    BinanceOrderBookMessageAdapter, BinanceTradeMessageAdapter,
};
use crate::config;

fn kline_stream_name(symbol: &str, params: &RequestParams) -> Result<String, MarketDataError> {
    let interval = config::interval_str(params.require_timeframe()?)?;
    Ok(format!("{}@kline_{interval}", symbol.to_lowercase()))
}

fn trade_stream_name(symbol: &str, params: &RequestParams) -> Result<String, MarketDataError> {
    // Futures expose aggregated trades only.
    let channel = match params.market_variant {
        MarketVariant::Spot => "trade",
        _ => "aggTrade",
    };
    Ok(format!("{}@{channel}", symbol.to_lowercase()))
}

fn depth_stream_name(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}@depth20@100ms", symbol.to_lowercase()))
}

fn mark_price_stream_name(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}@markPrice@1s", symbol.to_lowercase()))
}

fn force_order_stream_name(symbol: &str, _params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}@forceOrder", symbol.to_lowercase()))
}

fn combined_url(params: &RequestParams, names: &[String]) -> String {
    format!(
        "{}/stream?streams={}",
        config::ws_base(params.market_variant),
        names.join("/")
    )
}

fn single_url(params: &RequestParams, name: &str) -> String {
    // The combined frame format is used even for one stream.
    format!("{}/stream?streams={name}", config::ws_base(params.market_variant))
}

const fn spec(id: &'static str, build_stream_name: fn(&str, &RequestParams) -> Result<String, MarketDataError>) -> WsEndpointSpec {
    WsEndpointSpec {
        id,
        combined_supported: true,
        max_streams_per_connection: config::BINANCE_MAX_STREAMS_PER_CONNECTION,
        build_stream_name,
        build_single_url: single_url,
        build_combined_url: combined_url,
        build_subscribe_payloads: None,
        heartbeat_secs: None,
        heartbeat_msg: None,
    }
}

static KLINE_ADAPTER: BinanceKlineMessageAdapter = BinanceKlineMessageAdapter;
static TRADE_ADAPTER: BinanceTradeMessageAdapter = BinanceTradeMessageAdapter;
static BOOK_ADAPTER: BinanceOrderBookMessageAdapter = BinanceOrderBookMessageAdapter;
static MARK_PRICE_ADAPTER: BinanceMarkPriceMessageAdapter = BinanceMarkPriceMessageAdapter;
static LIQUIDATION_ADAPTER: BinanceLiquidationMessageAdapter = BinanceLiquidationMessageAdapter;

/// Resolves the WebSocket registry row for a feature.
#[must_use]
pub fn ws_entry(feature: DataFeature) -> Option<WsEntry> {
    let entry = match feature {
        DataFeature::Ohlcv => WsEntry {
            spec: spec("binance.ws.ohlcv", kline_stream_name),
            adapter: &KLINE_ADAPTER,
        },
        DataFeature::Trades => WsEntry {
            spec: spec("binance.ws.trades", trade_stream_name),
            adapter: &TRADE_ADAPTER,
        },
        DataFeature::OrderBook => WsEntry {
            spec: spec("binance.ws.order_book", depth_stream_name),
            adapter: &BOOK_ADAPTER,
        },
        DataFeature::MarkPrice => WsEntry {
            spec: spec("binance.ws.mark_price", mark_price_stream_name),
            adapter: &MARK_PRICE_ADAPTER,
        },
        DataFeature::Liquidations => WsEntry {
            spec: spec("binance.ws.liquidations", force_order_stream_name),
            adapter: &LIQUIDATION_ADAPTER,
        },
        _ => return None,
    };
    Some(entry)
}

#[cfg(test)]
mod tests {
    use polyfeed_model::{Exchange, Timeframe};
    use polyfeed_runtime::DataRequestBuilder;
    use rstest::rstest;

    use super::*;

    fn params(variant: MarketVariant) -> RequestParams {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Binance)
            .symbol("BTCUSDT")
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        RequestParams::from_request(&request, variant)
    }

    #[rstest]
    fn stream_names_are_lowercase() {
        let params = params(MarketVariant::Spot);
        assert_eq!(
            kline_stream_name("BTCUSDT", &params).unwrap(),
            "btcusdt@kline_1m"
        );
        assert_eq!(trade_stream_name("BTCUSDT", &params).unwrap(), "btcusdt@trade");
    }

    #[rstest]
    fn futures_trades_use_agg_trade_channel() {
        let params = params(MarketVariant::LinearPerp);
        assert_eq!(
            trade_stream_name("BTCUSDT", &params).unwrap(),
            "btcusdt@aggTrade"
        );
    }

    #[rstest]
    fn combined_url_joins_streams() {
        let params = params(MarketVariant::Spot);
        let url = combined_url(
            &params,
            &["btcusdt@kline_1m".to_string(), "ethusdt@kline_1m".to_string()],
        );
        assert_eq!(
            url,
            "wss://stream.binance.com:9443/stream?streams=btcusdt@kline_1m/ethusdt@kline_1m"
        );
    }
}
