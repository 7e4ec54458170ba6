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

//! The Hyperliquid info-endpoint registry.
//!
//! Every row POSTs to `/info` with a `type`-discriminated body.

use polyfeed_model::{DataFeature, MarketDataError, time::datetime_to_ms};
use polyfeed_runtime::{ChunkHint, ChunkPolicy, RequestParams, RestEndpointSpec, RestEntry};
use serde_json::json;

use super::parse::{
    HyperliquidFundingRateAdapter, HyperliquidHealthAdapter, HyperliquidMarkPriceAdapter,
    HyperliquidOhlcvAdapter, HyperliquidOrderBookAdapter, HyperliquidSymbolsAdapter,
};
use crate::config;

fn info_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}/info", config::HYPERLIQUID_HTTP_URL))
}

fn candle_body(params: &RequestParams) -> Result<serde_json::Value, MarketDataError> {
    let interval = config::interval_str(params.require_timeframe()?)?;
    let mut req = serde_json::Map::new();
    req.insert("coin".to_string(), json!(params.require_venue_symbol()?));
    req.insert("interval".to_string(), json!(interval));
    if let Some(start) = params.start_time {
        req.insert("startTime".to_string(), json!(datetime_to_ms(start)));
    }
    if let Some(end) = params.end_time {
        req.insert("endTime".to_string(), json!(datetime_to_ms(end)));
    }
    Ok(json!({"type": "candleSnapshot", "req": req}))
}

fn l2_book_body(params: &RequestParams) -> Result<serde_json::Value, MarketDataError> {
    Ok(json!({"type": "l2Book", "coin": params.require_venue_symbol()?}))
}

fn meta_body(_params: &RequestParams) -> Result<serde_json::Value, MarketDataError> {
    Ok(json!({"type": "meta"}))
}

fn funding_history_body(params: &RequestParams) -> Result<serde_json::Value, MarketDataError> {
    let mut body = serde_json::Map::new();
    body.insert("type".to_string(), json!("fundingHistory"));
    body.insert("coin".to_string(), json!(params.require_venue_symbol()?));
    if let Some(start) = params.start_time {
        body.insert("startTime".to_string(), json!(datetime_to_ms(start)));
    }
    if let Some(end) = params.end_time {
        body.insert("endTime".to_string(), json!(datetime_to_ms(end)));
    }
    Ok(serde_json::Value::Object(body))
}

fn all_mids_body(_params: &RequestParams) -> Result<serde_json::Value, MarketDataError> {
    Ok(json!({"type": "allMids"}))
}

const HEALTH: RestEndpointSpec =
    RestEndpointSpec::post("hyperliquid.health", info_path, meta_body);

const OHLCV: RestEndpointSpec =
    RestEndpointSpec::post("hyperliquid.ohlcv", info_path, candle_body).with_chunking(
        ChunkPolicy::new(config::HYPERLIQUID_MAX_CANDLES),
        ChunkHint::time_based(),
    );

const ORDER_BOOK: RestEndpointSpec =
    RestEndpointSpec::post("hyperliquid.order_book", info_path, l2_book_body);

const SYMBOLS: RestEndpointSpec =
    RestEndpointSpec::post("hyperliquid.symbols", info_path, meta_body);

const FUNDING_RATE: RestEndpointSpec =
    RestEndpointSpec::post("hyperliquid.funding_rate", info_path, funding_history_body)
        .with_chunking(
            ChunkPolicy::new(config::HYPERLIQUID_MAX_FUNDING_RATES).requiring_start_time(),
            ChunkHint::time_based(),
        );

const MARK_PRICE: RestEndpointSpec =
    RestEndpointSpec::post("hyperliquid.mark_price", info_path, all_mids_body);

static HEALTH_ADAPTER: HyperliquidHealthAdapter = HyperliquidHealthAdapter;
static OHLCV_ADAPTER: HyperliquidOhlcvAdapter = HyperliquidOhlcvAdapter;
static ORDER_BOOK_ADAPTER: HyperliquidOrderBookAdapter = HyperliquidOrderBookAdapter;
static SYMBOLS_ADAPTER: HyperliquidSymbolsAdapter = HyperliquidSymbolsAdapter;
static FUNDING_RATE_ADAPTER: HyperliquidFundingRateAdapter = HyperliquidFundingRateAdapter;
static MARK_PRICE_ADAPTER: HyperliquidMarkPriceAdapter = HyperliquidMarkPriceAdapter;

/// Resolves the registry row for a feature.
#[must_use]
pub fn rest_entry(feature: DataFeature) -> Option<RestEntry> {
    let entry = match feature {
        DataFeature::Health => RestEntry {
            spec: HEALTH,
            adapter: &HEALTH_ADAPTER,
        },
        DataFeature::Ohlcv => RestEntry {
            spec: OHLCV,
            adapter: &OHLCV_ADAPTER,
        },
        DataFeature::OrderBook => RestEntry {
            spec: ORDER_BOOK,
            adapter: &ORDER_BOOK_ADAPTER,
        },
        DataFeature::SymbolMetadata => RestEntry {
            spec: SYMBOLS,
            adapter: &SYMBOLS_ADAPTER,
        },
        DataFeature::FundingRate => RestEntry {
            spec: FUNDING_RATE,
            adapter: &FUNDING_RATE_ADAPTER,
        },
        DataFeature::MarkPrice => RestEntry {
            spec: MARK_PRICE,
            adapter: &MARK_PRICE_ADAPTER,
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
    fn candle_body_is_type_discriminated() {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Hyperliquid)
            .market_type(polyfeed_model::MarketType::Futures)
            .symbol("BTCUSD")
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        let mut params = RequestParams::from_request(&request, MarketVariant::LinearPerp);
        params.venue_symbol = Some("BTC".to_string());

        let body = candle_body(&params).unwrap();
        assert_eq!(body["type"], "candleSnapshot");
        assert_eq!(body["req"]["coin"], "BTC");
        assert_eq!(body["req"]["interval"], "1m");
    }

    #[rstest]
    fn funding_requires_start_time_for_chunking() {
        let entry = rest_entry(DataFeature::FundingRate).unwrap();
        assert!(entry.spec.chunk_policy.unwrap().requires_start_time);
    }

    #[rstest]
    fn trades_have_no_rest_row() {
        assert!(rest_entry(DataFeature::Trades).is_none());
    }
}
