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

//! The Binance REST endpoint registry.
//!
//! Paths are absolute so one HTTP client serves both the spot and futures
//! hosts; the market variant in the parameter bag selects the base URL.

use polyfeed_model::{DataFeature, MarketDataError, MarketVariant, time::datetime_to_ms};
use polyfeed_runtime::{
    ChunkHint, ChunkPolicy, RequestParams, RestEndpointSpec, RestEntry, WeightPolicy,
};

use super::parse::{
    BinanceFundingRateAdapter, BinanceHealthAdapter, BinanceMarkPriceAdapter,
    BinanceOhlcvAdapter, BinanceOpenInterestAdapter, BinanceOpenInterestHistAdapter,
    BinanceOrderBookAdapter, BinanceSymbolsAdapter, BinanceTradesAdapter,
};
use crate::config;

fn market_path(params: &RequestParams, spot: &str, futures: &str) -> String {
    let base = config::http_base(params.market_variant);
    match params.market_variant {
        MarketVariant::Spot => format!("{base}{spot}"),
        _ => format!("{base}{futures}"),
    }
}

fn symbol_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    Ok(vec![(
        "symbol".to_string(),
        params.require_venue_symbol()?.to_uppercase(),
    )])
}

fn push_window(query: &mut Vec<(String, String)>, params: &RequestParams) {
    if let Some(start) = params.start_time {
        query.push(("startTime".to_string(), datetime_to_ms(start).to_string()));
    }
    if let Some(end) = params.end_time {
        query.push(("endTime".to_string(), datetime_to_ms(end).to_string()));
    }
}

fn ping_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(market_path(params, "/api/v3/ping", "/fapi/v1/ping"))
}

fn klines_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(market_path(params, "/api/v3/klines", "/fapi/v1/klines"))
}

fn klines_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = symbol_query(params)?;
    query.push((
        "interval".to_string(),
        config::interval_str(params.require_timeframe()?)?.to_string(),
    ));
    push_window(&mut query, params);
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BINANCE_MAX_KLINES).to_string(),
        ));
    }
    Ok(query)
}

fn trades_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(market_path(params, "/api/v3/trades", "/fapi/v1/trades"))
}

fn trades_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = symbol_query(params)?;
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BINANCE_MAX_TRADES).to_string(),
        ));
    }
    Ok(query)
}

fn historical_trades_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(market_path(
        params,
        "/api/v3/historicalTrades",
        "/fapi/v1/historicalTrades",
    ))
}

fn historical_trades_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = trades_query(params)?;
    if let Some(from_id) = params.from_id {
        query.push(("fromId".to_string(), from_id.to_string()));
    }
    Ok(query)
}

fn depth_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(market_path(params, "/api/v3/depth", "/fapi/v1/depth"))
}

fn depth_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = symbol_query(params)?;
    let cap = match params.market_variant {
        MarketVariant::Spot => 5000,
        _ => 1000,
    };
    let depth = params.depth.unwrap_or(100).min(cap);
    query.push(("limit".to_string(), depth.to_string()));
    Ok(query)
}

fn exchange_info_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(market_path(
        params,
        "/api/v3/exchangeInfo",
        "/fapi/v1/exchangeInfo",
    ))
}

fn open_interest_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!(
        "{}/fapi/v1/openInterest",
        config::http_base(params.market_variant)
    ))
}

fn open_interest_hist_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!(
        "{}/futures/data/openInterestHist",
        config::http_base(params.market_variant)
    ))
}

fn open_interest_hist_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = symbol_query(params)?;
    query.push((
        "period".to_string(),
        params.period.clone().unwrap_or_else(|| "5m".to_string()),
    ));
    push_window(&mut query, params);
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BINANCE_MAX_OPEN_INTEREST_HIST).to_string(),
        ));
    }
    Ok(query)
}

fn funding_rate_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!(
        "{}/fapi/v1/fundingRate",
        config::http_base(params.market_variant)
    ))
}

fn funding_rate_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = symbol_query(params)?;
    push_window(&mut query, params);
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BINANCE_MAX_FUNDING_RATES).to_string(),
        ));
    }
    Ok(query)
}

fn premium_index_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!(
        "{}/fapi/v1/premiumIndex",
        config::http_base(params.market_variant)
    ))
}

const HEALTH: RestEndpointSpec = RestEndpointSpec::get("binance.health", ping_path);

const OHLCV: RestEndpointSpec = RestEndpointSpec::get("binance.ohlcv", klines_path)
    .with_query(klines_query)
    .with_chunking(
        ChunkPolicy::new(config::BINANCE_MAX_KLINES).with_weight(2),
        ChunkHint::time_based(),
    )
    .with_weight(WeightPolicy::PerLimit(config::kline_weight));

const TRADES: RestEndpointSpec =
    RestEndpointSpec::get("binance.trades", trades_path).with_query(trades_query);

const HISTORICAL_TRADES: RestEndpointSpec =
    RestEndpointSpec::get("binance.historical_trades", historical_trades_path)
        .with_query(historical_trades_query);

const ORDER_BOOK: RestEndpointSpec =
    RestEndpointSpec::get("binance.order_book", depth_path).with_query(depth_query);

const SYMBOLS: RestEndpointSpec =
    RestEndpointSpec::get("binance.symbols", exchange_info_path);

const OPEN_INTEREST: RestEndpointSpec =
    RestEndpointSpec::get("binance.open_interest", open_interest_path).with_query(symbol_query);

const OPEN_INTEREST_HIST: RestEndpointSpec =
    RestEndpointSpec::get("binance.open_interest_hist", open_interest_hist_path)
        .with_query(open_interest_hist_query)
        .with_chunking(
            ChunkPolicy::new(config::BINANCE_MAX_OPEN_INTEREST_HIST),
            ChunkHint::time_based(),
        );

const FUNDING_RATE: RestEndpointSpec =
    RestEndpointSpec::get("binance.funding_rate", funding_rate_path)
        .with_query(funding_rate_query)
        .with_chunking(
            ChunkPolicy::new(config::BINANCE_MAX_FUNDING_RATES),
            ChunkHint::time_based(),
        );

const MARK_PRICE: RestEndpointSpec =
    RestEndpointSpec::get("binance.mark_price", premium_index_path).with_query(symbol_query);

static HEALTH_ADAPTER: BinanceHealthAdapter = BinanceHealthAdapter;
static OHLCV_ADAPTER: BinanceOhlcvAdapter = BinanceOhlcvAdapter;
static TRADES_ADAPTER: BinanceTradesAdapter = BinanceTradesAdapter;
static ORDER_BOOK_ADAPTER: BinanceOrderBookAdapter = BinanceOrderBookAdapter;
static SYMBOLS_ADAPTER: BinanceSymbolsAdapter = BinanceSymbolsAdapter;
static OPEN_INTEREST_ADAPTER: BinanceOpenInterestAdapter = BinanceOpenInterestAdapter;
static OPEN_INTEREST_HIST_ADAPTER: BinanceOpenInterestHistAdapter = BinanceOpenInterestHistAdapter;
static FUNDING_RATE_ADAPTER: BinanceFundingRateAdapter = BinanceFundingRateAdapter;
static MARK_PRICE_ADAPTER: BinanceMarkPriceAdapter = BinanceMarkPriceAdapter;

/// Resolves the registry row for a feature; `historical` selects the windowed
/// open-interest endpoint.
#[must_use]
pub fn rest_entry(feature: DataFeature, historical: bool) -> Option<RestEntry> {
    let entry = match feature {
        DataFeature::Health => RestEntry {
            spec: HEALTH,
            adapter: &HEALTH_ADAPTER,
        },
        DataFeature::Ohlcv => RestEntry {
            spec: OHLCV,
            adapter: &OHLCV_ADAPTER,
        },
        DataFeature::Trades => RestEntry {
            spec: TRADES,
            adapter: &TRADES_ADAPTER,
        },
        DataFeature::HistoricalTrades => RestEntry {
            spec: HISTORICAL_TRADES,
            adapter: &TRADES_ADAPTER,
        },
        DataFeature::OrderBook => RestEntry {
            spec: ORDER_BOOK,
            adapter: &ORDER_BOOK_ADAPTER,
        },
        DataFeature::SymbolMetadata => RestEntry {
            spec: SYMBOLS,
            adapter: &SYMBOLS_ADAPTER,
        },
        DataFeature::OpenInterest if historical => RestEntry {
            spec: OPEN_INTEREST_HIST,
            adapter: &OPEN_INTEREST_HIST_ADAPTER,
        },
        DataFeature::OpenInterest => RestEntry {
            spec: OPEN_INTEREST,
            adapter: &OPEN_INTEREST_ADAPTER,
        },
        DataFeature::FundingRate => RestEntry {
            spec: FUNDING_RATE,
            adapter: &FUNDING_RATE_ADAPTER,
        },
        DataFeature::MarkPrice => RestEntry {
            spec: MARK_PRICE,
            adapter: &MARK_PRICE_ADAPTER,
        },
        DataFeature::Liquidations => return None,
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
            .symbol("btcusdt")
            .timeframe(Timeframe::M1)
            .limit(1500_u32)
            .build()
            .unwrap();
        RequestParams::from_request(&request, variant)
    }

    #[rstest]
    fn kline_path_selects_host_by_variant() {
        let spot = klines_path(&params(MarketVariant::Spot)).unwrap();
        assert_eq!(spot, "https://api.binance.com/api/v3/klines");

        let futures = klines_path(&params(MarketVariant::LinearPerp)).unwrap();
        assert_eq!(futures, "https://fapi.binance.com/fapi/v1/klines");
    }

    #[rstest]
    fn kline_query_caps_limit_and_uppercases_symbol() {
        let query = klines_query(&params(MarketVariant::Spot)).unwrap();
        assert!(query.contains(&("symbol".to_string(), "BTCUSDT".to_string())));
        assert!(query.contains(&("interval".to_string(), "1m".to_string())));
        assert!(query.contains(&("limit".to_string(), "1000".to_string())));
    }

    #[rstest]
    fn registry_covers_futures_features() {
        for feature in [
            DataFeature::Health,
            DataFeature::Ohlcv,
            DataFeature::Trades,
            DataFeature::HistoricalTrades,
            DataFeature::OrderBook,
            DataFeature::SymbolMetadata,
            DataFeature::OpenInterest,
            DataFeature::FundingRate,
            DataFeature::MarkPrice,
        ] {
            assert!(rest_entry(feature, false).is_some(), "missing {feature}");
        }
        assert!(rest_entry(DataFeature::Liquidations, false).is_none());
    }

    #[rstest]
    fn open_interest_selects_historical_endpoint() {
        let current = rest_entry(DataFeature::OpenInterest, false).unwrap();
        let hist = rest_entry(DataFeature::OpenInterest, true).unwrap();
        assert_eq!(current.spec.id, "binance.open_interest");
        assert_eq!(hist.spec.id, "binance.open_interest_hist");
        assert!(hist.spec.chunk_policy.is_some());
    }
}
