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

//! The Bybit v5 REST endpoint registry.

use polyfeed_model::{DataFeature, MarketDataError, time::datetime_to_ms};
use polyfeed_runtime::{
    ChunkHint, ChunkPolicy, RequestParams, RestEndpointSpec, RestEntry, WeightPolicy,
};

use super::parse::{
    BybitFundingRateAdapter, BybitHealthAdapter, BybitOhlcvAdapter, BybitOpenInterestAdapter,
    BybitOrderBookAdapter, BybitSymbolsAdapter, BybitTradesAdapter,
};
use crate::config;

fn category_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    Ok(vec![(
        "category".to_string(),
        config::category(params.market_variant)?.to_string(),
    )])
}

fn category_symbol_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = category_query(params)?;
    query.push((
        "symbol".to_string(),
        params.require_venue_symbol()?.to_uppercase(),
    ));
    Ok(query)
}

fn time_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}/v5/market/time", config::BYBIT_HTTP_URL))
}

fn kline_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}/v5/market/kline", config::BYBIT_HTTP_URL))
}

fn kline_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = category_symbol_query(params)?;
    query.push((
        "interval".to_string(),
        config::interval_str(params.require_timeframe()?)?.to_string(),
    ));
    if let Some(start) = params.start_time {
        query.push(("start".to_string(), datetime_to_ms(start).to_string()));
    }
    if let Some(end) = params.end_time {
        query.push(("end".to_string(), datetime_to_ms(end).to_string()));
    }
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BYBIT_MAX_KLINES).to_string(),
        ));
    }
    Ok(query)
}

fn trades_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}/v5/market/recent-trade", config::BYBIT_HTTP_URL))
}

fn trades_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = category_symbol_query(params)?;
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BYBIT_MAX_TRADES).to_string(),
        ));
    }
    Ok(query)
}

fn order_book_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}/v5/market/orderbook", config::BYBIT_HTTP_URL))
}

fn order_book_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = category_symbol_query(params)?;
    let cap = match config::category(params.market_variant)? {
        "spot" => 200,
        _ => 500,
    };
    query.push((
        "limit".to_string(),
        params.depth.unwrap_or(50).min(cap).to_string(),
    ));
    Ok(query)
}

fn instruments_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!(
        "{}/v5/market/instruments-info",
        config::BYBIT_HTTP_URL
    ))
}

fn open_interest_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!("{}/v5/market/open-interest", config::BYBIT_HTTP_URL))
}

fn open_interest_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = category_symbol_query(params)?;
    let period = params.period.as_deref().unwrap_or("5m");
    query.push((
        "intervalTime".to_string(),
        config::oi_interval_time(period)?.to_string(),
    ));
    if let Some(start) = params.start_time {
        query.push(("startTime".to_string(), datetime_to_ms(start).to_string()));
    }
    if let Some(end) = params.end_time {
        query.push(("endTime".to_string(), datetime_to_ms(end).to_string()));
    }
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BYBIT_MAX_OPEN_INTEREST).to_string(),
        ));
    }
    Ok(query)
}

fn funding_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(format!(
        "{}/v5/market/funding/history",
        config::BYBIT_HTTP_URL
    ))
}

fn funding_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = category_symbol_query(params)?;
    if let Some(start) = params.start_time {
        query.push(("startTime".to_string(), datetime_to_ms(start).to_string()));
    }
    if let Some(end) = params.end_time {
        query.push(("endTime".to_string(), datetime_to_ms(end).to_string()));
    }
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::BYBIT_MAX_FUNDING_RATES).to_string(),
        ));
    }
    Ok(query)
}

const HEALTH: RestEndpointSpec = RestEndpointSpec::get("bybit.health", time_path);

const OHLCV: RestEndpointSpec = RestEndpointSpec::get("bybit.ohlcv", kline_path)
    .with_query(kline_query)
    .with_chunking(
        ChunkPolicy::new(config::BYBIT_MAX_KLINES),
        ChunkHint::time_based(),
    )
    .with_weight(WeightPolicy::Static(1));

const TRADES: RestEndpointSpec =
    RestEndpointSpec::get("bybit.trades", trades_path).with_query(trades_query);

const ORDER_BOOK: RestEndpointSpec =
    RestEndpointSpec::get("bybit.order_book", order_book_path).with_query(order_book_query);

const SYMBOLS: RestEndpointSpec =
    RestEndpointSpec::get("bybit.symbols", instruments_path).with_query(category_query);

const OPEN_INTEREST: RestEndpointSpec =
    RestEndpointSpec::get("bybit.open_interest", open_interest_path)
        .with_query(open_interest_query)
        .with_chunking(
            ChunkPolicy::new(config::BYBIT_MAX_OPEN_INTEREST),
            ChunkHint::time_based(),
        );

const FUNDING_RATE: RestEndpointSpec = RestEndpointSpec::get("bybit.funding_rate", funding_path)
    .with_query(funding_query)
    .with_chunking(
        ChunkPolicy::new(config::BYBIT_MAX_FUNDING_RATES),
        ChunkHint::time_based(),
    );

static HEALTH_ADAPTER: BybitHealthAdapter = BybitHealthAdapter;
static OHLCV_ADAPTER: BybitOhlcvAdapter = BybitOhlcvAdapter;
static TRADES_ADAPTER: BybitTradesAdapter = BybitTradesAdapter;
static ORDER_BOOK_ADAPTER: BybitOrderBookAdapter = BybitOrderBookAdapter;
static SYMBOLS_ADAPTER: BybitSymbolsAdapter = BybitSymbolsAdapter;
static OPEN_INTEREST_ADAPTER: BybitOpenInterestAdapter = BybitOpenInterestAdapter;
static FUNDING_RATE_ADAPTER: BybitFundingRateAdapter = BybitFundingRateAdapter;

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
        DataFeature::Trades => RestEntry {
            spec: TRADES,
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
        DataFeature::OpenInterest => RestEntry {
            spec: OPEN_INTEREST,
            adapter: &OPEN_INTEREST_ADAPTER,
        },
        DataFeature::FundingRate => RestEntry {
            spec: FUNDING_RATE,
            adapter: &FUNDING_RATE_ADAPTER,
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

    fn params(variant: MarketVariant) -> RequestParams {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Bybit)
            .symbol("btcusdt")
            .timeframe(Timeframe::H1)
            .limit(5000_u32)
            .build()
            .unwrap();
        RequestParams::from_request(&request, variant)
    }

    #[rstest]
    fn kline_query_includes_category_and_caps_limit() {
        let query = kline_query(&params(MarketVariant::LinearPerp)).unwrap();
        assert!(query.contains(&("category".to_string(), "linear".to_string())));
        assert!(query.contains(&("symbol".to_string(), "BTCUSDT".to_string())));
        assert!(query.contains(&("interval".to_string(), "60".to_string())));
        assert!(query.contains(&("limit".to_string(), "1000".to_string())));
    }

    #[rstest]
    fn order_book_depth_caps_differ_per_category() {
        let mut p = params(MarketVariant::Spot);
        p.depth = Some(400);
        let query = order_book_query(&p).unwrap();
        assert!(query.contains(&("limit".to_string(), "200".to_string())));

        let mut p = params(MarketVariant::LinearPerp);
        p.depth = Some(400);
        let query = order_book_query(&p).unwrap();
        assert!(query.contains(&("limit".to_string(), "400".to_string())));
    }

    #[rstest]
    fn registry_rows_cover_capability_claims() {
        for feature in [
            DataFeature::Health,
            DataFeature::Ohlcv,
            DataFeature::Trades,
            DataFeature::OrderBook,
            DataFeature::SymbolMetadata,
            DataFeature::OpenInterest,
            DataFeature::FundingRate,
        ] {
            assert!(rest_entry(feature).is_some(), "missing {feature}");
        }
        assert!(rest_entry(DataFeature::MarkPrice).is_none());
    }
}
