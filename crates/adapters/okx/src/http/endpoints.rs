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

//! The OKX v5 REST endpoint registry.
//!
//! OKX paginates with `after`/`before` millisecond cursors: `after` returns
//! records older than the cursor, `before` newer. Time windows map the
//! request start onto `before` and the end onto `after`.

use polyfeed_model::{DataFeature, MarketDataError, time::datetime_to_ms};
use polyfeed_runtime::{ChunkHint, ChunkPolicy, RequestParams, RestEndpointSpec, RestEntry};

use super::parse::{
    OkxFundingRateAdapter, OkxHealthAdapter, OkxOhlcvAdapter, OkxOpenInterestAdapter,
    OkxOrderBookAdapter, OkxSymbolsAdapter, OkxTradesAdapter,
};
use crate::config;

fn url(path: &str) -> String {
    format!("{}{path}", config::OKX_HTTP_URL)
}

fn inst_id_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    Ok(vec![(
        "instId".to_string(),
        params.require_venue_symbol()?.to_uppercase(),
    )])
}

fn time_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/api/v5/public/time"))
}

fn candles_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/api/v5/market/candles"))
}

fn candles_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = inst_id_query(params)?;
    query.push((
        "bar".to_string(),
        config::bar_str(params.require_timeframe()?)?.to_string(),
    ));
    if let Some(start) = params.start_time {
        query.push(("before".to_string(), datetime_to_ms(start).to_string()));
    }
    if let Some(end) = params.end_time {
        query.push(("after".to_string(), datetime_to_ms(end).to_string()));
    }
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::OKX_MAX_CANDLES).to_string(),
        ));
    }
    Ok(query)
}

fn trades_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/api/v5/market/trades"))
}

fn trades_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = inst_id_query(params)?;
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::OKX_MAX_TRADES).to_string(),
        ));
    }
    Ok(query)
}

fn books_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/api/v5/market/books"))
}

fn books_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = inst_id_query(params)?;
    query.push((
        "sz".to_string(),
        params
            .depth
            .unwrap_or(100)
            .min(config::OKX_MAX_BOOK_DEPTH)
            .to_string(),
    ));
    Ok(query)
}

fn instruments_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/api/v5/public/instruments"))
}

fn instruments_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    Ok(vec![(
        "instType".to_string(),
        config::inst_type(params.market_variant).to_string(),
    )])
}

fn open_interest_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/api/v5/public/open-interest"))
}

fn open_interest_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = vec![(
        "instType".to_string(),
        config::inst_type(params.market_variant).to_string(),
    )];
    query.push((
        "instId".to_string(),
        params.require_venue_symbol()?.to_uppercase(),
    ));
    Ok(query)
}

fn funding_rate_path(params: &RequestParams) -> Result<String, MarketDataError> {
    // History when any window bound or historical mode is requested.
    if params.historical || params.start_time.is_some() || params.end_time.is_some() {
        Ok(url("/api/v5/public/funding-rate-history"))
    } else {
        Ok(url("/api/v5/public/funding-rate"))
    }
}

fn funding_rate_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = inst_id_query(params)?;
    if let Some(start) = params.start_time {
        query.push(("before".to_string(), datetime_to_ms(start).to_string()));
    }
    if let Some(end) = params.end_time {
        query.push(("after".to_string(), datetime_to_ms(end).to_string()));
    }
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::OKX_MAX_FUNDING_RATES).to_string(),
        ));
    }
    Ok(query)
}

const HEALTH: RestEndpointSpec = RestEndpointSpec::get("okx.health", time_path);

const OHLCV: RestEndpointSpec = RestEndpointSpec::get("okx.ohlcv", candles_path)
    .with_query(candles_query)
    .with_chunking(
        ChunkPolicy::new(config::OKX_MAX_CANDLES),
        ChunkHint::time_based(),
    );

const TRADES: RestEndpointSpec =
    RestEndpointSpec::get("okx.trades", trades_path).with_query(trades_query);

const ORDER_BOOK: RestEndpointSpec =
    RestEndpointSpec::get("okx.order_book", books_path).with_query(books_query);

const SYMBOLS: RestEndpointSpec =
    RestEndpointSpec::get("okx.symbols", instruments_path).with_query(instruments_query);

const OPEN_INTEREST: RestEndpointSpec =
    RestEndpointSpec::get("okx.open_interest", open_interest_path).with_query(open_interest_query);

const FUNDING_RATE: RestEndpointSpec =
    RestEndpointSpec::get("okx.funding_rate", funding_rate_path)
        .with_query(funding_rate_query)
        .with_chunking(
            ChunkPolicy::new(config::OKX_MAX_FUNDING_RATES),
            ChunkHint::time_based(),
        );

static HEALTH_ADAPTER: OkxHealthAdapter = OkxHealthAdapter;
static OHLCV_ADAPTER: OkxOhlcvAdapter = OkxOhlcvAdapter;
static TRADES_ADAPTER: OkxTradesAdapter = OkxTradesAdapter;
static ORDER_BOOK_ADAPTER: OkxOrderBookAdapter = OkxOrderBookAdapter;
static SYMBOLS_ADAPTER: OkxSymbolsAdapter = OkxSymbolsAdapter;
static OPEN_INTEREST_ADAPTER: OkxOpenInterestAdapter = OkxOpenInterestAdapter;
static FUNDING_RATE_ADAPTER: OkxFundingRateAdapter = OkxFundingRateAdapter;

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
