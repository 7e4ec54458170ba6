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

//! The Coinbase Exchange REST endpoint registry.

use polyfeed_model::{DataFeature, MarketDataError};
use polyfeed_runtime::{ChunkHint, ChunkPolicy, RequestParams, RestEndpointSpec, RestEntry};

use super::parse::{
    CoinbaseHealthAdapter, CoinbaseOhlcvAdapter, CoinbaseOrderBookAdapter, CoinbaseSymbolsAdapter,
    CoinbaseTradesAdapter,
};
use crate::config;

fn url(path: &str) -> String {
    format!("{}{path}", config::COINBASE_HTTP_URL)
}

fn time_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/time"))
}

fn candles_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url(&format!(
        "/products/{}/candles",
        params.require_venue_symbol()?
    )))
}

fn candles_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = vec![(
        "granularity".to_string(),
        config::granularity_secs(params.require_timeframe()?)?.to_string(),
    )];
    if let Some(start) = params.start_time {
        query.push(("start".to_string(), start.to_rfc3339()));
    }
    if let Some(end) = params.end_time {
        query.push(("end".to_string(), end.to_rfc3339()));
    }
    Ok(query)
}

fn trades_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url(&format!(
        "/products/{}/trades",
        params.require_venue_symbol()?
    )))
}

fn trades_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = Vec::new();
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::COINBASE_MAX_TRADES).to_string(),
        ));
    }
    // Cursor pagination: `before` returns older trades than the given id.
    if let Some(from_id) = params.from_id {
        query.push(("before".to_string(), from_id.to_string()));
    }
    Ok(query)
}

fn book_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url(&format!(
        "/products/{}/book",
        params.require_venue_symbol()?
    )))
}

fn book_query(_params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    Ok(vec![("level".to_string(), "2".to_string())])
}

fn products_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(url("/products"))
}

const HEALTH: RestEndpointSpec = RestEndpointSpec::get("coinbase.health", time_path);

const OHLCV: RestEndpointSpec = RestEndpointSpec::get("coinbase.ohlcv", candles_path)
    .with_query(candles_query)
    .with_chunking(
        ChunkPolicy::new(config::COINBASE_MAX_CANDLES),
        ChunkHint::time_based(),
    );

const TRADES: RestEndpointSpec =
    RestEndpointSpec::get("coinbase.trades", trades_path).with_query(trades_query);

const ORDER_BOOK: RestEndpointSpec =
    RestEndpointSpec::get("coinbase.order_book", book_path).with_query(book_query);

const SYMBOLS: RestEndpointSpec = RestEndpointSpec::get("coinbase.symbols", products_path);

static HEALTH_ADAPTER: CoinbaseHealthAdapter = CoinbaseHealthAdapter;
static OHLCV_ADAPTER: CoinbaseOhlcvAdapter = CoinbaseOhlcvAdapter;
static TRADES_ADAPTER: CoinbaseTradesAdapter = CoinbaseTradesAdapter;
static ORDER_BOOK_ADAPTER: CoinbaseOrderBookAdapter = CoinbaseOrderBookAdapter;
static SYMBOLS_ADAPTER: CoinbaseSymbolsAdapter = CoinbaseSymbolsAdapter;

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
        _ => return None,
    };
    Some(entry)
}
