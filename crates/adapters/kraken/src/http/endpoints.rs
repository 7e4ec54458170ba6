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

//! The Kraken REST endpoint registry (spot plus futures derivatives data).

use polyfeed_model::{DataFeature, MarketDataError, MarketType, time::datetime_to_secs};
use polyfeed_runtime::{ChunkHint, ChunkPolicy, RequestParams, RestEndpointSpec, RestEntry};

use super::parse::{
    KrakenFundingRateAdapter, KrakenHealthAdapter, KrakenOhlcvAdapter, KrakenOpenInterestAdapter,
    KrakenOrderBookAdapter, KrakenSymbolsAdapter, KrakenTradesAdapter,
};
use crate::config;

fn spot_url(path: &str) -> String {
    format!("{}{path}", config::KRAKEN_SPOT_HTTP_URL)
}

fn futures_url(path: &str) -> String {
    format!("{}{path}", config::KRAKEN_FUTURES_HTTP_URL)
}

fn pair_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    Ok(vec![(
        "pair".to_string(),
        params.require_venue_symbol()?.to_uppercase(),
    )])
}

fn system_status_path(params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(match params.market_type {
        MarketType::Spot => spot_url("/0/public/SystemStatus"),
        _ => futures_url("/api/v3/instruments/status"),
    })
}

fn ohlc_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/0/public/OHLC"))
}

fn ohlc_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = pair_query(params)?;
    query.push((
        "interval".to_string(),
        config::interval_minutes(params.require_timeframe()?)?.to_string(),
    ));
    // `since` is exclusive of the given second.
    if let Some(start) = params.start_time {
        query.push(("since".to_string(), (datetime_to_secs(start) - 1).to_string()));
    }
    Ok(query)
}

fn trades_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/0/public/Trades"))
}

fn trades_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = pair_query(params)?;
    if let Some(limit) = params.limit {
        query.push((
            "count".to_string(),
            limit.min(config::KRAKEN_MAX_TRADES).to_string(),
        ));
    }
    // Historical continuation: `since` takes the nanosecond cursor.
    if let Some(from_id) = params.from_id {
        query.push(("since".to_string(), from_id.to_string()));
    } else if let Some(start) = params.start_time {
        query.push(("since".to_string(), datetime_to_secs(start).to_string()));
    }
    Ok(query)
}

fn depth_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/0/public/Depth"))
}

fn depth_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = pair_query(params)?;
    query.push((
        "count".to_string(),
        params
            .depth
            .unwrap_or(100)
            .min(config::KRAKEN_MAX_BOOK_DEPTH)
            .to_string(),
    ));
    Ok(query)
}

fn asset_pairs_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/0/public/AssetPairs"))
}

fn tickers_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(futures_url("/api/v3/tickers"))
}

fn funding_rates_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(futures_url("/api/v4/historicalfundingrates"))
}

fn funding_rates_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    Ok(vec![(
        "symbol".to_string(),
        params.require_venue_symbol()?.to_uppercase(),
    )])
}

const HEALTH: RestEndpointSpec = RestEndpointSpec::get("kraken.health", system_status_path);

const OHLCV: RestEndpointSpec = RestEndpointSpec::get("kraken.ohlcv", ohlc_path)
    .with_query(ohlc_query)
    .with_chunking(
        ChunkPolicy::new(config::KRAKEN_MAX_OHLC_BARS),
        ChunkHint::time_based(),
    );

const TRADES: RestEndpointSpec =
    RestEndpointSpec::get("kraken.trades", trades_path).with_query(trades_query);

const ORDER_BOOK: RestEndpointSpec =
    RestEndpointSpec::get("kraken.order_book", depth_path).with_query(depth_query);

const SYMBOLS: RestEndpointSpec = RestEndpointSpec::get("kraken.symbols", asset_pairs_path);

const OPEN_INTEREST: RestEndpointSpec =
    RestEndpointSpec::get("kraken.open_interest", tickers_path);

const FUNDING_RATE: RestEndpointSpec =
    RestEndpointSpec::get("kraken.funding_rate", funding_rates_path)
        .with_query(funding_rates_query);

static HEALTH_ADAPTER: KrakenHealthAdapter = KrakenHealthAdapter;
static OHLCV_ADAPTER: KrakenOhlcvAdapter = KrakenOhlcvAdapter;
static TRADES_ADAPTER: KrakenTradesAdapter = KrakenTradesAdapter;
static ORDER_BOOK_ADAPTER: KrakenOrderBookAdapter = KrakenOrderBookAdapter;
static SYMBOLS_ADAPTER: KrakenSymbolsAdapter = KrakenSymbolsAdapter;
static OPEN_INTEREST_ADAPTER: KrakenOpenInterestAdapter = KrakenOpenInterestAdapter;
static FUNDING_RATE_ADAPTER: KrakenFundingRateAdapter = KrakenFundingRateAdapter;

/// Resolves the registry row for a feature.
///
/// Historical trades reuse the trades endpoint with the nanosecond `since`
/// cursor.
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
        DataFeature::Trades | DataFeature::HistoricalTrades => RestEntry {
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

    #[rstest]
    fn ohlc_query_uses_minute_intervals() {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Kraken)
            .symbol("BTCUSD")
            .timeframe(Timeframe::H1)
            .build()
            .unwrap();
        let mut params = RequestParams::from_request(&request, MarketVariant::Spot);
        params.venue_symbol = Some("XBTUSD".to_string());

        let query = ohlc_query(&params).unwrap();
        assert!(query.contains(&("pair".to_string(), "XBTUSD".to_string())));
        assert!(query.contains(&("interval".to_string(), "60".to_string())));
    }

    #[rstest]
    fn futures_endpoints_use_derivatives_host() {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::OpenInterest)
            .exchange(Exchange::Kraken)
            .market_type(polyfeed_model::MarketType::Futures)
            .symbol("BTCUSD")
            .build()
            .unwrap();
        let params = RequestParams::from_request(&request, MarketVariant::LinearPerp);

        assert!(tickers_path(&params)
            .unwrap()
            .starts_with("https://futures.kraken.com/derivatives"));
    }
}
