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

//! The MEXC REST endpoint registry.

use polyfeed_model::{DataFeature, MarketDataError, MarketType, time::datetime_to_ms};
use polyfeed_runtime::{ChunkHint, ChunkPolicy, RequestParams, RestEndpointSpec, RestEntry};

use super::parse::{
    MexcHealthAdapter, MexcOhlcvAdapter, MexcOpenInterestAdapter, MexcSymbolsAdapter,
    MexcTradesAdapter,
};
use crate::config;

fn spot_url(path: &str) -> String {
    format!("{}{path}", config::MEXC_SPOT_HTTP_URL)
}

fn ping_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/api/v3/ping"))
}

fn klines_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/api/v3/klines"))
}

fn klines_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = vec![
        (
            "symbol".to_string(),
            params.require_venue_symbol()?.to_uppercase(),
        ),
        (
            "interval".to_string(),
            config::interval_str(params.require_timeframe()?)?.to_string(),
        ),
    ];
    if let Some(start) = params.start_time {
        query.push(("startTime".to_string(), datetime_to_ms(start).to_string()));
    }
    if let Some(end) = params.end_time {
        query.push(("endTime".to_string(), datetime_to_ms(end).to_string()));
    }
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::MEXC_MAX_KLINES).to_string(),
        ));
    }
    Ok(query)
}

fn trades_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/api/v3/trades"))
}

fn trades_query(params: &RequestParams) -> Result<Vec<(String, String)>, MarketDataError> {
    let mut query = vec![(
        "symbol".to_string(),
        params.require_venue_symbol()?.to_uppercase(),
    )];
    if let Some(limit) = params.limit {
        query.push((
            "limit".to_string(),
            limit.min(config::MEXC_MAX_TRADES).to_string(),
        ));
    }
    Ok(query)
}

fn exchange_info_path(_params: &RequestParams) -> Result<String, MarketDataError> {
    Ok(spot_url("/api/v3/exchangeInfo"))
}

fn contract_ticker_path(params: &RequestParams) -> Result<String, MarketDataError> {
    let symbol = config::contract_symbol(params.require_symbol()?.as_str())?;
    Ok(format!(
        "{}/api/v1/contract/ticker?symbol={symbol}",
        config::MEXC_CONTRACT_HTTP_URL
    ))
}

const HEALTH: RestEndpointSpec = RestEndpointSpec::get("mexc.health", ping_path);

const OHLCV: RestEndpointSpec = RestEndpointSpec::get("mexc.ohlcv", klines_path)
    .with_query(klines_query)
    .with_chunking(
        ChunkPolicy::new(config::MEXC_MAX_KLINES),
        ChunkHint::time_based(),
    );

const TRADES: RestEndpointSpec =
    RestEndpointSpec::get("mexc.trades", trades_path).with_query(trades_query);

const SYMBOLS: RestEndpointSpec = RestEndpointSpec::get("mexc.symbols", exchange_info_path);

const OPEN_INTEREST: RestEndpointSpec =
    RestEndpointSpec::get("mexc.open_interest", contract_ticker_path);

static HEALTH_ADAPTER: MexcHealthAdapter = MexcHealthAdapter;
static OHLCV_ADAPTER: MexcOhlcvAdapter = MexcOhlcvAdapter;
static TRADES_ADAPTER: MexcTradesAdapter = MexcTradesAdapter;
static SYMBOLS_ADAPTER: MexcSymbolsAdapter = MexcSymbolsAdapter;
static OPEN_INTEREST_ADAPTER: MexcOpenInterestAdapter = MexcOpenInterestAdapter;

/// Resolves the registry row for a feature.
#[must_use]
pub fn rest_entry(feature: DataFeature, market_type: MarketType) -> Option<RestEntry> {
    let entry = match (feature, market_type) {
        (DataFeature::Health, _) => RestEntry {
            spec: HEALTH,
            adapter: &HEALTH_ADAPTER,
        },
        (DataFeature::Ohlcv, MarketType::Spot) => RestEntry {
            spec: OHLCV,
            adapter: &OHLCV_ADAPTER,
        },
        (DataFeature::Trades, MarketType::Spot) => RestEntry {
            spec: TRADES,
            adapter: &TRADES_ADAPTER,
        },
        (DataFeature::SymbolMetadata, MarketType::Spot) => RestEntry {
            spec: SYMBOLS,
            adapter: &SYMBOLS_ADAPTER,
        },
        (DataFeature::OpenInterest, MarketType::Futures) => RestEntry {
            spec: OPEN_INTEREST,
            adapter: &OPEN_INTEREST_ADAPTER,
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
    fn kline_query_uses_mexc_interval_codes() {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Mexc)
            .symbol("btcusdt")
            .timeframe(Timeframe::H1)
            .build()
            .unwrap();
        let params = RequestParams::from_request(&request, MarketVariant::Spot);
        let query = klines_query(&params).unwrap();
        assert!(query.contains(&("interval".to_string(), "60m".to_string())));
    }

    #[rstest]
    fn registry_is_spot_except_contract_open_interest() {
        assert!(rest_entry(DataFeature::Ohlcv, MarketType::Spot).is_some());
        assert!(rest_entry(DataFeature::Ohlcv, MarketType::Futures).is_none());
        assert!(rest_entry(DataFeature::OpenInterest, MarketType::Futures).is_some());
        assert!(rest_entry(DataFeature::OpenInterest, MarketType::Spot).is_none());
        assert!(rest_entry(DataFeature::OrderBook, MarketType::Spot).is_none());
    }
}
