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

//! Response adapters normalizing Kraken payloads.
//!
//! Spot responses arrive as `{error: [], result: {<pair-key>: …, last: …}}`
//! with the payload keyed by the venue's canonical pair name; adapters take
//! the single pair entry and ignore the cursor. Futures responses use
//! `{result: "success" | "error", …}`.
//!
//! Spot trades carry no venue trade id in their row shape (the id is the
//! seventh element only on newer API versions), so missing ids are
//! synthesized from the nanosecond timestamp.

use chrono::{DateTime, Utc};
use polyfeed_model::{
    Bar, BookLevel, FundingRate, MarketDataError, Ohlcv, OpenInterest, OrderBook, SeriesMeta,
    SymbolInfo, Trade, time::secs_to_datetime,
};
use polyfeed_runtime::{
    DataPayload, RequestParams, ResponseAdapter,
    json::{as_array, as_decimal, as_i64, as_str, as_u64, field, opt_decimal},
};
use serde_json::Value;

use crate::symbol::strip_asset_prefix;

/// Validates the spot envelope and returns the pair-keyed payload entry.
pub(crate) fn extract_spot_result(raw: &Value) -> Result<Value, MarketDataError> {
    let errors = raw.get("error").and_then(Value::as_array);
    if let Some(errors) = errors
        && !errors.is_empty()
    {
        let joined = errors
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(MarketDataError::provider("kraken", joined));
    }

    let result = field(raw, "result")?;
    let object = result
        .as_object()
        .ok_or_else(|| MarketDataError::Data("Kraken result is not an object".to_string()))?;

    // The payload is keyed by the venue pair name, next to a `last` cursor.
    object
        .iter()
        .find(|(key, _)| key.as_str() != "last")
        .map(|(_, value)| value.clone())
        .ok_or_else(|| MarketDataError::Data("Kraken result carries no pair entry".to_string()))
}

/// Validates the futures envelope (`{result: "success"}`).
fn check_futures_result(raw: &Value) -> Result<(), MarketDataError> {
    match raw.get("result").and_then(Value::as_str) {
        Some("success") | None => Ok(()),
        Some(_) => {
            let errors = raw
                .get("errors")
                .and_then(Value::as_array)
                .map(|errors| {
                    errors
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("; ")
                })
                .unwrap_or_else(|| "Unknown futures error".to_string());
            Err(MarketDataError::provider("kraken_futures", errors))
        }
    }
}

/// Kraken trade timestamps are fractional seconds; convert without routing
/// prices through floats (the timestamp itself is not monetary).
fn fractional_secs_to_datetime(value: &Value) -> Result<DateTime<Utc>, MarketDataError> {
    let secs = match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MarketDataError::Data(format!("Unparseable timestamp {value}")))?,
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| MarketDataError::Data(format!("Unparseable timestamp '{s}'")))?,
        _ => return Err(MarketDataError::Data(format!("Unparseable timestamp {value}"))),
    };
    DateTime::<Utc>::from_timestamp_micros((secs * 1_000_000.0) as i64)
        .ok_or_else(|| MarketDataError::Data(format!("Timestamp out of range: {secs}")))
}

/// Validates the envelope and passes the system status through.
#[derive(Clone, Copy, Debug, Default)]
pub struct KrakenHealthAdapter;

impl ResponseAdapter for KrakenHealthAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        if let Some(errors) = raw.get("error").and_then(Value::as_array)
            && !errors.is_empty()
        {
            let joined = errors
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MarketDataError::provider("kraken", joined));
        }
        Ok(DataPayload::Health(
            raw.get("result").cloned().unwrap_or_else(|| raw.clone()),
        ))
    }
}

/// Parses OHLC rows `[time, open, high, low, close, vwap, volume, count]`
/// (ascending already).
#[derive(Clone, Copy, Debug, Default)]
pub struct KrakenOhlcvAdapter;

impl ResponseAdapter for KrakenOhlcvAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows = extract_spot_result(raw)?;
        let rows = as_array(&rows, "OHLC rows")?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            let row = as_array(row, "OHLC row")?;
            if row.len() < 7 {
                return Err(MarketDataError::Data(format!(
                    "OHLC row has {} fields, expected at least 7",
                    row.len()
                )));
            }
            bars.push(Bar::new(
                secs_to_datetime(as_i64(&row[0], "OHLC time")?)?,
                as_decimal(&row[1], "OHLC open")?,
                as_decimal(&row[2], "OHLC high")?,
                as_decimal(&row[3], "OHLC low")?,
                as_decimal(&row[4], "OHLC close")?,
                as_decimal(&row[6], "OHLC volume")?,
                true,
            )?);
        }
        bars.sort_by_key(|bar| bar.ts);

        let meta = SeriesMeta::new(
            params.require_symbol()?.as_str(),
            params.require_timeframe()?,
        );
        Ok(DataPayload::Ohlcv(Ohlcv::new(meta, bars)?))
    }
}

/// Parses trade rows `[price, volume, time, side, order_type, misc, (id)]`.
///
/// `side` is the taker side (`b`/`s`), so the buyer is the maker exactly
/// when the taker sold.
#[derive(Clone, Copy, Debug, Default)]
pub struct KrakenTradesAdapter;

impl ResponseAdapter for KrakenTradesAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows = extract_spot_result(raw)?;
        let rows = as_array(&rows, "trade rows")?;
        let symbol = params.require_symbol()?;

        let mut trades = Vec::with_capacity(rows.len());
        for row in rows {
            let row = as_array(row, "trade row")?;
            if row.len() < 4 {
                return Err(MarketDataError::Data(format!(
                    "Trade row has {} fields, expected at least 4",
                    row.len()
                )));
            }
            let ts = fractional_secs_to_datetime(&row[2])?;
            let trade_id = match row.get(6) {
                Some(id) if !id.is_null() => as_u64(id, "trade id")?,
                // No venue id on this API version: synthesize from the
                // nanosecond timestamp (documented collision trade-off).
                _ => ts.timestamp_nanos_opt().unwrap_or_default() as u64,
            };
            trades.push(Trade::new(
                symbol.as_str(),
                trade_id,
                as_decimal(&row[0], "trade price")?,
                as_decimal(&row[1], "trade volume")?,
                None,
                ts,
                as_str(&row[3], "trade side")? == "s",
                None,
            )?);
        }
        trades.sort_by_key(|trade| trade.ts);
        Ok(DataPayload::Trades(trades))
    }
}

/// Parses a depth snapshot (`{bids: [[price, vol, ts]], asks}`).
#[derive(Clone, Copy, Debug, Default)]
pub struct KrakenOrderBookAdapter;

impl ResponseAdapter for KrakenOrderBookAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let book = extract_spot_result(raw)?;

        let parse_side = |side: &Value, context: &str| -> Result<Vec<BookLevel>, MarketDataError> {
            as_array(side, context)?
                .iter()
                .map(|level| {
                    let level = as_array(level, "book level")?;
                    if level.len() < 2 {
                        return Err(MarketDataError::Data("Book level too short".to_string()));
                    }
                    Ok(BookLevel::new(
                        as_decimal(&level[0], "book price")?,
                        as_decimal(&level[1], "book volume")?,
                    ))
                })
                .collect()
        };

        let ts = Utc::now();
        let book = OrderBook::new(
            params.require_symbol()?.as_str(),
            ts.timestamp_millis() as u64,
            parse_side(field(&book, "bids")?, "bids")?,
            parse_side(field(&book, "asks")?, "asks")?,
            ts,
        )?;
        Ok(DataPayload::Book(book))
    }
}

/// Parses `AssetPairs` rows into symbol metadata, un-prefixing classic asset
/// codes and applying the XBT alias.
#[derive(Clone, Copy, Debug, Default)]
pub struct KrakenSymbolsAdapter;

impl ResponseAdapter for KrakenSymbolsAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        if let Some(errors) = raw.get("error").and_then(Value::as_array)
            && !errors.is_empty()
        {
            let joined = errors
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MarketDataError::provider("kraken", joined));
        }
        let result = field(raw, "result")?;
        let pairs = result
            .as_object()
            .ok_or_else(|| MarketDataError::Data("AssetPairs result is not an object".to_string()))?;

        let mut symbols = Vec::with_capacity(pairs.len());
        for (pair_key, row) in pairs {
            let base = row
                .get("base")
                .and_then(Value::as_str)
                .map(strip_asset_prefix)
                .ok_or_else(|| MarketDataError::Data("Pair missing 'base'".to_string()))?;
            let quote = row
                .get("quote")
                .and_then(Value::as_str)
                .map(strip_asset_prefix)
                .ok_or_else(|| MarketDataError::Data("Pair missing 'quote'".to_string()))?;

            let venue_symbol = row
                .get("altname")
                .and_then(Value::as_str)
                .unwrap_or(pair_key.as_str());

            let mut info = SymbolInfo::spot(
                venue_symbol,
                polyfeed_runtime::symbol::apply_alias(base),
                polyfeed_runtime::symbol::apply_alias(quote),
            );
            info.tick_size = opt_decimal(row.get("tick_size"), "tick size")?;
            info.min_notional = opt_decimal(row.get("costmin"), "cost min")?;
            info.step_size = match row.get("lot_decimals").and_then(Value::as_u64) {
                Some(decimals) if decimals <= 28 => {
                    Some(rust_decimal::Decimal::new(1, decimals as u32))
                }
                _ => None,
            };
            symbols.push(info);
        }
        Ok(DataPayload::Symbols(symbols))
    }
}

/// Parses futures tickers into the open-interest sample for the requested
/// contract.
#[derive(Clone, Copy, Debug, Default)]
pub struct KrakenOpenInterestAdapter;

impl ResponseAdapter for KrakenOpenInterestAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_futures_result(raw)?;
        let tickers = as_array(field(raw, "tickers")?, "tickers")?;
        let venue_symbol = params.require_venue_symbol()?.to_uppercase();

        let ticker = tickers
            .iter()
            .find(|t| {
                t.get("symbol")
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.eq_ignore_ascii_case(&venue_symbol))
            })
            .ok_or_else(|| {
                MarketDataError::provider(
                    "kraken_futures",
                    format!("No ticker for contract '{venue_symbol}'"),
                )
            })?;

        let open_interest = field(ticker, "openInterest")?;
        let ts = match raw.get("serverTime").and_then(Value::as_str) {
            Some(time) => DateTime::parse_from_rfc3339(time)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    MarketDataError::Data(format!("Unparseable server time '{time}'"))
                })?,
            None => Utc::now(),
        };

        Ok(DataPayload::OpenInterest(vec![OpenInterest::new(
            &venue_symbol,
            ts,
            as_decimal(open_interest, "open interest")?,
            None,
        )]))
    }
}

/// Parses futures historical funding rates.
#[derive(Clone, Copy, Debug, Default)]
pub struct KrakenFundingRateAdapter;

impl ResponseAdapter for KrakenFundingRateAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_futures_result(raw)?;
        let rows = as_array(field(raw, "rates")?, "funding rates")?;
        let symbol = params.require_venue_symbol()?;

        let mut rates = Vec::with_capacity(rows.len());
        for row in rows {
            let time = as_str(field(row, "timestamp")?, "funding timestamp")?;
            let funding_time = DateTime::parse_from_rfc3339(time)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| MarketDataError::Data(format!("Unparseable timestamp '{time}'")))?;
            let rate = row
                .get("relativeFundingRate")
                .or_else(|| row.get("fundingRate"))
                .ok_or_else(|| MarketDataError::Data("Missing funding rate".to_string()))?;
            rates.push(FundingRate::new(
                symbol,
                funding_time,
                as_decimal(rate, "funding rate")?,
                None,
            ));
        }
        rates.sort_by_key(|rate| rate.funding_time);
        Ok(DataPayload::FundingRates(rates))
    }
}

#[cfg(test)]
mod tests {
    use polyfeed_model::{DataFeature, Exchange, MarketVariant, Timeframe};
    use polyfeed_runtime::DataRequestBuilder;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn params(symbol: &str, venue: &str) -> RequestParams {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Kraken)
            .symbol(symbol)
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        let mut params = RequestParams::from_request(&request, MarketVariant::Spot);
        params.venue_symbol = Some(venue.to_string());
        params
    }

    #[rstest]
    fn error_array_surfaces_as_provider_error() {
        let raw = json!({"error": ["EQuery:Unknown asset pair"]});
        let result = KrakenOhlcvAdapter.parse(&raw, &params("BTCUSD", "XBTUSD"));
        match result {
            Err(MarketDataError::Provider { message, .. }) => {
                assert!(message.contains("Unknown asset pair"));
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[rstest]
    fn ohlc_rows_parse_from_pair_keyed_result() {
        let raw = json!({
            "error": [],
            "result": {
                "XXBTZUSD": [
                    [1704067200, "42000.0", "42100.0", "41900.0", "42050.0", "42010.3", "12.5", 100],
                    [1704067260, "42050.0", "42200.0", "42000.0", "42150.0", "42100.1", "8.25", 80]
                ],
                "last": 1704067260
            }
        });
        let payload = KrakenOhlcvAdapter
            .parse(&raw, &params("BTCUSD", "XBTUSD"))
            .unwrap();
        let DataPayload::Ohlcv(series) = payload else {
            panic!("expected ohlcv")
        };
        assert_eq!(series.meta.symbol.as_str(), "BTCUSD");
        assert_eq!(series.bars.len(), 2);
        assert_eq!(series.bars[1].volume, dec!(8.25));
    }

    #[rstest]
    fn trades_synthesize_missing_ids_from_timestamps() {
        let raw = json!({
            "error": [],
            "result": {
                "XXBTZUSD": [
                    ["42000.1", "0.5", 1704067200.1234, "s", "l", ""],
                    ["42000.2", "0.25", 1704067201.5678, "b", "m", "", 987654]
                ],
                "last": "1704067201567800000"
            }
        });
        let payload = KrakenTradesAdapter
            .parse(&raw, &params("BTCUSD", "XBTUSD"))
            .unwrap();
        let DataPayload::Trades(trades) = payload else {
            panic!("expected trades")
        };
        assert!(trades[0].is_buyer_maker, "taker sell => buyer maker");
        assert!(trades[0].trade_id > 0, "synthesized from timestamp");
        assert_eq!(trades[1].trade_id, 987_654);
    }

    #[rstest]
    fn futures_tickers_yield_open_interest_sample() {
        let raw = json!({
            "result": "success",
            "serverTime": "2024-01-01T00:00:00.000Z",
            "tickers": [
                {"symbol": "PF_XBTUSD", "markPrice": 42000.5, "openInterest": 5500.25, "fundingRate": 0.000012},
                {"symbol": "PF_ETHUSD", "markPrice": 2300.0, "openInterest": 900.0}
            ]
        });
        let payload = KrakenOpenInterestAdapter
            .parse(&raw, &params("BTCUSD", "PF_XBTUSD"))
            .unwrap();
        let DataPayload::OpenInterest(samples) = payload else {
            panic!("expected open interest")
        };
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].open_interest, dec!(5500.25));
    }

    #[rstest]
    fn futures_error_envelope_is_surfaced() {
        let raw = json!({"result": "error", "errors": ["apiLimitExceeded"]});
        let result = KrakenOpenInterestAdapter.parse(&raw, &params("BTCUSD", "PF_XBTUSD"));
        assert!(matches!(result, Err(MarketDataError::Provider { .. })));
    }

    #[rstest]
    fn asset_pairs_strip_classic_prefixes() {
        let raw = json!({
            "error": [],
            "result": {
                "XXBTZUSD": {
                    "altname": "XBTUSD",
                    "wsname": "XBT/USD",
                    "base": "XXBT",
                    "quote": "ZUSD",
                    "lot_decimals": 8,
                    "tick_size": "0.1",
                    "costmin": "0.5"
                }
            }
        });
        let payload = KrakenSymbolsAdapter
            .parse(&raw, &params("BTCUSD", "XBTUSD"))
            .unwrap();
        let DataPayload::Symbols(symbols) = payload else {
            panic!("expected symbols")
        };
        assert_eq!(symbols[0].base_asset.as_str(), "BTC");
        assert_eq!(symbols[0].quote_asset.as_str(), "USD");
        assert_eq!(symbols[0].tick_size, Some(dec!(0.1)));
        assert_eq!(symbols[0].step_size, Some(dec!(0.00000001)));
    }
}
