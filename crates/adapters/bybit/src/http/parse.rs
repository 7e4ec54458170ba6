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

//! Response adapters normalizing Bybit v5 payloads into domain types.
//!
//! Bybit wraps every payload in `{retCode, retMsg, result}` and returns most
//! lists newest-first; adapters validate the envelope and restore ascending
//! order.

use polyfeed_model::{
    Bar, BookLevel, FundingRate, MarketDataError, Ohlcv, OpenInterest, OrderBook, SeriesMeta,
    SymbolInfo, Trade,
    time::{ms_str_to_datetime, ms_to_datetime},
};
use polyfeed_runtime::{
    DataPayload, RequestParams, ResponseAdapter,
    json::{decimal_str, opt_decimal},
};
use serde_json::Value;

use super::models::{
    BybitFundingRateRaw, BybitKlineResult, BybitListResult, BybitOpenInterestRaw,
    BybitOrderBookResult, BybitResponse, BybitTradeRaw,
};

/// Validates the v5 envelope and extracts the typed `result`.
pub(crate) fn extract_result<T: serde::de::DeserializeOwned>(
    raw: &Value,
) -> Result<T, MarketDataError> {
    let envelope: BybitResponse<T> = serde_json::from_value(raw.clone())
        .map_err(|e| MarketDataError::Data(format!("Unexpected Bybit envelope shape: {e}")))?;
    if envelope.ret_code != 0 {
        return Err(MarketDataError::provider(
            envelope.ret_code.to_string(),
            envelope.ret_msg,
        ));
    }
    envelope
        .result
        .ok_or_else(|| MarketDataError::Data("Bybit response missing 'result'".to_string()))
}

/// Parses an execution id that may not be numeric (spot uses UUIDs) by
/// falling back to an FNV-1a hash. Collisions are possible but ids remain
/// stable per venue id.
pub(crate) fn parse_trade_id(exec_id: &str) -> u64 {
    exec_id.parse().unwrap_or_else(|_| {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in exec_id.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    })
}

/// Validates the envelope and passes the server time through.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitHealthAdapter;

impl ResponseAdapter for BybitHealthAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let result: Value = extract_result(raw)?;
        Ok(DataPayload::Health(result))
    }
}

/// Parses kline rows (newest first) into an ascending [`Ohlcv`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitOhlcvAdapter;

impl ResponseAdapter for BybitOhlcvAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let result: BybitKlineResult = extract_result(raw)?;

        let mut bars = Vec::with_capacity(result.list.len());
        for row in &result.list {
            if row.len() < 6 {
                return Err(MarketDataError::Data(format!(
                    "Kline row has {} fields, expected at least 6",
                    row.len()
                )));
            }
            bars.push(Bar::new(
                ms_str_to_datetime(&row[0])?,
                decimal_str(&row[1], "kline open")?,
                decimal_str(&row[2], "kline high")?,
                decimal_str(&row[3], "kline low")?,
                decimal_str(&row[4], "kline close")?,
                decimal_str(&row[5], "kline volume")?,
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

/// Parses recent trades; Bybit reports the taker side, so the buyer is the
/// maker exactly when the taker sold.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitTradesAdapter;

impl ResponseAdapter for BybitTradesAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let result: BybitListResult<BybitTradeRaw> = extract_result(raw)?;

        let mut trades = Vec::with_capacity(result.list.len());
        for row in result.list {
            trades.push(Trade::new(
                row.symbol.as_str(),
                parse_trade_id(&row.exec_id),
                decimal_str(&row.price, "trade price")?,
                decimal_str(&row.size, "trade size")?,
                None,
                ms_str_to_datetime(&row.time)?,
                row.side == "Sell",
                None,
            )?);
        }
        trades.sort_by_key(|trade| trade.ts);
        Ok(DataPayload::Trades(trades))
    }
}

/// Parses an order-book snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitOrderBookAdapter;

impl ResponseAdapter for BybitOrderBookAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let result: BybitOrderBookResult = extract_result(raw)?;

        let parse_side = |levels: &[[String; 2]]| -> Result<Vec<BookLevel>, MarketDataError> {
            levels
                .iter()
                .map(|level| {
                    Ok(BookLevel::new(
                        decimal_str(&level[0], "book price")?,
                        decimal_str(&level[1], "book size")?,
                    ))
                })
                .collect()
        };

        let book = OrderBook::new(
            result.s.as_str(),
            result.u,
            parse_side(&result.b)?,
            parse_side(&result.a)?,
            ms_to_datetime(result.ts)?,
        )?;
        Ok(DataPayload::Book(book))
    }
}

/// Parses `instruments-info` rows across categories (spot rows carry no
/// contract fields).
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitSymbolsAdapter;

impl ResponseAdapter for BybitSymbolsAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let result: BybitListResult<Value> = extract_result(raw)?;

        let mut symbols = Vec::with_capacity(result.list.len());
        for row in &result.list {
            let symbol = row
                .get("symbol")
                .and_then(Value::as_str)
                .ok_or_else(|| MarketDataError::Data("Instrument missing 'symbol'".to_string()))?;
            let base = row
                .get("baseCoin")
                .and_then(Value::as_str)
                .ok_or_else(|| MarketDataError::Data("Instrument missing 'baseCoin'".to_string()))?;
            let quote = row
                .get("quoteCoin")
                .and_then(Value::as_str)
                .ok_or_else(|| MarketDataError::Data("Instrument missing 'quoteCoin'".to_string()))?;

            let mut info = SymbolInfo::spot(symbol, base, quote);
            info.tick_size = opt_decimal(
                row.pointer("/priceFilter/tickSize"),
                "tick size",
            )?;
            info.step_size = opt_decimal(
                row.pointer("/lotSizeFilter/qtyStep")
                    .or_else(|| row.pointer("/lotSizeFilter/basePrecision")),
                "step size",
            )?;
            info.min_notional = opt_decimal(
                row.pointer("/lotSizeFilter/minNotionalValue"),
                "min notional",
            )?;
            info.contract_type = row
                .get("contractType")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .map(str::to_string);
            info.delivery_date = match row.get("deliveryTime").and_then(Value::as_str) {
                Some(ms) if ms != "0" && !ms.is_empty() => Some(ms_str_to_datetime(ms)?),
                _ => None,
            };
            symbols.push(info);
        }
        Ok(DataPayload::Symbols(symbols))
    }
}

/// Parses open-interest samples (newest first, venue-stamped).
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitOpenInterestAdapter;

impl ResponseAdapter for BybitOpenInterestAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let result: BybitListResult<BybitOpenInterestRaw> = extract_result(raw)?;
        let symbol = params.require_symbol()?;

        let mut samples = Vec::with_capacity(result.list.len());
        for row in result.list {
            samples.push(OpenInterest::new(
                symbol.as_str(),
                ms_str_to_datetime(&row.timestamp)?,
                decimal_str(&row.open_interest, "open interest")?,
                None,
            ));
        }
        samples.sort_by_key(|sample| sample.ts);
        Ok(DataPayload::OpenInterest(samples))
    }
}

/// Parses funding-rate history (newest first).
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitFundingRateAdapter;

impl ResponseAdapter for BybitFundingRateAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let result: BybitListResult<BybitFundingRateRaw> = extract_result(raw)?;

        let mut rates = Vec::with_capacity(result.list.len());
        for row in result.list {
            rates.push(FundingRate::new(
                row.symbol.as_str(),
                ms_str_to_datetime(&row.funding_rate_timestamp)?,
                decimal_str(&row.funding_rate, "funding rate")?,
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

    fn params(symbol: &str) -> RequestParams {
        let request = DataRequestBuilder::default()
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Bybit)
            .symbol(symbol)
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        RequestParams::from_request(&request, MarketVariant::LinearPerp)
    }

    #[rstest]
    fn error_envelope_carries_code_and_message() {
        let raw = json!({"retCode": 10001, "retMsg": "invalid symbol", "result": {}});
        let result = BybitTradesAdapter.parse(&raw, &params("NOPE"));
        match result {
            Err(MarketDataError::Provider { code, message }) => {
                assert_eq!(code, "10001");
                assert_eq!(message, "invalid symbol");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[rstest]
    fn kline_rows_newest_first_are_reversed() {
        let raw = json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "symbol": "BTCUSDT",
                "category": "linear",
                "list": [
                    ["1704067260000", "42050", "42200", "42000", "42150", "8.5", "358000"],
                    ["1704067200000", "42000", "42100", "41900", "42050", "12.3", "519000"]
                ]
            }
        });
        let payload = BybitOhlcvAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Ohlcv(series) = payload else {
            panic!("expected ohlcv")
        };
        assert_eq!(series.bars.len(), 2);
        assert!(series.bars[0].ts < series.bars[1].ts);
        assert_eq!(series.bars[0].open, dec!(42000));
    }

    #[rstest]
    fn taker_sell_means_buyer_maker() {
        let raw = json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "list": [
                    {"execId": "12345", "symbol": "BTCUSDT", "price": "42000.5", "size": "0.1", "side": "Sell", "time": "1704067200000"},
                    {"execId": "12346", "symbol": "BTCUSDT", "price": "42001.0", "size": "0.2", "side": "Buy", "time": "1704067201000"}
                ]
            }
        });
        let payload = BybitTradesAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Trades(trades) = payload else {
            panic!("expected trades")
        };
        assert!(trades[0].is_buyer_maker, "taker sell => buyer was maker");
        assert!(!trades[1].is_buyer_maker);
    }

    #[rstest]
    fn non_numeric_exec_ids_hash_stably() {
        let a = parse_trade_id("2a173c64-9a35-5cde-9f68-512b3a1b2c3d");
        let b = parse_trade_id("2a173c64-9a35-5cde-9f68-512b3a1b2c3d");
        assert_eq!(a, b);
        assert_eq!(parse_trade_id("42"), 42);
    }

    #[rstest]
    fn order_book_parses_both_sides() {
        let raw = json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "s": "BTCUSDT",
                "b": [["42000.0", "1.5"], ["41999.5", "2.0"]],
                "a": [["42000.5", "0.5"], ["42001.0", "3.0"]],
                "ts": 1704067200123_i64,
                "u": 18521288
            }
        });
        let payload = BybitOrderBookAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Book(book) = payload else {
            panic!("expected book")
        };
        assert_eq!(book.best_bid().unwrap().price, dec!(42000.0));
        assert_eq!(book.best_ask().unwrap().price, dec!(42000.5));
    }

    #[rstest]
    fn instruments_parse_filters_per_category() {
        let raw = json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "list": [{
                    "symbol": "BTCUSDT",
                    "baseCoin": "BTC",
                    "quoteCoin": "USDT",
                    "contractType": "LinearPerpetual",
                    "deliveryTime": "0",
                    "priceFilter": {"tickSize": "0.10"},
                    "lotSizeFilter": {"qtyStep": "0.001", "minNotionalValue": "5"}
                }]
            }
        });
        let payload = BybitSymbolsAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Symbols(symbols) = payload else {
            panic!("expected symbols")
        };
        assert_eq!(symbols[0].tick_size, Some(dec!(0.10)));
        assert_eq!(symbols[0].step_size, Some(dec!(0.001)));
        assert_eq!(symbols[0].contract_type.as_deref(), Some("LinearPerpetual"));
        assert_eq!(symbols[0].delivery_date, None);
    }

    #[rstest]
    fn open_interest_uses_venue_sample_times() {
        let raw = json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "list": [
                    {"openInterest": "120000.5", "timestamp": "1704070800000"},
                    {"openInterest": "119000.0", "timestamp": "1704067200000"}
                ]
            }
        });
        let payload = BybitOpenInterestAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::OpenInterest(samples) = payload else {
            panic!("expected open interest")
        };
        assert!(samples[0].ts < samples[1].ts, "restored ascending");
        assert_eq!(samples[1].open_interest, dec!(120000.5));
    }
}
