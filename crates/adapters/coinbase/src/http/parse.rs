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

//! Response adapters normalizing Coinbase Exchange payloads.

use chrono::{DateTime, Utc};
use polyfeed_model::{
    Bar, BookLevel, MarketDataError, Ohlcv, OrderBook, SeriesMeta, SymbolInfo, Trade,
    time::secs_to_datetime,
};
use polyfeed_runtime::{
    DataPayload, RequestParams, ResponseAdapter,
    json::{as_array, as_decimal, as_i64, decimal_str, opt_decimal_str},
};
use serde_json::Value;

use super::models::{CoinbaseBookRaw, CoinbaseProductRaw, CoinbaseTradeRaw};

fn decode<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T, MarketDataError> {
    serde_json::from_value(raw.clone())
        .map_err(|e| MarketDataError::Data(format!("Unexpected Coinbase payload shape: {e}")))
}

/// Surfaces a `{message}` error object delivered with HTTP 200.
fn check_error(raw: &Value) -> Result<(), MarketDataError> {
    if let Some(message) = raw.get("message").and_then(Value::as_str) {
        return Err(MarketDataError::provider("coinbase", message));
    }
    Ok(())
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, MarketDataError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MarketDataError::Data(format!("Unparseable RFC 3339 timestamp '{value}'")))
}

/// Passes the server time through unparsed.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoinbaseHealthAdapter;

impl ResponseAdapter for CoinbaseHealthAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        Ok(DataPayload::Health(raw.clone()))
    }
}

/// Parses candle rows `[time, low, high, open, close, volume]` (numbers,
/// newest first) into an ascending [`Ohlcv`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CoinbaseOhlcvAdapter;

impl ResponseAdapter for CoinbaseOhlcvAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let rows = as_array(raw, "candle array")?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            let row = as_array(row, "candle row")?;
            if row.len() < 6 {
                return Err(MarketDataError::Data(format!(
                    "Candle row has {} fields, expected 6",
                    row.len()
                )));
            }
            bars.push(Bar::new(
                secs_to_datetime(as_i64(&row[0], "candle time")?)?,
                as_decimal(&row[3], "candle open")?,
                as_decimal(&row[2], "candle high")?,
                as_decimal(&row[1], "candle low")?,
                as_decimal(&row[4], "candle close")?,
                as_decimal(&row[5], "candle volume")?,
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

/// Parses trades; Coinbase reports the **maker** side, so `side == "buy"`
/// maps directly onto `is_buyer_maker`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoinbaseTradesAdapter;

impl ResponseAdapter for CoinbaseTradesAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let rows: Vec<CoinbaseTradeRaw> = decode(raw)?;
        let symbol = params.require_symbol()?;

        let mut trades = Vec::with_capacity(rows.len());
        for row in rows {
            trades.push(Trade::new(
                symbol.as_str(),
                row.trade_id,
                decimal_str(&row.price, "trade price")?,
                decimal_str(&row.size, "trade size")?,
                None,
                parse_rfc3339(&row.time)?,
                row.side.eq_ignore_ascii_case("buy"),
                None,
            )?);
        }
        trades.sort_by_key(|trade| trade.ts);
        Ok(DataPayload::Trades(trades))
    }
}

/// Parses a level-2 book snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoinbaseOrderBookAdapter;

impl ResponseAdapter for CoinbaseOrderBookAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let book: CoinbaseBookRaw = decode(raw)?;

        let parse_side = |levels: &[Value]| -> Result<Vec<BookLevel>, MarketDataError> {
            levels
                .iter()
                .map(|level| {
                    let level = as_array(level, "book level")?;
                    if level.len() < 2 {
                        return Err(MarketDataError::Data("Book level too short".to_string()));
                    }
                    Ok(BookLevel::new(
                        as_decimal(&level[0], "book price")?,
                        as_decimal(&level[1], "book size")?,
                    ))
                })
                .collect()
        };

        let ts = match book.time.as_deref() {
            Some(time) => parse_rfc3339(time)?,
            None => Utc::now(),
        };
        let book = OrderBook::new(
            params.require_symbol()?.as_str(),
            book.sequence,
            parse_side(&book.bids)?,
            parse_side(&book.asks)?,
            ts,
        )?;
        Ok(DataPayload::Book(book))
    }
}

/// Parses `/products` rows into symbol metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoinbaseSymbolsAdapter;

impl ResponseAdapter for CoinbaseSymbolsAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let rows: Vec<CoinbaseProductRaw> = decode(raw)?;

        let mut symbols = Vec::with_capacity(rows.len());
        for row in rows {
            if row.status.as_deref().is_some_and(|s| s != "online") {
                continue;
            }
            let mut info = SymbolInfo::spot(row.id.as_str(), &row.base_currency, &row.quote_currency);
            info.tick_size = opt_decimal_str(row.quote_increment.as_deref(), "quote increment")?;
            info.step_size = opt_decimal_str(row.base_increment.as_deref(), "base increment")?;
            info.min_notional = opt_decimal_str(row.min_market_funds.as_deref(), "min funds")?;
            symbols.push(info);
        }
        Ok(DataPayload::Symbols(symbols))
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
            .exchange(Exchange::Coinbase)
            .symbol(symbol)
            .timeframe(Timeframe::H1)
            .build()
            .unwrap();
        RequestParams::from_request(&request, MarketVariant::Spot)
    }

    #[rstest]
    fn candles_newest_first_numbers_are_normalized() {
        // Rows are [time, low, high, open, close, volume] as numbers.
        let raw = json!([
            [1704070800, 41900.0, 42100.5, 42000.0, 42050.0, 12.5],
            [1704067200, 41800.0, 42050.0, 41900.0, 42000.0, 9.25]
        ]);
        let payload = CoinbaseOhlcvAdapter.parse(&raw, &params("BTC-USD")).unwrap();
        let DataPayload::Ohlcv(series) = payload else {
            panic!("expected ohlcv")
        };
        assert_eq!(series.bars.len(), 2);
        assert!(series.bars[0].ts < series.bars[1].ts, "sorted ascending");
        assert_eq!(series.bars[0].open, dec!(41900.0));
        assert_eq!(series.bars[1].high, dec!(42100.5));
    }

    #[rstest]
    fn error_message_surfaces_as_provider_error() {
        let raw = json!({"message": "NotFound"});
        let result = CoinbaseOhlcvAdapter.parse(&raw, &params("NOPE-USD"));
        assert!(matches!(result, Err(MarketDataError::Provider { .. })));
    }

    #[rstest]
    fn maker_buy_side_maps_to_buyer_maker() {
        let raw = json!([
            {"time": "2024-01-01T00:00:00.000000Z", "trade_id": 74, "price": "42000.10", "size": "0.01", "side": "buy"},
            {"time": "2024-01-01T00:00:01.000000Z", "trade_id": 75, "price": "42000.20", "size": "0.02", "side": "sell"}
        ]);
        let payload = CoinbaseTradesAdapter.parse(&raw, &params("BTC-USD")).unwrap();
        let DataPayload::Trades(trades) = payload else {
            panic!("expected trades")
        };
        assert!(trades[0].is_buyer_maker);
        assert!(!trades[1].is_buyer_maker);
        assert_eq!(trades[0].trade_id, 74);
    }

    #[rstest]
    fn book_levels_ignore_order_counts() {
        let raw = json!({
            "sequence": 3,
            "bids": [["295.96", "4.39", 2]],
            "asks": [["295.97", "25.23", 12]]
        });
        let payload = CoinbaseOrderBookAdapter.parse(&raw, &params("BTC-USD")).unwrap();
        let DataPayload::Book(book) = payload else {
            panic!("expected book")
        };
        assert_eq!(book.best_bid().unwrap().price, dec!(295.96));
        assert_eq!(book.last_update_id, 3);
    }

    #[rstest]
    fn products_filter_offline_markets() {
        let raw = json!([
            {"id": "BTC-USD", "base_currency": "BTC", "quote_currency": "USD", "quote_increment": "0.01", "base_increment": "0.00000001", "min_market_funds": "1", "status": "online"},
            {"id": "DEAD-USD", "base_currency": "DEAD", "quote_currency": "USD", "status": "delisted"}
        ]);
        let payload = CoinbaseSymbolsAdapter.parse(&raw, &params("BTC-USD")).unwrap();
        let DataPayload::Symbols(symbols) = payload else {
            panic!("expected symbols")
        };
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].tick_size, Some(dec!(0.01)));
    }
}
