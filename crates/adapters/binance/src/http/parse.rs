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

//! Response adapters normalizing Binance payloads into domain types.

use polyfeed_model::{
    Bar, BookLevel, FundingRate, MarkPrice, MarketDataError, Ohlcv, OpenInterest, OrderBook,
    SeriesMeta, SymbolInfo, Trade, time::ms_to_datetime,
};
use polyfeed_runtime::{
    DataPayload, RequestParams, ResponseAdapter,
    json::{as_array, as_decimal, as_i64, decimal_str, opt_decimal_str},
};
use serde_json::Value;

use super::models::{
    BinanceDepthRaw, BinanceExchangeInfoRaw, BinanceFundingRateRaw, BinanceOpenInterestHistRaw,
    BinanceOpenInterestRaw, BinancePremiumIndexRaw, BinanceTradeRaw,
};

/// Surfaces a Binance `{code, msg}` error object delivered with HTTP 200.
fn check_error(raw: &Value) -> Result<(), MarketDataError> {
    if let Some(code) = raw.get("code").and_then(Value::as_i64)
        && code != 0
    {
        let msg = raw
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(MarketDataError::provider(code.to_string(), msg));
    }
    Ok(())
}

fn decode<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T, MarketDataError> {
    serde_json::from_value(raw.clone())
        .map_err(|e| MarketDataError::Data(format!("Unexpected Binance payload shape: {e}")))
}

/// Passes the ping/health payload through unparsed.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceHealthAdapter;

impl ResponseAdapter for BinanceHealthAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        Ok(DataPayload::Health(raw.clone()))
    }
}

/// Parses kline rows (`[open_time, o, h, l, c, v, close_time, …]`).
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceOhlcvAdapter;

impl ResponseAdapter for BinanceOhlcvAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let rows = as_array(raw, "kline array")?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            let row = as_array(row, "kline row")?;
            if row.len() < 6 {
                return Err(MarketDataError::Data(format!(
                    "Kline row has {} fields, expected at least 6",
                    row.len()
                )));
            }
            bars.push(Bar::new(
                ms_to_datetime(as_i64(&row[0], "kline open time")?)?,
                as_decimal(&row[1], "kline open")?,
                as_decimal(&row[2], "kline high")?,
                as_decimal(&row[3], "kline low")?,
                as_decimal(&row[4], "kline close")?,
                as_decimal(&row[5], "kline volume")?,
                true,
            )?);
        }

        let meta = SeriesMeta::new(
            params.require_symbol()?.as_str(),
            params.require_timeframe()?,
        );
        Ok(DataPayload::Ohlcv(Ohlcv::new(meta, bars)?))
    }
}

/// Parses trade rows; `isBuyerMaker` maps directly onto the domain flag.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceTradesAdapter;

impl ResponseAdapter for BinanceTradesAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let rows: Vec<BinanceTradeRaw> = decode(raw)?;
        let symbol = params.require_symbol()?;

        let mut trades = Vec::with_capacity(rows.len());
        for row in rows {
            trades.push(Trade::new(
                symbol.as_str(),
                row.id,
                decimal_str(&row.price, "trade price")?,
                decimal_str(&row.qty, "trade quantity")?,
                opt_decimal_str(row.quote_qty.as_deref(), "trade quote quantity")?,
                ms_to_datetime(row.time)?,
                row.is_buyer_maker,
                row.is_best_match,
            )?);
        }
        Ok(DataPayload::Trades(trades))
    }
}

/// Parses a depth snapshot into an [`OrderBook`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceOrderBookAdapter;

impl ResponseAdapter for BinanceOrderBookAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let depth: BinanceDepthRaw = decode(raw)?;

        let parse_side = |levels: &[[String; 2]]| -> Result<Vec<BookLevel>, MarketDataError> {
            levels
                .iter()
                .map(|level| {
                    Ok(BookLevel::new(
                        decimal_str(&level[0], "book price")?,
                        decimal_str(&level[1], "book quantity")?,
                    ))
                })
                .collect()
        };

        // Spot snapshots carry no timestamp; stamp on receipt.
        let ts = match depth.transaction_time.or(depth.event_time) {
            Some(ms) => ms_to_datetime(ms)?,
            None => chrono::Utc::now(),
        };

        let book = OrderBook::new(
            params.require_symbol()?.as_str(),
            depth.last_update_id,
            parse_side(&depth.bids)?,
            parse_side(&depth.asks)?,
            ts,
        )?;
        Ok(DataPayload::Book(book))
    }
}

/// Parses `exchangeInfo` symbols including exchange filters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceSymbolsAdapter;

impl ResponseAdapter for BinanceSymbolsAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let info: BinanceExchangeInfoRaw = decode(raw)?;

        let mut symbols = Vec::with_capacity(info.symbols.len());
        for row in info.symbols {
            if row.status.as_deref().is_some_and(|s| s != "TRADING") {
                continue;
            }
            let mut symbol = SymbolInfo::spot(row.symbol.as_str(), &row.base_asset, &row.quote_asset);
            for filter in &row.filters {
                match filter.filter_type.as_str() {
                    "PRICE_FILTER" => {
                        symbol.tick_size =
                            opt_decimal_str(filter.tick_size.as_deref(), "tick size")?;
                    }
                    "LOT_SIZE" => {
                        symbol.step_size =
                            opt_decimal_str(filter.step_size.as_deref(), "step size")?;
                    }
                    "MIN_NOTIONAL" | "NOTIONAL" => {
                        symbol.min_notional = opt_decimal_str(
                            filter.min_notional.as_deref().or(filter.notional.as_deref()),
                            "min notional",
                        )?;
                    }
                    _ => {}
                }
            }
            symbol.contract_type = row.contract_type.filter(|c| !c.is_empty());
            symbol.delivery_date = match row.delivery_date {
                Some(ms) if ms > 0 => Some(ms_to_datetime(ms)?),
                _ => None,
            };
            symbols.push(symbol);
        }
        Ok(DataPayload::Symbols(symbols))
    }
}

/// Parses current open interest (single sample, venue-stamped).
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceOpenInterestAdapter;

impl ResponseAdapter for BinanceOpenInterestAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let sample: BinanceOpenInterestRaw = decode(raw)?;
        Ok(DataPayload::OpenInterest(vec![OpenInterest::new(
            sample.symbol.as_str(),
            ms_to_datetime(sample.time)?,
            decimal_str(&sample.open_interest, "open interest")?,
            None,
        )]))
    }
}

/// Parses historical open-interest samples.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceOpenInterestHistAdapter;

impl ResponseAdapter for BinanceOpenInterestHistAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let rows: Vec<BinanceOpenInterestHistRaw> = decode(raw)?;

        let mut samples = Vec::with_capacity(rows.len());
        for row in rows {
            samples.push(OpenInterest::new(
                row.symbol.as_str(),
                ms_to_datetime(row.timestamp)?,
                decimal_str(&row.sum_open_interest, "open interest")?,
                opt_decimal_str(row.sum_open_interest_value.as_deref(), "open interest value")?,
            ));
        }
        samples.sort_by_key(|s| s.ts);
        Ok(DataPayload::OpenInterest(samples))
    }
}

/// Parses funding-rate history.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceFundingRateAdapter;

impl ResponseAdapter for BinanceFundingRateAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let rows: Vec<BinanceFundingRateRaw> = decode(raw)?;

        let mut rates = Vec::with_capacity(rows.len());
        for row in rows {
            rates.push(FundingRate::new(
                row.symbol.as_str(),
                ms_to_datetime(row.funding_time)?,
                decimal_str(&row.funding_rate, "funding rate")?,
                opt_decimal_str(row.mark_price.as_deref(), "mark price")?,
            ));
        }
        rates.sort_by_key(|r| r.funding_time);
        Ok(DataPayload::FundingRates(rates))
    }
}

/// Parses the premium index into a [`MarkPrice`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceMarkPriceAdapter;

impl ResponseAdapter for BinanceMarkPriceAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_error(raw)?;
        let index: BinancePremiumIndexRaw = decode(raw)?;

        let next_funding_time = match index.next_funding_time {
            Some(ms) if ms > 0 => Some(ms_to_datetime(ms)?),
            _ => None,
        };
        Ok(DataPayload::MarkPrice(MarkPrice::new(
            index.symbol.as_str(),
            decimal_str(&index.mark_price, "mark price")?,
            opt_decimal_str(index.index_price.as_deref(), "index price")?,
            opt_decimal_str(index.last_funding_rate.as_deref(), "funding rate")?,
            next_funding_time,
            ms_to_datetime(index.time)?,
        )))
    }
}
