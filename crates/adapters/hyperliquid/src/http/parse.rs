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

//! Response adapters normalizing Hyperliquid info payloads.

use polyfeed_model::{
    Bar, BookLevel, FundingRate, MarkPrice, MarketDataError, Ohlcv, OrderBook, SeriesMeta,
    SymbolInfo, Trade, time::ms_to_datetime,
};
use polyfeed_runtime::{
    DataPayload, RequestParams, ResponseAdapter,
    json::{as_array, as_decimal, as_i64, as_str, field},
};
use serde_json::Value;

/// Parses candle snapshots (`[{t, T, s, i, o, c, h, l, v, n}]`, ascending).
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidOhlcvAdapter;

impl ResponseAdapter for HyperliquidOhlcvAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows = as_array(raw, "candle snapshot")?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in rows {
            bars.push(Bar::new(
                ms_to_datetime(as_i64(field(row, "t")?, "candle open time")?)?,
                as_decimal(field(row, "o")?, "candle open")?,
                as_decimal(field(row, "h")?, "candle high")?,
                as_decimal(field(row, "l")?, "candle low")?,
                as_decimal(field(row, "c")?, "candle close")?,
                as_decimal(field(row, "v")?, "candle volume")?,
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

/// Parses `l2Book` snapshots (`levels` is `[bids, asks]` of `{px, sz, n}`).
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidOrderBookAdapter;

impl ResponseAdapter for HyperliquidOrderBookAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let levels = as_array(field(raw, "levels")?, "book levels")?;
        if levels.len() != 2 {
            return Err(MarketDataError::Data(format!(
                "l2Book carries {} sides, expected 2",
                levels.len()
            )));
        }

        let parse_side = |side: &Value, context: &str| -> Result<Vec<BookLevel>, MarketDataError> {
            as_array(side, context)?
                .iter()
                .map(|level| {
                    Ok(BookLevel::new(
                        as_decimal(field(level, "px")?, "book price")?,
                        as_decimal(field(level, "sz")?, "book size")?,
                    ))
                })
                .collect()
        };

        let ts = ms_to_datetime(as_i64(field(raw, "time")?, "book time")?)?;
        let book = OrderBook::new(
            params.require_symbol()?.as_str(),
            ts.timestamp_millis() as u64,
            parse_side(&levels[0], "bids")?,
            parse_side(&levels[1], "asks")?,
            ts,
        )?;
        Ok(DataPayload::Book(book))
    }
}

/// Parses the perpetuals `meta` universe into symbol metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidSymbolsAdapter;

impl ResponseAdapter for HyperliquidSymbolsAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let universe = as_array(field(raw, "universe")?, "universe")?;

        let mut symbols = Vec::with_capacity(universe.len());
        for row in universe {
            let name = as_str(field(row, "name")?, "coin name")?;
            let mut info = SymbolInfo::spot(name, name, "USDC");
            info.contract_type = Some("PERPETUAL".to_string());
            info.step_size = match row.get("szDecimals").and_then(Value::as_u64) {
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

/// Parses funding history rows.
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidFundingRateAdapter;

impl ResponseAdapter for HyperliquidFundingRateAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows = as_array(raw, "funding history")?;

        let mut rates = Vec::with_capacity(rows.len());
        for row in rows {
            rates.push(FundingRate::new(
                as_str(field(row, "coin")?, "funding coin")?,
                ms_to_datetime(as_i64(field(row, "time")?, "funding time")?)?,
                as_decimal(field(row, "fundingRate")?, "funding rate")?,
                None,
            ));
        }
        rates.sort_by_key(|rate| rate.funding_time);
        Ok(DataPayload::FundingRates(rates))
    }
}

/// Parses `allMids` into the mark price for the requested coin.
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidMarkPriceAdapter;

impl ResponseAdapter for HyperliquidMarkPriceAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let coin = params.require_venue_symbol()?.to_uppercase();
        let mid = raw.get(&coin).ok_or_else(|| {
            MarketDataError::provider("hyperliquid", format!("No mid for coin '{coin}'"))
        })?;

        Ok(DataPayload::MarkPrice(MarkPrice::new(
            &coin,
            as_decimal(mid, "mid price")?,
            None,
            None,
            None,
            chrono::Utc::now(),
        )))
    }
}

/// Passes the meta payload through as a health probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidHealthAdapter;

impl ResponseAdapter for HyperliquidHealthAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        Ok(DataPayload::Health(raw.clone()))
    }
}

// Trades arrive only over the stream for this venue; the REST table has no
// trades row. Kept here so the ws adapter can share the shape.
pub(crate) fn parse_ws_trade(row: &Value) -> Result<Trade, MarketDataError> {
    let side = as_str(field(row, "side")?, "trade side")?;
    Trade::new(
        as_str(field(row, "coin")?, "trade coin")?,
        field(row, "tid")?.as_u64().unwrap_or_default(),
        as_decimal(field(row, "px")?, "trade price")?,
        as_decimal(field(row, "sz")?, "trade size")?,
        None,
        ms_to_datetime(as_i64(field(row, "time")?, "trade time")?)?,
        // "A" marks an ask-side (sell) aggressor, so the buyer was the maker.
        side.eq_ignore_ascii_case("a"),
        None,
    )
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
            .exchange(Exchange::Hyperliquid)
            .market_type(polyfeed_model::MarketType::Futures)
            .symbol(symbol)
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        let mut params = RequestParams::from_request(&request, MarketVariant::LinearPerp);
        params.venue_symbol = Some(venue.to_string());
        params
    }

    #[rstest]
    fn candle_snapshot_parses_into_series() {
        let raw = json!([
            {"t": 1704067200000_i64, "T": 1704067259999_i64, "s": "BTC", "i": "1m", "o": "42000.0", "c": "42050.0", "h": "42100.0", "l": "41900.0", "v": "12.5", "n": 100}
        ]);
        let payload = HyperliquidOhlcvAdapter
            .parse(&raw, &params("BTCUSD", "BTC"))
            .unwrap();
        let DataPayload::Ohlcv(series) = payload else {
            panic!("expected ohlcv")
        };
        assert_eq!(series.meta.symbol.as_str(), "BTCUSD");
        assert_eq!(series.bars[0].close, dec!(42050.0));
    }

    #[rstest]
    fn l2_book_splits_sides() {
        let raw = json!({
            "coin": "BTC",
            "time": 1704067200000_i64,
            "levels": [
                [{"px": "42000.0", "sz": "1.5", "n": 3}],
                [{"px": "42001.0", "sz": "0.5", "n": 1}]
            ]
        });
        let payload = HyperliquidOrderBookAdapter
            .parse(&raw, &params("BTCUSD", "BTC"))
            .unwrap();
        let DataPayload::Book(book) = payload else {
            panic!("expected book")
        };
        assert_eq!(book.best_bid().unwrap().price, dec!(42000.0));
        assert_eq!(book.best_ask().unwrap().price, dec!(42001.0));
    }

    #[rstest]
    fn all_mids_requires_the_requested_coin() {
        let raw = json!({"BTC": "43000.5", "ETH": "2300.25"});
        let payload = HyperliquidMarkPriceAdapter
            .parse(&raw, &params("BTCUSD", "BTC"))
            .unwrap();
        let DataPayload::MarkPrice(mark) = payload else {
            panic!("expected mark price")
        };
        assert_eq!(mark.mark_price, dec!(43000.5));

        let missing = HyperliquidMarkPriceAdapter.parse(&raw, &params("SOLUSD", "SOL"));
        assert!(matches!(missing, Err(MarketDataError::Provider { .. })));
    }

    #[rstest]
    fn meta_universe_yields_perpetual_symbols() {
        let raw = json!({
            "universe": [
                {"name": "BTC", "szDecimals": 5, "maxLeverage": 50},
                {"name": "ETH", "szDecimals": 4, "maxLeverage": 50}
            ]
        });
        let payload = HyperliquidSymbolsAdapter
            .parse(&raw, &params("BTCUSD", "BTC"))
            .unwrap();
        let DataPayload::Symbols(symbols) = payload else {
            panic!("expected symbols")
        };
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].contract_type.as_deref(), Some("PERPETUAL"));
        assert_eq!(symbols[0].step_size, Some(dec!(0.00001)));
    }

    #[rstest]
    fn funding_history_sorts_ascending() {
        let raw = json!([
            {"coin": "BTC", "fundingRate": "0.0000125", "premium": "0.0001", "time": 1704070800000_i64},
            {"coin": "BTC", "fundingRate": "0.0000120", "premium": "0.0001", "time": 1704067200000_i64}
        ]);
        let payload = HyperliquidFundingRateAdapter
            .parse(&raw, &params("BTCUSD", "BTC"))
            .unwrap();
        let DataPayload::FundingRates(rates) = payload else {
            panic!("expected funding rates")
        };
        assert!(rates[0].funding_time < rates[1].funding_time);
    }
}
