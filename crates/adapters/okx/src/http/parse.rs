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

//! Response adapters normalizing OKX v5 payloads into domain types.

use polyfeed_model::{
    Bar, BookLevel, FundingRate, MarketDataError, Ohlcv, OpenInterest, OrderBook, SeriesMeta,
    SymbolInfo, Trade, time::ms_str_to_datetime,
};
use polyfeed_runtime::{
    DataPayload, RequestParams, ResponseAdapter,
    json::{decimal_str, opt_decimal_str},
};
use serde_json::Value;

use super::models::{
    OkxBookRaw, OkxFundingRateRaw, OkxInstrumentRaw, OkxOpenInterestRaw, OkxResponse, OkxTradeRaw,
};

const OKX_SUCCESS_CODE: &str = "0";

/// Validates the v5 envelope and extracts the `data` array.
pub(crate) fn extract_data<T: serde::de::DeserializeOwned>(
    raw: &Value,
) -> Result<Vec<T>, MarketDataError> {
    let envelope: OkxResponse<T> = serde_json::from_value(raw.clone())
        .map_err(|e| MarketDataError::Data(format!("Unexpected OKX envelope shape: {e}")))?;
    if envelope.code != OKX_SUCCESS_CODE {
        return Err(MarketDataError::provider(envelope.code, envelope.msg));
    }
    Ok(envelope.data)
}

/// Parses a numeric trade id (OKX ids are numeric strings) with a stable
/// hash fallback.
fn parse_trade_id(trade_id: &str) -> u64 {
    trade_id.parse().unwrap_or_else(|_| {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in trade_id.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    })
}

/// Validates the envelope and passes the server time through.
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxHealthAdapter;

impl ResponseAdapter for OkxHealthAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let data: Vec<Value> = extract_data(raw)?;
        Ok(DataPayload::Health(Value::Array(data)))
    }
}

/// Parses candle rows `[ts, o, h, l, c, vol, …, confirm]` (newest first).
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxOhlcvAdapter;

impl ResponseAdapter for OkxOhlcvAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows: Vec<Vec<String>> = extract_data(raw)?;

        let mut bars = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() < 6 {
                return Err(MarketDataError::Data(format!(
                    "Candle row has {} fields, expected at least 6",
                    row.len()
                )));
            }
            // The confirm flag is "0" while the candle is still forming.
            let is_closed = row.get(8).is_none_or(|confirm| confirm == "1");
            bars.push(Bar::new(
                ms_str_to_datetime(&row[0])?,
                decimal_str(&row[1], "candle open")?,
                decimal_str(&row[2], "candle high")?,
                decimal_str(&row[3], "candle low")?,
                decimal_str(&row[4], "candle close")?,
                decimal_str(&row[5], "candle volume")?,
                is_closed,
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

/// Parses trades; `side` is the taker side, so the buyer is the maker
/// exactly when the taker sold.
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxTradesAdapter;

impl ResponseAdapter for OkxTradesAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows: Vec<OkxTradeRaw> = extract_data(raw)?;
        let symbol = params.require_symbol()?;

        let mut trades = Vec::with_capacity(rows.len());
        for row in rows {
            trades.push(Trade::new(
                symbol.as_str(),
                parse_trade_id(&row.trade_id),
                decimal_str(&row.px, "trade price")?,
                decimal_str(&row.sz, "trade size")?,
                None,
                ms_str_to_datetime(&row.ts)?,
                row.side.eq_ignore_ascii_case("sell"),
                None,
            )?);
        }
        trades.sort_by_key(|trade| trade.ts);
        Ok(DataPayload::Trades(trades))
    }
}

/// Parses an order-book snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxOrderBookAdapter;

impl ResponseAdapter for OkxOrderBookAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let mut books: Vec<OkxBookRaw> = extract_data(raw)?;
        let book = books
            .pop()
            .ok_or_else(|| MarketDataError::Data("OKX book response is empty".to_string()))?;

        let parse_side = |levels: &[Vec<String>]| -> Result<Vec<BookLevel>, MarketDataError> {
            levels
                .iter()
                .map(|level| {
                    if level.len() < 2 {
                        return Err(MarketDataError::Data("Book level too short".to_string()));
                    }
                    Ok(BookLevel::new(
                        decimal_str(&level[0], "book price")?,
                        decimal_str(&level[1], "book size")?,
                    ))
                })
                .collect()
        };

        let ts = ms_str_to_datetime(&book.ts)?;
        let book = OrderBook::new(
            params.require_symbol()?.as_str(),
            ts.timestamp_millis() as u64,
            parse_side(&book.bids)?,
            parse_side(&book.asks)?,
            ts,
        )?;
        Ok(DataPayload::Book(book))
    }
}

/// Parses instrument metadata across SPOT/SWAP/FUTURES rows.
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxSymbolsAdapter;

impl ResponseAdapter for OkxSymbolsAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows: Vec<OkxInstrumentRaw> = extract_data(raw)?;

        let mut symbols = Vec::with_capacity(rows.len());
        for row in rows {
            // Derivatives carry base/quote in the underlying, not baseCcy.
            let (base, quote) = if row.base_ccy.is_empty() {
                let mut parts = row.uly.split('-');
                match (parts.next(), parts.next()) {
                    (Some(base), Some(quote)) if !base.is_empty() => {
                        (base.to_string(), quote.to_string())
                    }
                    _ => continue,
                }
            } else {
                (row.base_ccy.clone(), row.quote_ccy.clone())
            };

            let mut info = SymbolInfo::spot(row.inst_id.as_str(), &base, &quote);
            info.tick_size = opt_decimal_str(Some(&row.tick_sz), "tick size")?;
            info.step_size = opt_decimal_str(Some(&row.lot_sz), "lot size")?;
            info.contract_type = match row.inst_type.as_str() {
                "SWAP" => Some(format!("{}_PERPETUAL", row.ct_type.to_uppercase())),
                "FUTURES" => Some("DELIVERY".to_string()),
                _ => None,
            };
            info.delivery_date = if row.exp_time.is_empty() {
                None
            } else {
                Some(ms_str_to_datetime(&row.exp_time)?)
            };
            symbols.push(info);
        }
        Ok(DataPayload::Symbols(symbols))
    }
}

/// Parses current open interest (venue-stamped single sample per
/// instrument).
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxOpenInterestAdapter;

impl ResponseAdapter for OkxOpenInterestAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows: Vec<OkxOpenInterestRaw> = extract_data(raw)?;

        let mut samples = Vec::with_capacity(rows.len());
        for row in rows {
            samples.push(OpenInterest::new(
                row.inst_id.as_str(),
                ms_str_to_datetime(&row.ts)?,
                decimal_str(&row.oi, "open interest")?,
                None,
            ));
        }
        samples.sort_by_key(|sample| sample.ts);
        Ok(DataPayload::OpenInterest(samples))
    }
}

/// Parses funding rates (current or history; history is newest first).
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxFundingRateAdapter;

impl ResponseAdapter for OkxFundingRateAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let rows: Vec<OkxFundingRateRaw> = extract_data(raw)?;

        let mut rates = Vec::with_capacity(rows.len());
        for row in rows {
            rates.push(FundingRate::new(
                row.inst_id.as_str(),
                ms_str_to_datetime(&row.funding_time)?,
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
            .exchange(Exchange::Okx)
            .symbol(symbol)
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        RequestParams::from_request(&request, MarketVariant::Spot)
    }

    #[rstest]
    fn error_envelope_surfaces_code_and_message() {
        let raw = json!({"code": "51001", "msg": "Instrument ID does not exist", "data": []});
        let result = OkxOhlcvAdapter.parse(&raw, &params("BTCUSDT"));
        match result {
            Err(MarketDataError::Provider { code, message }) => {
                assert_eq!(code, "51001");
                assert_eq!(message, "Instrument ID does not exist");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[rstest]
    fn candles_newest_first_are_reversed_and_confirm_respected() {
        let raw = json!({
            "code": "0",
            "msg": "",
            "data": [
                ["1704067260000", "42050", "42200", "42000", "42150", "8.5", "357000", "357000", "0"],
                ["1704067200000", "42000", "42100", "41900", "42050", "12.3", "517000", "517000", "1"]
            ]
        });
        let payload = OkxOhlcvAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Ohlcv(series) = payload else {
            panic!("expected ohlcv")
        };
        assert_eq!(series.bars.len(), 2);
        assert!(series.bars[0].ts < series.bars[1].ts);
        assert!(series.bars[0].is_closed);
        assert!(!series.bars[1].is_closed, "confirm=0 means still forming");
    }

    #[rstest]
    fn taker_sell_maps_to_buyer_maker() {
        let raw = json!({
            "code": "0",
            "msg": "",
            "data": [
                {"instId": "BTC-USDT", "tradeId": "242720720", "px": "42000.1", "sz": "0.1", "side": "sell", "ts": "1704067200000"}
            ]
        });
        let payload = OkxTradesAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Trades(trades) = payload else {
            panic!("expected trades")
        };
        assert!(trades[0].is_buyer_maker);
        assert_eq!(trades[0].trade_id, 242_720_720);
    }

    #[rstest]
    fn book_levels_parse_with_depth_metadata_ignored() {
        let raw = json!({
            "code": "0",
            "msg": "",
            "data": [{
                "bids": [["42000.0", "1.5", "0", "3"], ["41999.0", "2.0", "0", "1"]],
                "asks": [["42000.5", "0.7", "0", "2"]],
                "ts": "1704067200123"
            }]
        });
        let payload = OkxOrderBookAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Book(book) = payload else {
            panic!("expected book")
        };
        assert_eq!(book.best_bid().unwrap().price, dec!(42000.0));
        assert_eq!(book.asks.len(), 1);
    }

    #[rstest]
    fn swap_instruments_derive_pair_from_underlying() {
        let raw = json!({
            "code": "0",
            "msg": "",
            "data": [{
                "instId": "BTC-USDT-SWAP",
                "instType": "SWAP",
                "uly": "BTC-USDT",
                "settleCcy": "USDT",
                "ctType": "linear",
                "tickSz": "0.1",
                "lotSz": "1",
                "expTime": ""
            }]
        });
        let payload = OkxSymbolsAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Symbols(symbols) = payload else {
            panic!("expected symbols")
        };
        assert_eq!(symbols[0].base_asset.as_str(), "BTC");
        assert_eq!(symbols[0].quote_asset.as_str(), "USDT");
        assert_eq!(symbols[0].contract_type.as_deref(), Some("LINEAR_PERPETUAL"));
    }

    #[rstest]
    fn open_interest_keeps_venue_sample_time() {
        let raw = json!({
            "code": "0",
            "msg": "",
            "data": [{"instId": "BTC-USDT-SWAP", "instType": "SWAP", "oi": "3000000", "oiCcy": "BTC", "ts": "1704067200000"}]
        });
        let payload = OkxOpenInterestAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::OpenInterest(samples) = payload else {
            panic!("expected open interest")
        };
        assert_eq!(samples[0].ts.timestamp_millis(), 1_704_067_200_000);
    }
}
