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

//! Response adapters normalizing MEXC payloads.

use polyfeed_model::{
    Bar, MarketDataError, Ohlcv, OpenInterest, SeriesMeta, SymbolInfo, Trade,
    time::ms_to_datetime,
};
use polyfeed_runtime::{
    DataPayload, RequestParams, ResponseAdapter,
    json::{as_array, as_decimal, as_i64, field, opt_decimal},
};
use serde_json::Value;

/// Surfaces a spot `{code, msg}` error object delivered with HTTP 200.
fn check_spot_error(raw: &Value) -> Result<(), MarketDataError> {
    if let Some(code) = raw.get("code").and_then(Value::as_i64)
        && code != 0
        && code != 200
    {
        let msg = raw
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        return Err(MarketDataError::provider(code.to_string(), msg));
    }
    Ok(())
}

/// Passes the ping payload through unparsed.
#[derive(Clone, Copy, Debug, Default)]
pub struct MexcHealthAdapter;

impl ResponseAdapter for MexcHealthAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_spot_error(raw)?;
        Ok(DataPayload::Health(raw.clone()))
    }
}

/// Parses Binance-shaped kline rows.
#[derive(Clone, Copy, Debug, Default)]
pub struct MexcOhlcvAdapter;

impl ResponseAdapter for MexcOhlcvAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_spot_error(raw)?;
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
        bars.sort_by_key(|bar| bar.ts);

        let meta = SeriesMeta::new(
            params.require_symbol()?.as_str(),
            params.require_timeframe()?,
        );
        Ok(DataPayload::Ohlcv(Ohlcv::new(meta, bars)?))
    }
}

/// Parses trades; MEXC omits trade ids on spot, so missing ids are
/// synthesized from the millisecond timestamp.
#[derive(Clone, Copy, Debug, Default)]
pub struct MexcTradesAdapter;

impl ResponseAdapter for MexcTradesAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_spot_error(raw)?;
        let rows = as_array(raw, "trade array")?;
        let symbol = params.require_symbol()?;

        let mut trades = Vec::with_capacity(rows.len());
        for row in rows {
            let time = as_i64(field(row, "time")?, "trade time")?;
            let trade_id = match row.get("id") {
                Some(Value::String(id)) => id.parse().unwrap_or(time as u64),
                Some(Value::Number(id)) => id.as_u64().unwrap_or(time as u64),
                _ => time as u64,
            };
            trades.push(Trade::new(
                symbol.as_str(),
                trade_id,
                as_decimal(field(row, "price")?, "trade price")?,
                as_decimal(field(row, "qty")?, "trade quantity")?,
                opt_decimal(row.get("quoteQty"), "trade quote quantity")?,
                ms_to_datetime(time)?,
                field(row, "isBuyerMaker")?.as_bool().unwrap_or(false),
                None,
            )?);
        }
        trades.sort_by_key(|trade| trade.ts);
        Ok(DataPayload::Trades(trades))
    }
}

/// Parses `exchangeInfo` symbols.
#[derive(Clone, Copy, Debug, Default)]
pub struct MexcSymbolsAdapter;

impl ResponseAdapter for MexcSymbolsAdapter {
    fn parse(&self, raw: &Value, _params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        check_spot_error(raw)?;
        let rows = as_array(field(raw, "symbols")?, "symbols")?;

        let mut symbols = Vec::with_capacity(rows.len());
        for row in rows {
            let status = row.get("status").and_then(Value::as_str);
            // "1" is the enabled state on the v3 API.
            if status.is_some_and(|s| s != "1" && s != "ENABLED") {
                continue;
            }
            let symbol = row
                .get("symbol")
                .and_then(Value::as_str)
                .ok_or_else(|| MarketDataError::Data("Symbol row missing 'symbol'".to_string()))?;
            let base = row
                .get("baseAsset")
                .and_then(Value::as_str)
                .ok_or_else(|| MarketDataError::Data("Symbol row missing 'baseAsset'".to_string()))?;
            let quote = row
                .get("quoteAsset")
                .and_then(Value::as_str)
                .ok_or_else(|| MarketDataError::Data("Symbol row missing 'quoteAsset'".to_string()))?;
            symbols.push(SymbolInfo::spot(symbol, base, quote));
        }
        Ok(DataPayload::Symbols(symbols))
    }
}

/// Parses current contract open interest from the ticker's `holdVol`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MexcOpenInterestAdapter;

impl ResponseAdapter for MexcOpenInterestAdapter {
    fn parse(&self, raw: &Value, params: &RequestParams) -> Result<DataPayload, MarketDataError> {
        let success = raw.get("success").and_then(Value::as_bool).unwrap_or(false);
        if !success {
            let code = raw
                .get("code")
                .and_then(Value::as_i64)
                .map_or_else(|| "mexc_contract".to_string(), |c| c.to_string());
            let msg = raw
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown contract error");
            return Err(MarketDataError::provider(code, msg));
        }

        let data = field(raw, "data")?;
        let ts = ms_to_datetime(as_i64(field(data, "timestamp")?, "ticker timestamp")?)?;
        Ok(DataPayload::OpenInterest(vec![OpenInterest::new(
            params.require_symbol()?.as_str(),
            ts,
            as_decimal(field(data, "holdVol")?, "hold volume")?,
            None,
        )]))
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
            .exchange(Exchange::Mexc)
            .symbol(symbol)
            .timeframe(Timeframe::M1)
            .build()
            .unwrap();
        RequestParams::from_request(&request, MarketVariant::Spot)
    }

    #[rstest]
    fn trades_synthesize_missing_ids() {
        let raw = json!([
            {"id": null, "price": "42000.5", "qty": "0.1", "quoteQty": "4200.05", "time": 1704067200000_i64, "isBuyerMaker": true, "isBestMatch": true}
        ]);
        let payload = MexcTradesAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::Trades(trades) = payload else {
            panic!("expected trades")
        };
        assert_eq!(trades[0].trade_id, 1_704_067_200_000);
        assert!(trades[0].is_buyer_maker);
        assert_eq!(trades[0].quote_quantity, Some(dec!(4200.05)));
    }

    #[rstest]
    fn contract_ticker_yields_open_interest() {
        let raw = json!({
            "success": true,
            "code": 0,
            "data": {"symbol": "BTC_USDT", "holdVol": 262875.5, "timestamp": 1704067200000_i64}
        });
        let payload = MexcOpenInterestAdapter.parse(&raw, &params("BTCUSDT")).unwrap();
        let DataPayload::OpenInterest(samples) = payload else {
            panic!("expected open interest")
        };
        assert_eq!(samples[0].open_interest, dec!(262875.5));
    }

    #[rstest]
    fn contract_error_is_surfaced() {
        let raw = json!({"success": false, "code": 1002, "message": "Contract not activated"});
        let result = MexcOpenInterestAdapter.parse(&raw, &params("BTCUSDT"));
        assert!(matches!(result, Err(MarketDataError::Provider { .. })));
    }

    #[rstest]
    fn spot_error_object_is_surfaced() {
        let raw = json!({"code": 700002, "msg": "Signature for this request is not valid."});
        let result = MexcOhlcvAdapter.parse(&raw, &params("BTCUSDT"));
        assert!(matches!(result, Err(MarketDataError::Provider { .. })));
    }
}
