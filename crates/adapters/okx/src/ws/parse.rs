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

//! Message adapters normalizing OKX v5 stream frames.
//!
//! Data frames carry `{"arg": {"channel", "instId"}, "data": [...]}`; acks
//! and errors carry an `event` member instead.

use polyfeed_model::{Bar, MarketDataError, StreamingBar, Trade, time::ms_str_to_datetime};
use polyfeed_runtime::{
    MessageAdapter, StreamItem,
    json::{as_array, as_str, decimal_str, field},
};
use serde_json::Value;

fn channel(payload: &Value) -> Option<&str> {
    payload.pointer("/arg/channel").and_then(Value::as_str)
}

fn inst_id(payload: &Value) -> Result<&str, MarketDataError> {
    payload
        .pointer("/arg/instId")
        .and_then(Value::as_str)
        .ok_or_else(|| MarketDataError::Data("Frame carries no instId".to_string()))
}

fn row_str<'a>(row: &'a [Value], index: usize, context: &str) -> Result<&'a str, MarketDataError> {
    row.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| MarketDataError::Data(format!("Missing candle field {context}")))
}

/// Parses `candle{bar}` frames into streaming bars.
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxCandleMessageAdapter;

impl MessageAdapter for OkxCandleMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        payload.get("event").is_none() && channel(payload).is_some_and(|c| c.starts_with("candle"))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let symbol = inst_id(payload)?;
        let rows = as_array(field(payload, "data")?, "candle data")?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let row = as_array(row, "candle row")?;
            if row.len() < 6 {
                return Err(MarketDataError::Data(format!(
                    "Candle row has {} fields, expected at least 6",
                    row.len()
                )));
            }
            let is_closed = row.get(8).and_then(Value::as_str).is_none_or(|c| c == "1");
            let bar = Bar::new(
                ms_str_to_datetime(row_str(row, 0, "timestamp")?)?,
                decimal_str(row_str(row, 1, "open")?, "candle open")?,
                decimal_str(row_str(row, 2, "high")?, "candle high")?,
                decimal_str(row_str(row, 3, "low")?, "candle low")?,
                decimal_str(row_str(row, 4, "close")?, "candle close")?,
                decimal_str(row_str(row, 5, "volume")?, "candle volume")?,
                is_closed,
            )?;
            items.push(StreamItem::Bar(StreamingBar::new(symbol, bar)));
        }
        Ok(items)
    }
}

/// Parses `trades` frames; `side` is the taker side.
#[derive(Clone, Copy, Debug, Default)]
pub struct OkxTradeMessageAdapter;

impl MessageAdapter for OkxTradeMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        payload.get("event").is_none() && channel(payload) == Some("trades")
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let rows = as_array(field(payload, "data")?, "trade data")?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let symbol = as_str(field(row, "instId")?, "trade instId")?;
            let trade_id = as_str(field(row, "tradeId")?, "trade id")?
                .parse()
                .unwrap_or_default();
            let taker_side = as_str(field(row, "side")?, "trade side")?;
            let trade = Trade::new(
                symbol,
                trade_id,
                decimal_str(as_str(field(row, "px")?, "trade price")?, "trade price")?,
                decimal_str(as_str(field(row, "sz")?, "trade size")?, "trade size")?,
                None,
                ms_str_to_datetime(as_str(field(row, "ts")?, "trade time")?)?,
                taker_side.eq_ignore_ascii_case("sell"),
                None,
            )?;
            items.push(StreamItem::Trade(trade));
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[rstest]
    fn candle_frames_parse_with_confirm_flag() {
        let frame = json!({
            "arg": {"channel": "candle1m", "instId": "BTC-USDT"},
            "data": [["1704067200000", "42000", "42100", "41900", "42050", "12.5", "525000", "525000", "0"]]
        });
        let adapter = OkxCandleMessageAdapter;
        assert!(adapter.is_relevant(&frame));

        let items = adapter.parse(&frame).unwrap();
        let StreamItem::Bar(bar) = &items[0] else {
            panic!("expected bar")
        };
        assert_eq!(bar.symbol.as_str(), "BTC-USDT");
        assert!(!bar.bar.is_closed);
        assert_eq!(bar.bar.close, dec!(42050));
    }

    #[rstest]
    fn subscribe_acks_are_irrelevant() {
        let ack = json!({"event": "subscribe", "arg": {"channel": "candle1m", "instId": "BTC-USDT"}});
        assert!(!OkxCandleMessageAdapter.is_relevant(&ack));
        assert!(!OkxTradeMessageAdapter.is_relevant(&ack));
    }

    #[rstest]
    fn trade_frames_derive_buyer_maker() {
        let frame = json!({
            "arg": {"channel": "trades", "instId": "BTC-USDT"},
            "data": [{"instId": "BTC-USDT", "tradeId": "130639474", "px": "42219.9", "sz": "0.12", "side": "buy", "ts": "1704067200000"}]
        });
        let items = OkxTradeMessageAdapter.parse(&frame).unwrap();
        let StreamItem::Trade(trade) = &items[0] else {
            panic!("expected trade")
        };
        assert!(!trade.is_buyer_maker, "taker buy => seller was maker");
        assert_eq!(trade.quantity, dec!(0.12));
    }
}
