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

//! Message adapters normalizing Binance stream frames into stream items.
//!
//! All frames arrive in the combined format `{"stream": name, "data": {...}}`.

use polyfeed_model::{
    Bar, BookLevel, Liquidation, MarkPrice, MarketDataError, OrderBook, Side, StreamingBar, Trade,
    time::ms_to_datetime,
};
use polyfeed_runtime::{
    MessageAdapter, StreamItem,
    json::{as_array, as_decimal, as_i64, as_str, as_u64, field, opt_decimal},
};
use serde_json::Value;

/// Unwraps a combined frame into `(stream_name, data)`.
fn unwrap_combined(payload: &Value) -> (Option<&str>, &Value) {
    match (payload.get("stream"), payload.get("data")) {
        (Some(stream), Some(data)) => (stream.as_str(), data),
        _ => (None, payload),
    }
}

fn event_type(data: &Value) -> Option<&str> {
    data.get("e").and_then(Value::as_str)
}

/// Parses `kline` events into streaming bars.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceKlineMessageAdapter;

impl MessageAdapter for BinanceKlineMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        let (stream, data) = unwrap_combined(payload);
        event_type(data) == Some("kline") || stream.is_some_and(|s| s.contains("@kline"))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let (_, data) = unwrap_combined(payload);
        let kline = field(data, "k")?;

        let symbol = as_str(field(kline, "s")?, "kline symbol")?;
        let bar = Bar::new(
            ms_to_datetime(as_i64(field(kline, "t")?, "kline open time")?)?,
            as_decimal(field(kline, "o")?, "kline open")?,
            as_decimal(field(kline, "h")?, "kline high")?,
            as_decimal(field(kline, "l")?, "kline low")?,
            as_decimal(field(kline, "c")?, "kline close")?,
            as_decimal(field(kline, "v")?, "kline volume")?,
            field(kline, "x")?.as_bool().unwrap_or(false),
        )?;
        Ok(vec![StreamItem::Bar(StreamingBar::new(symbol, bar))])
    }
}

/// Parses `trade` / `aggTrade` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceTradeMessageAdapter;

impl MessageAdapter for BinanceTradeMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        let (_, data) = unwrap_combined(payload);
        matches!(event_type(data), Some("trade" | "aggTrade"))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let (_, data) = unwrap_combined(payload);
        let symbol = as_str(field(data, "s")?, "trade symbol")?;
        // `t` on trade events, `a` on aggTrade events.
        let trade_id = match data.get("t").or_else(|| data.get("a")) {
            Some(id) => as_u64(id, "trade id")?,
            None => 0,
        };

        let trade = Trade::new(
            symbol,
            trade_id,
            as_decimal(field(data, "p")?, "trade price")?,
            as_decimal(field(data, "q")?, "trade quantity")?,
            None,
            ms_to_datetime(as_i64(field(data, "T")?, "trade time")?)?,
            field(data, "m")?.as_bool().unwrap_or(false),
            None,
        )?;
        Ok(vec![StreamItem::Trade(trade)])
    }
}

/// Parses partial book depth frames; the symbol comes from the stream name
/// on spot (payloads carry no symbol there).
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceOrderBookMessageAdapter;

impl MessageAdapter for BinanceOrderBookMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        let (stream, data) = unwrap_combined(payload);
        stream.is_some_and(|s| s.contains("@depth"))
            || event_type(data) == Some("depthUpdate")
            || (data.get("bids").is_some() && data.get("asks").is_some())
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let (stream, data) = unwrap_combined(payload);

        let symbol = match data.get("s").and_then(Value::as_str) {
            Some(symbol) => symbol.to_string(),
            None => stream
                .and_then(|s| s.split('@').next())
                .map(str::to_uppercase)
                .ok_or_else(|| {
                    MarketDataError::Data("Depth frame carries no symbol".to_string())
                })?,
        };

        // Spot partial depth uses bids/asks; futures depth events use b/a.
        let bids = data
            .get("bids")
            .or_else(|| data.get("b"))
            .ok_or_else(|| MarketDataError::Data("Missing required field 'bids'".to_string()))?;
        let asks = data
            .get("asks")
            .or_else(|| data.get("a"))
            .ok_or_else(|| MarketDataError::Data("Missing required field 'asks'".to_string()))?;

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
                        as_decimal(&level[1], "book quantity")?,
                    ))
                })
                .collect()
        };

        let last_update_id = match data.get("lastUpdateId").or_else(|| data.get("u")) {
            Some(id) => as_u64(id, "book update id")?,
            None => 0,
        };
        let ts = match data.get("E") {
            Some(ms) => ms_to_datetime(as_i64(ms, "event time")?)?,
            None => chrono::Utc::now(),
        };

        let book = OrderBook::new(
            &symbol,
            last_update_id,
            parse_side(bids, "bids")?,
            parse_side(asks, "asks")?,
            ts,
        )?;
        Ok(vec![StreamItem::Book(book)])
    }
}

/// Parses `markPriceUpdate` events.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceMarkPriceMessageAdapter;

impl MessageAdapter for BinanceMarkPriceMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        let (_, data) = unwrap_combined(payload);
        event_type(data) == Some("markPriceUpdate")
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let (_, data) = unwrap_combined(payload);
        let symbol = as_str(field(data, "s")?, "mark price symbol")?;

        let next_funding_time = match data.get("T") {
            Some(ms) => {
                let ms = as_i64(ms, "next funding time")?;
                (ms > 0).then(|| ms_to_datetime(ms)).transpose()?
            }
            None => None,
        };
        let mark = MarkPrice::new(
            symbol,
            as_decimal(field(data, "p")?, "mark price")?,
            opt_decimal(data.get("i"), "index price")?,
            opt_decimal(data.get("r"), "funding rate")?,
            next_funding_time,
            ms_to_datetime(as_i64(field(data, "E")?, "event time")?)?,
        );
        Ok(vec![StreamItem::MarkPrice(mark)])
    }
}

/// Parses `forceOrder` (liquidation) events.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinanceLiquidationMessageAdapter;

impl MessageAdapter for BinanceLiquidationMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        let (_, data) = unwrap_combined(payload);
        event_type(data) == Some("forceOrder")
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let (_, data) = unwrap_combined(payload);
        let order = field(data, "o")?;

        let side = match as_str(field(order, "S")?, "liquidation side")? {
            "BUY" => Side::Buy,
            "SELL" => Side::Sell,
            other => {
                return Err(MarketDataError::Data(format!(
                    "Unknown liquidation side '{other}'"
                )));
            }
        };
        let liquidation = Liquidation::new(
            as_str(field(order, "s")?, "liquidation symbol")?,
            side,
            as_decimal(field(order, "q")?, "liquidation quantity")?,
            as_decimal(field(order, "p")?, "liquidation price")?,
            opt_decimal(order.get("ap"), "avg price")?,
            ms_to_datetime(as_i64(field(order, "T")?, "liquidation time")?)?,
        );
        Ok(vec![StreamItem::Liquidation(liquidation)])
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn kline_frame(is_closed: bool, close: &str) -> Value {
        json!({
            "stream": "btcusdt@kline_1m",
            "data": {
                "e": "kline",
                "E": 1704067215000_i64,
                "s": "BTCUSDT",
                "k": {
                    "t": 1704067200000_i64,
                    "T": 1704067259999_i64,
                    "s": "BTCUSDT",
                    "i": "1m",
                    "o": "42000.0",
                    "c": close,
                    "h": "42100.0",
                    "l": "41900.0",
                    "v": "12.5",
                    "x": is_closed
                }
            }
        })
    }

    #[rstest]
    fn kline_frames_parse_into_streaming_bars() {
        let adapter = BinanceKlineMessageAdapter;
        let frame = kline_frame(true, "42050.5");
        assert!(adapter.is_relevant(&frame));

        let items = adapter.parse(&frame).unwrap();
        let StreamItem::Bar(bar) = &items[0] else {
            panic!("expected a bar")
        };
        assert_eq!(bar.symbol.as_str(), "BTCUSDT");
        assert_eq!(bar.bar.close, dec!(42050.5));
        assert!(bar.bar.is_closed);
    }

    #[rstest]
    fn open_kline_reports_not_closed() {
        let items = BinanceKlineMessageAdapter
            .parse(&kline_frame(false, "42001.0"))
            .unwrap();
        assert_eq!(items[0].is_closed(), Some(false));
    }

    #[rstest]
    fn trade_frames_parse_and_keep_maker_flag() {
        let adapter = BinanceTradeMessageAdapter;
        let frame = json!({
            "stream": "btcusdt@trade",
            "data": {
                "e": "trade",
                "E": 1704067200123_i64,
                "s": "BTCUSDT",
                "t": 12345,
                "p": "42000.01",
                "q": "0.5",
                "T": 1704067200120_i64,
                "m": true
            }
        });
        assert!(adapter.is_relevant(&frame));

        let items = adapter.parse(&frame).unwrap();
        let StreamItem::Trade(trade) = &items[0] else {
            panic!("expected a trade")
        };
        assert!(trade.is_buyer_maker);
        assert_eq!(trade.trade_id, 12345);
    }

    #[rstest]
    fn spot_depth_frame_takes_symbol_from_stream_name() {
        let adapter = BinanceOrderBookMessageAdapter;
        let frame = json!({
            "stream": "ethusdt@depth20@100ms",
            "data": {
                "lastUpdateId": 160,
                "bids": [["0.0024", "10"]],
                "asks": [["0.0026", "100"]]
            }
        });
        assert!(adapter.is_relevant(&frame));

        let items = adapter.parse(&frame).unwrap();
        let StreamItem::Book(book) = &items[0] else {
            panic!("expected a book")
        };
        assert_eq!(book.symbol.as_str(), "ETHUSDT");
        assert_eq!(book.last_update_id, 160);
    }

    #[rstest]
    fn force_order_parses_liquidation() {
        let adapter = BinanceLiquidationMessageAdapter;
        let frame = json!({
            "stream": "btcusdt@forceOrder",
            "data": {
                "e": "forceOrder",
                "E": 1568014460893_i64,
                "o": {
                    "s": "BTCUSDT",
                    "S": "SELL",
                    "o": "LIMIT",
                    "q": "0.014",
                    "p": "9910",
                    "ap": "9910",
                    "X": "FILLED",
                    "T": 1568014460893_i64
                }
            }
        });
        assert!(adapter.is_relevant(&frame));

        let items = adapter.parse(&frame).unwrap();
        let StreamItem::Liquidation(liq) = &items[0] else {
            panic!("expected a liquidation")
        };
        assert_eq!(liq.side, Side::Sell);
        assert_eq!(liq.price, dec!(9910));
    }

    #[rstest]
    fn irrelevant_frames_are_rejected() {
        let subscribe_ack = json!({"result": null, "id": 1});
        assert!(!BinanceKlineMessageAdapter.is_relevant(&subscribe_ack));
        assert!(!BinanceTradeMessageAdapter.is_relevant(&subscribe_ack));
        assert!(!BinanceLiquidationMessageAdapter.is_relevant(&subscribe_ack));
    }
}
