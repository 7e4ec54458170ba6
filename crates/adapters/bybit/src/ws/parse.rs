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

//! Message adapters normalizing Bybit public-stream frames.
//!
//! Frames carry a `topic` (`kline.1.BTCUSDT`, `publicTrade.BTCUSDT`,
//! `tickers.BTCUSDT`, …) and a `data` member. Ticker frames serve three
//! features at once, so mark-price, open-interest and funding adapters each
//! read the same topic and skip frames lacking their fields (delta frames are
//! partial).

use polyfeed_model::{
    Bar, BookLevel, FundingRate, Liquidation, MarkPrice, MarketDataError, OpenInterest, OrderBook,
    Side, StreamingBar, Trade, time::ms_to_datetime,
};
use polyfeed_runtime::{
    MessageAdapter, StreamItem,
    json::{as_array, as_decimal, as_i64, as_str, as_u64, field, opt_decimal},
};
use serde_json::Value;

use crate::http::parse::parse_trade_id;

fn topic(payload: &Value) -> Option<&str> {
    payload.get("topic").and_then(Value::as_str)
}

fn topic_symbol(payload: &Value) -> Result<&str, MarketDataError> {
    topic(payload)
        .and_then(|t| t.rsplit('.').next())
        .ok_or_else(|| MarketDataError::Data("Frame topic carries no symbol".to_string()))
}

fn frame_ts(payload: &Value) -> Result<chrono::DateTime<chrono::Utc>, MarketDataError> {
    ms_to_datetime(as_i64(field(payload, "ts")?, "frame timestamp")?)
}

/// Parses `kline.*` frames into streaming bars.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitKlineMessageAdapter;

impl MessageAdapter for BybitKlineMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        topic(payload).is_some_and(|t| t.starts_with("kline."))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let symbol = topic_symbol(payload)?;
        let rows = as_array(field(payload, "data")?, "kline data")?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let bar = Bar::new(
                ms_to_datetime(as_i64(field(row, "start")?, "kline start")?)?,
                as_decimal(field(row, "open")?, "kline open")?,
                as_decimal(field(row, "high")?, "kline high")?,
                as_decimal(field(row, "low")?, "kline low")?,
                as_decimal(field(row, "close")?, "kline close")?,
                as_decimal(field(row, "volume")?, "kline volume")?,
                field(row, "confirm")?.as_bool().unwrap_or(false),
            )?;
            items.push(StreamItem::Bar(StreamingBar::new(symbol, bar)));
        }
        Ok(items)
    }
}

/// Parses `publicTrade.*` frames; `S` is the taker side.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitTradeMessageAdapter;

impl MessageAdapter for BybitTradeMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        topic(payload).is_some_and(|t| t.starts_with("publicTrade."))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let rows = as_array(field(payload, "data")?, "trade data")?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let symbol = as_str(field(row, "s")?, "trade symbol")?;
            let taker_side = as_str(field(row, "S")?, "trade side")?;
            let trade = Trade::new(
                symbol,
                parse_trade_id(as_str(field(row, "i")?, "trade id")?),
                as_decimal(field(row, "p")?, "trade price")?,
                as_decimal(field(row, "v")?, "trade volume")?,
                None,
                ms_to_datetime(as_i64(field(row, "T")?, "trade time")?)?,
                taker_side == "Sell",
                None,
            )?;
            items.push(StreamItem::Trade(trade));
        }
        Ok(items)
    }
}

/// Parses `orderbook.*` snapshot frames; delta frames are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitOrderBookMessageAdapter;

impl MessageAdapter for BybitOrderBookMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        topic(payload).is_some_and(|t| t.starts_with("orderbook."))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        if payload.get("type").and_then(Value::as_str) != Some("snapshot") {
            return Ok(Vec::new());
        }
        let data = field(payload, "data")?;

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
                        as_decimal(&level[1], "book size")?,
                    ))
                })
                .collect()
        };

        let book = OrderBook::new(
            as_str(field(data, "s")?, "book symbol")?,
            as_u64(field(data, "u")?, "book update id")?,
            parse_side(field(data, "b")?, "bids")?,
            parse_side(field(data, "a")?, "asks")?,
            frame_ts(payload)?,
        )?;
        Ok(vec![StreamItem::Book(book)])
    }
}

/// Extracts mark prices from `tickers.*` frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitTickerMarkPriceAdapter;

impl MessageAdapter for BybitTickerMarkPriceAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        topic(payload).is_some_and(|t| t.starts_with("tickers."))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let data = field(payload, "data")?;
        // Delta frames may omit the mark price entirely.
        let Some(mark_price) = opt_decimal(data.get("markPrice"), "mark price")? else {
            return Ok(Vec::new());
        };

        let next_funding_time = match data.get("nextFundingTime") {
            Some(v) if !v.is_null() => {
                let ms = as_i64(v, "next funding time")?;
                (ms > 0).then(|| ms_to_datetime(ms)).transpose()?
            }
            _ => None,
        };

        let mark = MarkPrice::new(
            topic_symbol(payload)?,
            mark_price,
            opt_decimal(data.get("indexPrice"), "index price")?,
            opt_decimal(data.get("fundingRate"), "funding rate")?,
            next_funding_time,
            frame_ts(payload)?,
        );
        Ok(vec![StreamItem::MarkPrice(mark)])
    }
}

/// Extracts open interest from `tickers.*` frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitTickerOpenInterestAdapter;

impl MessageAdapter for BybitTickerOpenInterestAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        topic(payload).is_some_and(|t| t.starts_with("tickers."))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let data = field(payload, "data")?;
        let Some(open_interest) = opt_decimal(data.get("openInterest"), "open interest")? else {
            return Ok(Vec::new());
        };

        let sample = OpenInterest::new(
            topic_symbol(payload)?,
            frame_ts(payload)?,
            open_interest,
            opt_decimal(data.get("openInterestValue"), "open interest value")?,
        );
        Ok(vec![StreamItem::OpenInterest(sample)])
    }
}

/// Extracts funding rates from `tickers.*` frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitTickerFundingAdapter;

impl MessageAdapter for BybitTickerFundingAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        topic(payload).is_some_and(|t| t.starts_with("tickers."))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let data = field(payload, "data")?;
        let Some(funding_rate) = opt_decimal(data.get("fundingRate"), "funding rate")? else {
            return Ok(Vec::new());
        };

        let funding_time = match data.get("nextFundingTime") {
            Some(v) if !v.is_null() => ms_to_datetime(as_i64(v, "next funding time")?)?,
            _ => frame_ts(payload)?,
        };

        let rate = FundingRate::new(
            topic_symbol(payload)?,
            funding_time,
            funding_rate,
            opt_decimal(data.get("markPrice"), "mark price")?,
        );
        Ok(vec![StreamItem::FundingRate(rate)])
    }
}

/// Parses `liquidation.*` frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct BybitLiquidationMessageAdapter;

impl MessageAdapter for BybitLiquidationMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        topic(payload).is_some_and(|t| t.starts_with("liquidation."))
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let data = field(payload, "data")?;
        let side = match as_str(field(data, "side")?, "liquidation side")? {
            "Buy" => Side::Buy,
            "Sell" => Side::Sell,
            other => {
                return Err(MarketDataError::Data(format!(
                    "Unknown liquidation side '{other}'"
                )));
            }
        };

        let liquidation = Liquidation::new(
            as_str(field(data, "symbol")?, "liquidation symbol")?,
            side,
            as_decimal(field(data, "size")?, "liquidation size")?,
            as_decimal(field(data, "price")?, "liquidation price")?,
            None,
            ms_to_datetime(as_i64(field(data, "updatedTime")?, "liquidation time")?)?,
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

    #[rstest]
    fn kline_frames_parse_with_confirm_flag() {
        let frame = json!({
            "topic": "kline.1.BTCUSDT",
            "type": "snapshot",
            "ts": 1704067215000_i64,
            "data": [{
                "start": 1704067200000_i64,
                "end": 1704067259999_i64,
                "interval": "1",
                "open": "42000",
                "close": "42050.5",
                "high": "42100",
                "low": "41900",
                "volume": "12.5",
                "turnover": "525000",
                "confirm": false,
                "timestamp": 1704067215000_i64
            }]
        });
        let adapter = BybitKlineMessageAdapter;
        assert!(adapter.is_relevant(&frame));

        let items = adapter.parse(&frame).unwrap();
        let StreamItem::Bar(bar) = &items[0] else {
            panic!("expected bar")
        };
        assert_eq!(bar.symbol.as_str(), "BTCUSDT");
        assert!(!bar.bar.is_closed);
        assert_eq!(bar.bar.close, dec!(42050.5));
    }

    #[rstest]
    fn public_trades_derive_buyer_maker_from_taker_side() {
        let frame = json!({
            "topic": "publicTrade.BTCUSDT",
            "ts": 1704067200500_i64,
            "data": [
                {"T": 1704067200400_i64, "s": "BTCUSDT", "S": "Sell", "v": "0.5", "p": "42000", "i": "987654"},
                {"T": 1704067200450_i64, "s": "BTCUSDT", "S": "Buy", "v": "0.1", "p": "42001", "i": "987655"}
            ]
        });
        let items = BybitTradeMessageAdapter.parse(&frame).unwrap();
        let StreamItem::Trade(sell) = &items[0] else {
            panic!("expected trade")
        };
        let StreamItem::Trade(buy) = &items[1] else {
            panic!("expected trade")
        };
        assert!(sell.is_buyer_maker);
        assert!(!buy.is_buyer_maker);
    }

    #[rstest]
    fn ticker_frame_feeds_three_adapters() {
        let frame = json!({
            "topic": "tickers.BTCUSDT",
            "type": "snapshot",
            "ts": 1704067200000_i64,
            "data": {
                "symbol": "BTCUSDT",
                "markPrice": "42010.5",
                "indexPrice": "42008.2",
                "fundingRate": "0.0001",
                "nextFundingTime": 1704096000000_i64,
                "openInterest": "120000.5",
                "openInterestValue": "5040000000.0"
            }
        });

        let mark = BybitTickerMarkPriceAdapter.parse(&frame).unwrap();
        assert!(matches!(&mark[0], StreamItem::MarkPrice(m) if m.mark_price == dec!(42010.5)));

        let oi = BybitTickerOpenInterestAdapter.parse(&frame).unwrap();
        assert!(matches!(&oi[0], StreamItem::OpenInterest(o) if o.open_interest == dec!(120000.5)));

        let funding = BybitTickerFundingAdapter.parse(&frame).unwrap();
        assert!(matches!(&funding[0], StreamItem::FundingRate(f) if f.funding_rate == dec!(0.0001)));
    }

    #[rstest]
    fn ticker_delta_without_fields_yields_nothing() {
        let frame = json!({
            "topic": "tickers.BTCUSDT",
            "type": "delta",
            "ts": 1704067201000_i64,
            "data": {"symbol": "BTCUSDT", "lastPrice": "42011.0"}
        });
        assert!(BybitTickerMarkPriceAdapter.parse(&frame).unwrap().is_empty());
        assert!(BybitTickerOpenInterestAdapter.parse(&frame).unwrap().is_empty());
        assert!(BybitTickerFundingAdapter.parse(&frame).unwrap().is_empty());
    }

    #[rstest]
    fn order_book_deltas_are_skipped() {
        let snapshot = json!({
            "topic": "orderbook.50.BTCUSDT",
            "type": "snapshot",
            "ts": 1704067200000_i64,
            "data": {
                "s": "BTCUSDT",
                "b": [["42000", "1.0"]],
                "a": [["42001", "2.0"]],
                "u": 7,
                "seq": 100
            }
        });
        let delta = json!({
            "topic": "orderbook.50.BTCUSDT",
            "type": "delta",
            "ts": 1704067200100_i64,
            "data": {"s": "BTCUSDT", "b": [], "a": [["42002", "1.0"]], "u": 8, "seq": 101}
        });

        assert_eq!(BybitOrderBookMessageAdapter.parse(&snapshot).unwrap().len(), 1);
        assert!(BybitOrderBookMessageAdapter.parse(&delta).unwrap().is_empty());
    }

    #[rstest]
    fn pong_frames_are_irrelevant() {
        let pong = json!({"op": "pong", "success": true});
        assert!(!BybitKlineMessageAdapter.is_relevant(&pong));
        assert!(!BybitTradeMessageAdapter.is_relevant(&pong));
    }
}
