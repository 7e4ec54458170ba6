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

//! Message adapters normalizing Hyperliquid stream frames
//! (`{"channel": …, "data": …}`).

use polyfeed_model::{Bar, MarketDataError, StreamingBar, time::ms_to_datetime};
use polyfeed_runtime::{
    MessageAdapter, StreamItem,
    json::{as_array, as_decimal, as_i64, as_str, field},
};
use serde_json::Value;

use crate::http::parse::parse_ws_trade;

fn channel(payload: &Value) -> Option<&str> {
    payload.get("channel").and_then(Value::as_str)
}

/// Parses `candle` frames (one candle object per frame).
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidCandleMessageAdapter;

impl MessageAdapter for HyperliquidCandleMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        channel(payload) == Some("candle")
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let data = field(payload, "data")?;
        let symbol = as_str(field(data, "s")?, "candle coin")?;
        let close_time = as_i64(field(data, "T")?, "candle close time")?;
        // A candle is closed once its close time has passed.
        let is_closed = ms_to_datetime(close_time)? <= chrono::Utc::now();

        let bar = Bar::new(
            ms_to_datetime(as_i64(field(data, "t")?, "candle open time")?)?,
            as_decimal(field(data, "o")?, "candle open")?,
            as_decimal(field(data, "h")?, "candle high")?,
            as_decimal(field(data, "l")?, "candle low")?,
            as_decimal(field(data, "c")?, "candle close")?,
            as_decimal(field(data, "v")?, "candle volume")?,
            is_closed,
        )?;
        Ok(vec![StreamItem::Bar(StreamingBar::new(symbol, bar))])
    }
}

/// Parses `trades` frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct HyperliquidTradeMessageAdapter;

impl MessageAdapter for HyperliquidTradeMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        channel(payload) == Some("trades")
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let rows = as_array(field(payload, "data")?, "trade data")?;
        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(StreamItem::Trade(parse_ws_trade(row)?));
        }
        Ok(items)
    }
}
