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

//! Message adapters normalizing Coinbase Exchange feed messages.

use chrono::{DateTime, Utc};
use polyfeed_model::{MarketDataError, Trade};
use polyfeed_runtime::{
    MessageAdapter, StreamItem,
    json::{as_str, as_u64, decimal_str, field},
};
use serde_json::Value;

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, MarketDataError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MarketDataError::Data(format!("Unparseable RFC 3339 timestamp '{value}'")))
}

/// Parses `match` / `last_match` messages; `side` is the **maker** side.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoinbaseMatchMessageAdapter;

impl MessageAdapter for CoinbaseMatchMessageAdapter {
    fn is_relevant(&self, payload: &Value) -> bool {
        matches!(
            payload.get("type").and_then(Value::as_str),
            Some("match" | "last_match")
        )
    }

    fn parse(&self, payload: &Value) -> Result<Vec<StreamItem>, MarketDataError> {
        let trade = Trade::new(
            as_str(field(payload, "product_id")?, "product id")?,
            as_u64(field(payload, "trade_id")?, "trade id")?,
            decimal_str(as_str(field(payload, "price")?, "price")?, "price")?,
            decimal_str(as_str(field(payload, "size")?, "size")?, "size")?,
            None,
            parse_rfc3339(as_str(field(payload, "time")?, "time")?)?,
            as_str(field(payload, "side")?, "side")?.eq_ignore_ascii_case("buy"),
            None,
        )?;
        Ok(vec![StreamItem::Trade(trade)])
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn match_messages_parse_into_trades() {
        let frame = json!({
            "type": "match",
            "trade_id": 10,
            "sequence": 50,
            "maker_order_id": "ac928c66-ca53-498f-9c13-a110027a60e8",
            "taker_order_id": "132fb6ae-456b-4654-b4e0-d681ac05cea1",
            "time": "2024-01-01T00:00:00.702746Z",
            "product_id": "BTC-USD",
            "size": "5.23512",
            "price": "400.23",
            "side": "sell"
        });
        let adapter = CoinbaseMatchMessageAdapter;
        assert!(adapter.is_relevant(&frame));

        let items = adapter.parse(&frame).unwrap();
        let StreamItem::Trade(trade) = &items[0] else {
            panic!("expected trade")
        };
        assert_eq!(trade.symbol.as_str(), "BTC-USD");
        assert_eq!(trade.price, dec!(400.23));
        assert!(!trade.is_buyer_maker, "maker sold");
    }

    #[test]
    fn subscription_acks_are_irrelevant() {
        let ack = json!({"type": "subscriptions", "channels": []});
        assert!(!CoinbaseMatchMessageAdapter.is_relevant(&ack));
    }
}
