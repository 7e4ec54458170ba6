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

//! Sum-typed payloads flowing through the request pipeline.
//!
//! Adapters normalize heterogeneous venue JSON into [`DataPayload`] (REST) or
//! [`StreamItem`]s (WebSocket); runners and the chunk executor only ever see
//! these types and never inspect raw payloads.

use chrono::{DateTime, Utc};
use polyfeed_model::{
    Bar, FundingRate, Liquidation, MarkPrice, MarketDataError, Ohlcv, OpenInterest, OrderBook,
    StreamingBar, SymbolInfo, Trade,
};
use ustr::Ustr;

/// The decoded result of one REST request.
#[derive(Clone, Debug, PartialEq)]
pub enum DataPayload {
    Ohlcv(Ohlcv),
    Bars(Vec<Bar>),
    Trades(Vec<Trade>),
    Book(OrderBook),
    OpenInterest(Vec<OpenInterest>),
    FundingRates(Vec<FundingRate>),
    MarkPrice(MarkPrice),
    Symbols(Vec<SymbolInfo>),
    Liquidations(Vec<Liquidation>),
    /// Venue health/ping payload, passed through unparsed.
    Health(serde_json::Value),
    /// Raw JSON escape hatch for venue-specific endpoints.
    Raw(serde_json::Value),
}

impl DataPayload {
    /// Number of data points in the payload (1 for scalar payloads).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Ohlcv(series) => series.bars.len(),
            Self::Bars(bars) => bars.len(),
            Self::Trades(trades) => trades.len(),
            Self::OpenInterest(samples) => samples.len(),
            Self::FundingRates(rates) => rates.len(),
            Self::Symbols(symbols) => symbols.len(),
            Self::Liquidations(orders) => orders.len(),
            Self::Book(_) | Self::MarkPrice(_) | Self::Health(_) | Self::Raw(_) => 1,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamp of the first point, for list payloads carrying timestamps.
    #[must_use]
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Ohlcv(series) => series.bars.first().map(|b| b.ts),
            Self::Bars(bars) => bars.first().map(|b| b.ts),
            Self::Trades(trades) => trades.first().map(|t| t.ts),
            Self::OpenInterest(samples) => samples.first().map(|s| s.ts),
            Self::FundingRates(rates) => rates.first().map(|r| r.funding_time),
            Self::Liquidations(orders) => orders.first().map(|o| o.ts),
            _ => None,
        }
    }

    /// Timestamp of the last point, for list payloads carrying timestamps.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Ohlcv(series) => series.bars.last().map(|b| b.ts),
            Self::Bars(bars) => bars.last().map(|b| b.ts),
            Self::Trades(trades) => trades.last().map(|t| t.ts),
            Self::OpenInterest(samples) => samples.last().map(|s| s.ts),
            Self::FundingRates(rates) => rates.last().map(|r| r.funding_time),
            Self::Liquidations(orders) => orders.last().map(|o| o.ts),
            _ => None,
        }
    }

    /// Drops every point with a timestamp at or before `cutoff`
    /// (chunk-overlap deduplication).
    pub fn retain_after(&mut self, cutoff: DateTime<Utc>) {
        match self {
            Self::Ohlcv(series) => series.bars.retain(|b| b.ts > cutoff),
            Self::Bars(bars) => bars.retain(|b| b.ts > cutoff),
            Self::Trades(trades) => trades.retain(|t| t.ts > cutoff),
            Self::OpenInterest(samples) => samples.retain(|s| s.ts > cutoff),
            Self::FundingRates(rates) => rates.retain(|r| r.funding_time > cutoff),
            Self::Liquidations(orders) => orders.retain(|o| o.ts > cutoff),
            _ => {}
        }
    }

    /// Appends the points of `other` to this payload.
    ///
    /// Containers keep their identity: an OHLCV aggregate keeps the metadata
    /// of the first chunk.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Data`] when the variants do not match or
    /// the payload kind cannot be aggregated.
    pub fn append(&mut self, other: Self) -> Result<(), MarketDataError> {
        match (self, other) {
            (Self::Ohlcv(agg), Self::Ohlcv(chunk)) => {
                agg.bars.extend(chunk.bars);
                Ok(())
            }
            (Self::Bars(agg), Self::Bars(chunk)) => {
                agg.extend(chunk);
                Ok(())
            }
            (Self::Trades(agg), Self::Trades(chunk)) => {
                agg.extend(chunk);
                Ok(())
            }
            (Self::OpenInterest(agg), Self::OpenInterest(chunk)) => {
                agg.extend(chunk);
                Ok(())
            }
            (Self::FundingRates(agg), Self::FundingRates(chunk)) => {
                agg.extend(chunk);
                Ok(())
            }
            (Self::Liquidations(agg), Self::Liquidations(chunk)) => {
                agg.extend(chunk);
                Ok(())
            }
            (agg, chunk) => Err(MarketDataError::Data(format!(
                "Cannot aggregate payload kinds {} and {}",
                agg.kind(),
                chunk.kind()
            ))),
        }
    }

    /// Truncates list payloads to at most `limit` points, dropping the tail.
    pub fn truncate(&mut self, limit: usize) {
        match self {
            Self::Ohlcv(series) => series.bars.truncate(limit),
            Self::Bars(bars) => bars.truncate(limit),
            Self::Trades(trades) => trades.truncate(limit),
            Self::OpenInterest(samples) => samples.truncate(limit),
            Self::FundingRates(rates) => rates.truncate(limit),
            Self::Liquidations(orders) => orders.truncate(limit),
            _ => {}
        }
    }

    /// Short label for the payload kind, used in errors and telemetry.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Ohlcv(_) => "ohlcv",
            Self::Bars(_) => "bars",
            Self::Trades(_) => "trades",
            Self::Book(_) => "order_book",
            Self::OpenInterest(_) => "open_interest",
            Self::FundingRates(_) => "funding_rates",
            Self::MarkPrice(_) => "mark_price",
            Self::Symbols(_) => "symbols",
            Self::Liquidations(_) => "liquidations",
            Self::Health(_) => "health",
            Self::Raw(_) => "raw",
        }
    }
}

/// One normalized point emitted by a live stream.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamItem {
    Bar(StreamingBar),
    Trade(Trade),
    Book(OrderBook),
    OpenInterest(OpenInterest),
    FundingRate(FundingRate),
    MarkPrice(MarkPrice),
    Liquidation(Liquidation),
}

impl StreamItem {
    /// The symbol the point belongs to.
    #[must_use]
    pub fn symbol(&self) -> Ustr {
        match self {
            Self::Bar(bar) => bar.symbol,
            Self::Trade(trade) => trade.symbol,
            Self::Book(book) => book.symbol,
            Self::OpenInterest(oi) => oi.symbol,
            Self::FundingRate(rate) => rate.symbol,
            Self::MarkPrice(mark) => mark.symbol,
            Self::Liquidation(liq) => liq.symbol,
        }
    }

    /// The event timestamp of the point.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Bar(bar) => bar.bar.ts,
            Self::Trade(trade) => trade.ts,
            Self::Book(book) => book.ts,
            Self::OpenInterest(oi) => oi.ts,
            Self::FundingRate(rate) => rate.funding_time,
            Self::MarkPrice(mark) => mark.ts,
            Self::Liquidation(liq) => liq.ts,
        }
    }

    /// Whether the point represents a closed interval; `None` when the
    /// concept does not apply.
    #[must_use]
    pub const fn is_closed(&self) -> Option<bool> {
        match self {
            Self::Bar(bar) => Some(bar.bar.is_closed),
            _ => None,
        }
    }

    /// Deduplication identity for the consecutive-duplicate filter.
    ///
    /// Bars deduplicate on `(symbol, open-timestamp, close)`; other points on
    /// their natural identity.
    #[must_use]
    pub fn dedupe_key(&self) -> String {
        match self {
            Self::Bar(bar) => {
                let (symbol, ts, close) = bar.dedupe_key();
                format!("{symbol}:{ts}:{close}")
            }
            Self::Trade(trade) => format!("{}:{}", trade.symbol, trade.trade_id),
            Self::Book(book) => format!("{}:{}", book.symbol, book.last_update_id),
            Self::OpenInterest(oi) => {
                format!("{}:{}:{}", oi.symbol, oi.ts.timestamp_millis(), oi.open_interest)
            }
            Self::FundingRate(rate) => format!(
                "{}:{}:{}",
                rate.symbol,
                rate.funding_time.timestamp_millis(),
                rate.funding_rate
            ),
            Self::MarkPrice(mark) => format!(
                "{}:{}:{}",
                mark.symbol,
                mark.ts.timestamp_millis(),
                mark.mark_price
            ),
            Self::Liquidation(liq) => {
                format!("{}:{}:{}", liq.symbol, liq.ts.timestamp_millis(), liq.price)
            }
        }
    }
}
