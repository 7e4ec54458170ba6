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

//! OHLCV bars and bar series.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{enums::Timeframe, errors::MarketDataError};

/// Identity of a bar series: upper-case symbol plus timeframe.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesMeta {
    /// Upper-case canonical symbol (e.g. `BTCUSDT`).
    pub symbol: Ustr,
    /// Bar interval for the series.
    pub timeframe: Timeframe,
}

impl SeriesMeta {
    /// Creates a new series identity, upper-casing the symbol.
    #[must_use]
    pub fn new(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            timeframe,
        }
    }
}

impl std::fmt::Display for SeriesMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.symbol, self.timeframe)
    }
}

/// A single OHLCV aggregation over one timeframe interval.
///
/// The timestamp is the UTC bar-open time. Construction enforces
/// `low <= min(open, close) <= max(open, close) <= high` and `volume >= 0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    /// UTC bar-open timestamp.
    pub ts: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Whether the interval has completed on the venue.
    pub is_closed: bool,
}

impl Bar {
    /// Creates a validated bar.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when the OHLC ordering invariant
    /// is violated or the volume is negative.
    pub fn new(
        ts: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        is_closed: bool,
    ) -> Result<Self, MarketDataError> {
        let body_high = open.max(close);
        let body_low = open.min(close);
        if low > body_low || body_high > high {
            return Err(MarketDataError::Validation(format!(
                "Bar OHLC invariant violated at {ts}: low={low} open={open} close={close} high={high}"
            )));
        }
        if volume < Decimal::ZERO {
            return Err(MarketDataError::Validation(format!(
                "Bar volume must be non-negative, was {volume}"
            )));
        }
        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
            is_closed,
        })
    }
}

/// An ordered bar series with its identity metadata.
///
/// Bars are strictly increasing by timestamp; venue adapters sort
/// newest-first payloads before constructing a series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub meta: SeriesMeta,
    pub bars: Vec<Bar>,
}

impl Ohlcv {
    /// Creates a series after checking bar ordering.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when bars are not strictly
    /// increasing by timestamp.
    pub fn new(meta: SeriesMeta, bars: Vec<Bar>) -> Result<Self, MarketDataError> {
        for pair in bars.windows(2) {
            if pair[1].ts <= pair[0].ts {
                return Err(MarketDataError::Validation(format!(
                    "Bars must be strictly increasing by timestamp: {} !< {}",
                    pair[0].ts, pair[1].ts
                )));
            }
        }
        Ok(Self { meta, bars })
    }

    /// Creates an empty series.
    #[must_use]
    pub const fn empty(meta: SeriesMeta) -> Self {
        Self {
            meta,
            bars: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Serializes the series to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Data`] on serialization failure.
    pub fn to_json(&self) -> Result<serde_json::Value, MarketDataError> {
        serde_json::to_value(self).map_err(MarketDataError::from)
    }

    /// Reconstructs a series from its JSON form, re-validating ordering.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Data`] on malformed JSON or
    /// [`MarketDataError::Validation`] if the bars are out of order.
    pub fn from_json(value: serde_json::Value) -> Result<Self, MarketDataError> {
        let raw: Self = serde_json::from_value(value)?;
        Self::new(raw.meta, raw.bars)
    }
}

/// A bar tagged with its symbol, as emitted by live streams.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingBar {
    /// Upper-case symbol the bar belongs to.
    pub symbol: Ustr,
    #[serde(flatten)]
    pub bar: Bar,
}

impl StreamingBar {
    /// Creates a streaming bar, upper-casing the symbol.
    #[must_use]
    pub fn new(symbol: &str, bar: Bar) -> Self {
        Self {
            symbol: Ustr::from(&symbol.to_uppercase()),
            bar,
        }
    }

    /// Default deduplication identity: `(symbol, open-timestamp, close)`.
    #[must_use]
    pub fn dedupe_key(&self) -> (Ustr, i64, Decimal) {
        (self.symbol, self.bar.ts.timestamp_millis(), self.bar.close)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::time::ms_to_datetime;

    fn bar_at(ms: i64, close: Decimal) -> Bar {
        Bar::new(
            ms_to_datetime(ms).unwrap(),
            dec!(100),
            dec!(110).max(close),
            dec!(90).min(close),
            close,
            dec!(1.5),
            true,
        )
        .unwrap()
    }

    #[rstest]
    #[case(dec!(100), dec!(110), dec!(90), dec!(105), true)]
    #[case(dec!(100), dec!(100), dec!(100), dec!(100), true)]
    #[case(dec!(100), dec!(99), dec!(90), dec!(95), false)] // high below open
    #[case(dec!(100), dec!(110), dec!(101), dec!(105), false)] // low above open
    fn bar_ohlc_invariant(
        #[case] open: Decimal,
        #[case] high: Decimal,
        #[case] low: Decimal,
        #[case] close: Decimal,
        #[case] valid: bool,
    ) {
        let result = Bar::new(
            ms_to_datetime(0).unwrap(),
            open,
            high,
            low,
            close,
            dec!(1),
            true,
        );
        assert_eq!(result.is_ok(), valid);
    }

    #[rstest]
    fn bar_rejects_negative_volume() {
        let result = Bar::new(
            ms_to_datetime(0).unwrap(),
            dec!(1),
            dec!(1),
            dec!(1),
            dec!(1),
            dec!(-0.1),
            true,
        );
        assert!(matches!(result, Err(MarketDataError::Validation(_))));
    }

    #[rstest]
    fn ohlcv_rejects_out_of_order_bars() {
        let meta = SeriesMeta::new("btcusdt", Timeframe::M1);
        assert_eq!(meta.symbol.as_str(), "BTCUSDT");

        let bars = vec![bar_at(120_000, dec!(101)), bar_at(60_000, dec!(102))];
        assert!(Ohlcv::new(meta, bars).is_err());

        let bars = vec![bar_at(60_000, dec!(101)), bar_at(60_000, dec!(102))];
        assert!(Ohlcv::new(meta, bars).is_err(), "equal timestamps rejected");
    }

    #[rstest]
    fn ohlcv_json_round_trip() {
        let meta = SeriesMeta::new("ETHUSDT", Timeframe::H1);
        let series = Ohlcv::new(
            meta,
            vec![bar_at(0, dec!(100)), bar_at(3_600_000, dec!(101.25))],
        )
        .unwrap();

        let restored = Ohlcv::from_json(series.to_json().unwrap()).unwrap();
        assert_eq!(restored, series);
    }

    #[rstest]
    fn streaming_bar_dedupe_key_tracks_close() {
        let a = StreamingBar::new("btcusdt", bar_at(60_000, dec!(100)));
        let b = StreamingBar::new("BTCUSDT", bar_at(60_000, dec!(100)));
        let c = StreamingBar::new("BTCUSDT", bar_at(60_000, dec!(100.5)));
        assert_eq!(a.dedupe_key(), b.dedupe_key());
        assert_ne!(a.dedupe_key(), c.dedupe_key());
    }
}
