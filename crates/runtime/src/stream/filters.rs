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

//! Per-consumer stream filters: closed-only, throttle and dedupe.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use ustr::Ustr;

use crate::payload::StreamItem;

/// Filter options applied to one stream subscription, in order:
/// closed-only, then throttle, then dedupe.
#[derive(Copy, Clone, Debug, Default)]
pub struct StreamFilters {
    /// Drop points that expose `is_closed = false`.
    pub closed_only: bool,
    /// Emit at most one point per symbol per window; the latest within the
    /// window replaces prior points.
    pub throttle: Option<Duration>,
    /// Drop a point whose dedupe key equals the previously emitted key for
    /// the same symbol.
    pub dedupe: bool,
}

impl StreamFilters {
    /// Builds filters from request-level options.
    #[must_use]
    pub fn new(closed_only: bool, throttle_ms: Option<u64>, dedupe: bool) -> Self {
        Self {
            closed_only,
            throttle: throttle_ms.map(Duration::from_millis),
            dedupe,
        }
    }

    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.closed_only && self.throttle.is_none() && !self.dedupe
    }
}

/// Stateful application of [`StreamFilters`], keyed per symbol bucket.
#[derive(Debug)]
pub struct FilterChain {
    filters: StreamFilters,
    last_emit: HashMap<Ustr, Instant>,
    last_keys: HashMap<Ustr, String>,
}

impl FilterChain {
    #[must_use]
    pub fn new(filters: StreamFilters) -> Self {
        Self {
            filters,
            last_emit: HashMap::new(),
            last_keys: HashMap::new(),
        }
    }

    /// Applies the chain to one point; `None` means the point is filtered.
    pub fn apply(&mut self, item: StreamItem) -> Option<StreamItem> {
        if self.filters.closed_only && item.is_closed() == Some(false) {
            return None;
        }

        if let Some(window) = self.filters.throttle {
            let bucket = item.symbol();
            let now = Instant::now();
            match self.last_emit.get(&bucket) {
                Some(last) if now.duration_since(*last) < window => return None,
                _ => {
                    self.last_emit.insert(bucket, now);
                }
            }
        }

        if self.filters.dedupe {
            let bucket = item.symbol();
            let key = item.dedupe_key();
            if self.last_keys.get(&bucket) == Some(&key) {
                return None;
            }
            self.last_keys.insert(bucket, key);
        }

        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use polyfeed_model::{Bar, StreamingBar, time::ms_to_datetime};
    use rstest::rstest;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    fn bar_item(symbol: &str, minute: i64, close: Decimal, is_closed: bool) -> StreamItem {
        let bar = Bar::new(
            ms_to_datetime(minute * 60_000).unwrap(),
            dec!(100),
            dec!(200),
            dec!(1),
            close,
            dec!(1),
            is_closed,
        )
        .unwrap();
        StreamItem::Bar(StreamingBar::new(symbol, bar))
    }

    #[rstest]
    fn closed_only_drops_open_bars() {
        let mut chain = FilterChain::new(StreamFilters::new(true, None, false));
        assert!(chain.apply(bar_item("BTCUSDT", 0, dec!(100), false)).is_none());
        assert!(chain.apply(bar_item("BTCUSDT", 0, dec!(101), true)).is_some());
    }

    #[rstest]
    fn dedupe_drops_repeated_candles_only() {
        let mut chain = FilterChain::new(StreamFilters::new(false, None, true));
        assert!(chain.apply(bar_item("BTCUSDT", 0, dec!(100), true)).is_some());
        // Same symbol, timestamp and close: duplicate.
        assert!(chain.apply(bar_item("BTCUSDT", 0, dec!(100), true)).is_none());
        // Different close re-emits.
        assert!(chain.apply(bar_item("BTCUSDT", 0, dec!(101), true)).is_some());
        // Other symbols are independent buckets.
        assert!(chain.apply(bar_item("ETHUSDT", 0, dec!(100), true)).is_some());
    }

    #[rstest]
    fn throttle_emits_once_per_window() {
        let mut chain =
            FilterChain::new(StreamFilters::new(false, Some(60_000), false));
        assert!(chain.apply(bar_item("BTCUSDT", 0, dec!(100), true)).is_some());
        // Within the window every further point is suppressed.
        for i in 1..10 {
            assert!(chain
                .apply(bar_item("BTCUSDT", i, dec!(100) + Decimal::from(i), true))
                .is_none());
        }
        // Other symbols have their own windows.
        assert!(chain.apply(bar_item("ETHUSDT", 0, dec!(5), true)).is_some());
    }

    #[rstest]
    fn combined_filters_emit_one_point_per_closed_candle() {
        // Ten updates of the same minute candle with rising closes, then the
        // closed candle twice: exactly one emission with the final close.
        let mut chain = FilterChain::new(StreamFilters::new(true, Some(500), true));
        let mut emitted = Vec::new();

        for i in 0..10 {
            if let Some(item) = chain.apply(bar_item("BTCUSDT", 0, dec!(100) + Decimal::from(i), false))
            {
                emitted.push(item);
            }
        }
        for _ in 0..2 {
            if let Some(item) = chain.apply(bar_item("BTCUSDT", 0, dec!(110), true)) {
                emitted.push(item);
            }
        }

        assert_eq!(emitted.len(), 1);
        let StreamItem::Bar(bar) = &emitted[0] else {
            panic!("expected a bar")
        };
        assert_eq!(bar.bar.close, dec!(110));
        assert!(bar.bar.is_closed);
    }
}
