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

//! Chunk execution: fetching, deduplicating and aggregating chunk plans.

use std::{collections::VecDeque, future::Future, time::Instant};

use chrono::{DateTime, Utc};
use polyfeed_model::MarketDataError;

use super::definitions::{ChunkHint, ChunkPlan, ChunkPolicy, ChunkResult, WeightPolicy};
use crate::{endpoint::CursorExtractor, payload::DataPayload};

/// Executes chunk plans and aggregates results.
///
/// The executor fetches each plan in order, drops points at or before the
/// last accepted timestamp (overlap deduplication), stops early on short or
/// empty chunks, and re-raises any chunk failure — partial aggregates are
/// never returned silently.
#[derive(Clone, Debug)]
pub struct ChunkExecutor {
    endpoint_id: &'static str,
    policy: ChunkPolicy,
    hint: ChunkHint,
    weight_policy: Option<WeightPolicy>,
}

impl ChunkExecutor {
    #[must_use]
    pub fn new(
        endpoint_id: &'static str,
        policy: ChunkPolicy,
        hint: ChunkHint,
        weight_policy: Option<WeightPolicy>,
    ) -> Self {
        Self {
            endpoint_id,
            policy,
            hint,
            weight_policy,
        }
    }

    /// Executes the plans, continuing cursor-seeded plans from each chunk's
    /// tail when `next_cursor` is provided.
    ///
    /// `total_limit` truncates the aggregate at the end; `max_chunks` bounds
    /// cursor continuation.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when no plans are given, or
    /// re-raises the first chunk failure after emitting a `chunk_error`
    /// telemetry event.
    pub async fn execute<F, Fut>(
        &self,
        plans: Vec<ChunkPlan>,
        next_cursor: Option<CursorExtractor>,
        total_limit: Option<u32>,
        max_chunks: Option<u32>,
        fetch_chunk: F,
    ) -> Result<ChunkResult, MarketDataError>
    where
        F: Fn(ChunkPlan) -> Fut,
        Fut: Future<Output = Result<DataPayload, MarketDataError>>,
    {
        if plans.is_empty() {
            return Err(MarketDataError::Validation(
                "Cannot execute: no chunk plans provided".to_string(),
            ));
        }

        let cursor_mode = self.hint.cursor_field.is_some() && next_cursor.is_some();
        let effective_max_chunks = max_chunks.or(self.policy.max_chunks);

        let mut queue: VecDeque<ChunkPlan> = plans.into();
        let mut aggregate: Option<DataPayload> = None;
        let mut last_timestamp: Option<DateTime<Utc>> = None;
        let mut start_timestamp: Option<DateTime<Utc>> = None;
        let mut end_timestamp: Option<DateTime<Utc>> = None;
        let mut chunks_used: u32 = 0;
        let mut weight_consumed: u32 = 0;

        while let Some(plan) = queue.pop_front() {
            let chunk_index = plan.chunk_index;
            let plan_limit = plan.limit;
            let started = Instant::now();

            let mut chunk = match fetch_chunk(plan).await {
                Ok(chunk) => chunk,
                Err(error) => {
                    tracing::error!(
                        endpoint_id = self.endpoint_id,
                        chunk_index,
                        error_kind = error.kind(),
                        error = %error,
                        "chunk_error"
                    );
                    return Err(error);
                }
            };

            chunks_used += 1;
            let weight = self
                .weight_policy
                .map_or(self.policy.weight_per_request, |w| w.calculate(plan_limit));
            weight_consumed += weight;
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            let rows = chunk.len();
            tracing::info!(
                endpoint_id = self.endpoint_id,
                chunk_index,
                rows,
                weight,
                latency_ms,
                timestamp_key = self.hint.timestamp_key,
                "chunk_completed"
            );

            if rows == 0 {
                // Preserve the container shape of an empty first chunk.
                if aggregate.is_none() {
                    aggregate = Some(chunk);
                }
                break;
            }

            if let Some(cutoff) = last_timestamp {
                chunk.retain_after(cutoff);
            }
            let fresh_rows = chunk.len();
            if fresh_rows == 0 {
                break; // overlapping tail only
            }

            let next = if cursor_mode {
                next_cursor.and_then(|extract| extract(&chunk))
            } else {
                None
            };

            match aggregate.as_mut() {
                Some(agg) => agg.append(chunk)?,
                None => aggregate = Some(chunk),
            }
            let agg = aggregate.as_ref().expect("aggregate set above");
            if start_timestamp.is_none() {
                start_timestamp = agg.first_timestamp();
            }
            if let Some(ts) = agg.last_timestamp() {
                end_timestamp = Some(ts);
                last_timestamp = Some(ts);
            }

            // End of data: fewer points than requested, counted after the
            // overlap dedup, matching the aggregate that actually grew.
            if fresh_rows < plan_limit as usize {
                break;
            }

            if queue.is_empty()
                && cursor_mode
                && let Some(cursor) = next
            {
                let next_index = chunk_index + 1;
                if effective_max_chunks.is_none_or(|max| next_index < max) {
                    queue.push_back(ChunkPlan {
                        start_time: None,
                        end_time: None,
                        limit: plan_limit,
                        cursor: Some(cursor),
                        chunk_index: next_index,
                    });
                }
            }
        }

        let mut data = aggregate.expect("at least one chunk executed");
        if let Some(limit) = total_limit {
            data.truncate(limit as usize);
        }
        let total_points = data.len();

        tracing::info!(
            endpoint_id = self.endpoint_id,
            chunks_used,
            total_points,
            weight_consumed,
            start_timestamp = start_timestamp.map(|t| t.to_rfc3339()),
            end_timestamp = end_timestamp.map(|t| t.to_rfc3339()),
            "chunk_execution_complete"
        );

        Ok(ChunkResult {
            data,
            chunks_used,
            weight_consumed,
            throttle_applied: false,
            total_points,
            start_timestamp,
            end_timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    use polyfeed_model::{Bar, Ohlcv, SeriesMeta, Timeframe, time::ms_to_datetime};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    fn bar_at(minute: i64) -> Bar {
        Bar::new(
            ms_to_datetime(minute * 60_000).unwrap(),
            dec!(100),
            dec!(101),
            dec!(99),
            dec!(100.5),
            dec!(1),
            true,
        )
        .unwrap()
    }

    fn bars_payload(range: std::ops::Range<i64>) -> DataPayload {
        DataPayload::Bars(range.map(bar_at).collect())
    }

    fn plan(limit: u32, index: u32) -> ChunkPlan {
        ChunkPlan {
            start_time: None,
            end_time: None,
            limit,
            cursor: None,
            chunk_index: index,
        }
    }

    fn executor() -> ChunkExecutor {
        ChunkExecutor::new(
            "test.ohlcv",
            ChunkPolicy::new(10),
            ChunkHint::default(),
            None,
        )
    }

    #[tokio::test]
    async fn aggregates_chunks_in_order() {
        let plans = vec![plan(10, 0), plan(10, 1)];
        let result = executor()
            .execute(plans, None, None, None, |p| async move {
                match p.chunk_index {
                    0 => Ok(bars_payload(0..10)),
                    _ => Ok(bars_payload(10..15)),
                }
            })
            .await
            .unwrap();

        assert_eq!(result.chunks_used, 2);
        assert_eq!(result.total_points, 15);
        assert_eq!(
            result.start_timestamp.unwrap(),
            ms_to_datetime(0).unwrap()
        );
        assert_eq!(
            result.end_timestamp.unwrap(),
            ms_to_datetime(14 * 60_000).unwrap()
        );
    }

    #[tokio::test]
    async fn deduplicates_overlapping_tail() {
        // Second chunk overlaps the first by five bars.
        let plans = vec![plan(10, 0), plan(10, 1)];
        let result = executor()
            .execute(plans, None, None, None, |p| async move {
                match p.chunk_index {
                    0 => Ok(bars_payload(0..10)),
                    _ => Ok(bars_payload(5..20)),
                }
            })
            .await
            .unwrap();

        // Aggregate equals B1 plus the strictly-newer part of B2.
        assert_eq!(result.total_points, 20);
        let DataPayload::Bars(bars) = result.data else {
            panic!("expected bars")
        };
        for pair in bars.windows(2) {
            assert!(pair[0].ts < pair[1].ts, "aggregate must stay ascending");
        }
    }

    #[tokio::test]
    async fn stops_on_short_chunk() {
        let calls = Arc::new(AtomicU32::new(0));
        let plans = vec![plan(10, 0), plan(10, 1), plan(10, 2)];
        let calls_in_fetch = Arc::clone(&calls);
        let result = executor()
            .execute(plans, None, None, None, move |_p| {
                let calls = Arc::clone(&calls_in_fetch);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(bars_payload(0..3)) // fewer than requested
                }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1, "end-of-data stops early");
        assert_eq!(result.total_points, 3);
    }

    #[tokio::test]
    async fn stops_when_overlap_leaves_a_short_tail() {
        // The second chunk returns a full page, but after dropping the
        // overlap only two points are new: that is end of data, so the third
        // plan must never be fetched.
        let calls = Arc::new(AtomicU32::new(0));
        let plans = vec![plan(10, 0), plan(10, 1), plan(10, 2)];
        let calls_in_fetch = Arc::clone(&calls);
        let result = executor()
            .execute(plans, None, None, None, move |p| {
                let calls = Arc::clone(&calls_in_fetch);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    match p.chunk_index {
                        0 => Ok(bars_payload(0..10)),
                        _ => Ok(bars_payload(2..12)), // 10 raw, 2 fresh
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(result.chunks_used, 2);
        assert_eq!(result.total_points, 12);
    }

    #[tokio::test]
    async fn stops_on_fully_duplicate_chunk() {
        let plans = vec![plan(10, 0), plan(10, 1), plan(10, 2)];
        let result = executor()
            .execute(plans, None, None, None, |p| async move {
                // Every chunk returns the same window; only the first counts.
                let _ = p;
                Ok(bars_payload(0..10))
            })
            .await
            .unwrap();

        assert_eq!(result.chunks_used, 2, "second chunk detected as duplicate");
        assert_eq!(result.total_points, 10);
    }

    #[tokio::test]
    async fn chunk_failure_propagates_without_partial_result() {
        let plans = vec![plan(10, 0), plan(10, 1)];
        let result = executor()
            .execute(plans, None, None, None, |p| async move {
                match p.chunk_index {
                    0 => Ok(bars_payload(0..10)),
                    _ => Err(MarketDataError::Network("connection reset".to_string())),
                }
            })
            .await;

        assert!(matches!(result, Err(MarketDataError::Network(_))));
    }

    #[tokio::test]
    async fn truncates_to_total_limit() {
        let plans = vec![plan(10, 0), plan(10, 1)];
        let result = executor()
            .execute(plans, None, Some(12), None, |p| async move {
                match p.chunk_index {
                    0 => Ok(bars_payload(0..10)),
                    _ => Ok(bars_payload(10..20)),
                }
            })
            .await
            .unwrap();

        assert_eq!(result.total_points, 12);
    }

    #[tokio::test]
    async fn preserves_ohlcv_container() {
        let meta = SeriesMeta::new("BTCUSDT", Timeframe::M1);
        let plans = vec![plan(5, 0), plan(5, 1)];
        let result = executor()
            .execute(plans, None, None, None, move |p| async move {
                let bars: Vec<Bar> = match p.chunk_index {
                    0 => (0..5).map(bar_at).collect(),
                    _ => (5..8).map(bar_at).collect(),
                };
                Ok(DataPayload::Ohlcv(Ohlcv::new(meta, bars).unwrap()))
            })
            .await
            .unwrap();

        let DataPayload::Ohlcv(series) = result.data else {
            panic!("expected an OHLCV container")
        };
        assert_eq!(series.meta, meta);
        assert_eq!(series.bars.len(), 8);
    }

    #[tokio::test]
    async fn cursor_continuation_bounded_by_max_chunks() {
        let executor = ChunkExecutor::new(
            "test.trades",
            ChunkPolicy::new(10),
            ChunkHint::cursor("last"),
            None,
        );
        let extract: CursorExtractor = |payload| {
            payload
                .last_timestamp()
                .map(|ts| serde_json::json!(ts.timestamp_millis()))
        };

        let result = executor
            .execute(vec![plan(10, 0)], Some(extract), None, Some(3), |p| {
                let offset = i64::from(p.chunk_index) * 10;
                async move { Ok(bars_payload(offset..offset + 10)) }
            })
            .await
            .unwrap();

        assert_eq!(result.chunks_used, 3);
        assert_eq!(result.total_points, 30);
    }
}
