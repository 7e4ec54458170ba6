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

//! Chunk planning: splitting one user request into per-call windows.

use chrono::{DateTime, Duration, Utc};
use polyfeed_model::{MarketDataError, Timeframe};

use super::definitions::{ChunkHint, ChunkPlan, ChunkPolicy};

/// Plans chunk windows for paginated requests.
///
/// Takes the user's `(limit, start_time, end_time)` and the endpoint's
/// [`ChunkPolicy`], then emits the list of [`ChunkPlan`]s that respects the
/// venue's per-request point cap.
#[derive(Clone, Debug)]
pub struct ChunkPlanner {
    endpoint_id: &'static str,
    policy: ChunkPolicy,
    hint: ChunkHint,
}

impl ChunkPlanner {
    #[must_use]
    pub fn new(endpoint_id: &'static str, policy: ChunkPolicy, hint: ChunkHint) -> Self {
        Self {
            endpoint_id,
            policy,
            hint,
        }
    }

    /// Plans chunks for a request.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when a required start time is
    /// missing, when a time-based request lacks a timeframe, when the
    /// timeframe has no fixed second count (calendar months must use
    /// limit-based requests), or when neither limit nor time range is given.
    pub fn plan(
        &self,
        limit: Option<u32>,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        timeframe: Option<Timeframe>,
        max_chunks: Option<u32>,
    ) -> Result<Vec<ChunkPlan>, MarketDataError> {
        if self.policy.requires_start_time && start_time.is_none() {
            return Err(MarketDataError::Validation(format!(
                "Endpoint {} requires start_time for chunking",
                self.endpoint_id
            )));
        }

        let effective_max_chunks = max_chunks.or(self.policy.max_chunks);

        // Fast path: a single request covers the whole ask.
        if let Some(limit) = limit
            && limit <= self.policy.max_points
            && effective_max_chunks == Some(1)
        {
            return Ok(vec![ChunkPlan {
                start_time,
                end_time,
                limit,
                cursor: None,
                chunk_index: 0,
            }]);
        }

        let chunk_limit = limit.map_or(self.policy.max_points, |l| l.min(self.policy.max_points));

        // Cursor-seeded: emit the initial plan; the executor continues from
        // each chunk's tail.
        if self.hint.cursor_field.is_some() {
            let plans = vec![ChunkPlan {
                start_time,
                end_time,
                limit: chunk_limit,
                cursor: None,
                chunk_index: 0,
            }];
            self.log_plan(&plans, limit, None);
            return Ok(plans);
        }

        if start_time.is_none() && end_time.is_none() && limit.is_none() {
            return Err(MarketDataError::Validation(
                "Cannot plan chunks: need at least a limit or a time range".to_string(),
            ));
        }

        if start_time.is_some() || end_time.is_some() {
            return self.plan_time_based(
                start_time,
                end_time,
                limit,
                timeframe,
                chunk_limit,
                effective_max_chunks,
            );
        }

        let plans = Self::plan_limit_based(limit, chunk_limit, effective_max_chunks)?;
        self.log_plan(&plans, limit, None);
        Ok(plans)
    }

    fn plan_time_based(
        &self,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
        limit: Option<u32>,
        timeframe: Option<Timeframe>,
        chunk_limit: u32,
        max_chunks: Option<u32>,
    ) -> Result<Vec<ChunkPlan>, MarketDataError> {
        let timeframe = timeframe.ok_or_else(|| {
            MarketDataError::Validation(
                "timeframe is required for time-based chunking".to_string(),
            )
        })?;
        let Some(interval_secs) = timeframe.seconds() else {
            // Calendar months have no fixed window size; window sizing from a
            // synthetic constant would mis-window, so callers must use
            // limit-based requests instead.
            return Err(MarketDataError::Validation(format!(
                "Timeframe {timeframe} has no fixed duration; use a limit-based request"
            )));
        };

        let window = Duration::seconds((interval_secs * u64::from(chunk_limit)) as i64);
        let interval = Duration::seconds(interval_secs as i64);

        let mut plans: Vec<ChunkPlan> = Vec::new();
        let mut current_start = start_time;
        let mut remaining = limit;
        let mut chunk_index: u32 = 0;

        loop {
            if let Some(max) = max_chunks
                && chunk_index >= max
            {
                break;
            }

            let chunk_end = match current_start {
                None => end_time,
                Some(start) => {
                    let natural_end = start + window;
                    Some(end_time.map_or(natural_end, |end| natural_end.min(end)))
                }
            };

            let plan_limit = match remaining {
                Some(0) => break,
                Some(remaining) => chunk_limit.min(remaining),
                None => chunk_limit,
            };

            plans.push(ChunkPlan {
                start_time: current_start,
                end_time: chunk_end,
                limit: plan_limit,
                cursor: None,
                chunk_index,
            });
            chunk_index += 1;

            if let Some(r) = remaining {
                let left = r.saturating_sub(plan_limit);
                if left == 0 {
                    break;
                }
                remaining = Some(left);
            }

            let (Some(_), Some(end)) = (current_start, chunk_end) else {
                break;
            };
            let next_start = end + interval;
            if let Some(end_bound) = end_time
                && next_start >= end_bound
            {
                break;
            }
            current_start = Some(next_start);
        }

        self.log_plan(&plans, limit, Some(window));
        Ok(plans)
    }

    fn plan_limit_based(
        limit: Option<u32>,
        chunk_limit: u32,
        max_chunks: Option<u32>,
    ) -> Result<Vec<ChunkPlan>, MarketDataError> {
        let limit = limit.ok_or_else(|| {
            MarketDataError::Validation("limit is required for limit-based chunking".to_string())
        })?;

        let mut plans = Vec::new();
        let mut remaining = limit;
        let mut chunk_index: u32 = 0;

        while remaining > 0 {
            if let Some(max) = max_chunks
                && chunk_index >= max
            {
                break;
            }
            let plan_limit = chunk_limit.min(remaining);
            plans.push(ChunkPlan {
                start_time: None,
                end_time: None,
                limit: plan_limit,
                cursor: None,
                chunk_index,
            });
            remaining -= plan_limit;
            chunk_index += 1;
        }

        Ok(plans)
    }

    fn log_plan(&self, plans: &[ChunkPlan], total_limit: Option<u32>, window: Option<Duration>) {
        tracing::info!(
            endpoint_id = self.endpoint_id,
            total_chunks = plans.len(),
            total_limit,
            window_secs = window.map(|w| w.num_seconds()),
            "chunk_plan_created"
        );
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn planner() -> ChunkPlanner {
        ChunkPlanner::new("test.ohlcv", ChunkPolicy::new(1000), ChunkHint::default())
    }

    fn at(iso: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(iso)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[rstest]
    fn limit_at_max_points_emits_one_plan(planner: ChunkPlanner) {
        let plans = planner.plan(Some(1000), None, None, None, None).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].limit, 1000);
    }

    #[rstest]
    fn limit_one_past_max_points_emits_two_plans(planner: ChunkPlanner) {
        let plans = planner.plan(Some(1001), None, None, None, None).unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].limit, 1000);
        assert_eq!(plans[1].limit, 1);
    }

    #[rstest]
    fn fast_path_with_single_chunk_cap(planner: ChunkPlanner) {
        let start = at("2024-01-01T00:00:00Z");
        let plans = planner
            .plan(Some(500), Some(start), None, Some(Timeframe::M1), Some(1))
            .unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].start_time, Some(start));
    }

    #[rstest]
    fn time_based_windows_advance_by_one_interval(planner: ChunkPlanner) {
        // 1200 one-minute bars from a fixed start: chunks of 1000 and 200,
        // second window starting one interval past the first window's end.
        let start = at("2024-01-01T00:00:00Z");
        let plans = planner
            .plan(Some(1200), Some(start), None, Some(Timeframe::M1), Some(3))
            .unwrap();

        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].limit, 1000);
        assert_eq!(plans[1].limit, 200);

        let first_end = plans[0].end_time.unwrap();
        assert_eq!(first_end, start + Duration::seconds(60 * 1000));
        assert_eq!(plans[1].start_time.unwrap(), first_end + Duration::seconds(60));
    }

    #[rstest]
    fn time_range_bounded_by_max_chunks() {
        // A 1500-hour range with 300-point chunks caps at 5 windows.
        let planner = ChunkPlanner::new("test.ohlcv", ChunkPolicy::new(300), ChunkHint::default());
        let start = at("2024-01-01T00:00:00Z");
        let end = start + Duration::hours(1500);
        let plans = planner
            .plan(None, Some(start), Some(end), Some(Timeframe::H1), Some(5))
            .unwrap();

        assert_eq!(plans.len(), 5);
        assert!(plans.iter().all(|p| p.limit == 300));
        assert!(plans.last().unwrap().end_time.unwrap() <= end);
    }

    #[rstest]
    fn time_based_requires_timeframe(planner: ChunkPlanner) {
        let start = at("2024-01-01T00:00:00Z");
        let result = planner.plan(Some(2000), Some(start), None, None, None);
        assert!(matches!(result, Err(MarketDataError::Validation(_))));
    }

    #[rstest]
    fn calendar_month_refuses_time_based_chunking(planner: ChunkPlanner) {
        let start = at("2024-01-01T00:00:00Z");
        let result = planner.plan(Some(2000), Some(start), None, Some(Timeframe::Mo1), None);
        assert!(matches!(result, Err(MarketDataError::Validation(_))));

        // Limit-based calendar-month requests remain valid.
        let plans = planner
            .plan(Some(24), None, None, Some(Timeframe::Mo1), None)
            .unwrap();
        assert_eq!(plans.len(), 1);
    }

    #[rstest]
    fn requires_start_time_policy_enforced() {
        let planner = ChunkPlanner::new(
            "test.oi",
            ChunkPolicy::new(500).requiring_start_time(),
            ChunkHint::default(),
        );
        let result = planner.plan(Some(100), None, None, None, None);
        assert!(matches!(result, Err(MarketDataError::Validation(_))));
    }

    #[rstest]
    fn no_limit_no_range_is_rejected(planner: ChunkPlanner) {
        let result = planner.plan(None, None, None, Some(Timeframe::M1), None);
        assert!(matches!(result, Err(MarketDataError::Validation(_))));
    }

    #[rstest]
    fn cursor_hint_emits_single_seed_plan() {
        let planner = ChunkPlanner::new(
            "test.trades",
            ChunkPolicy::new(1000),
            ChunkHint::cursor("last"),
        );
        let plans = planner.plan(Some(5000), None, None, None, None).unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].limit, 1000);
        assert!(plans[0].cursor.is_none());
    }
}
