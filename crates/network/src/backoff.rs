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

//! Exponential backoff with bounded jitter for reconnection scheduling.

use std::time::Duration;

use rand::RngExt;

/// Maximum multiplicative growth factor accepted by [`ExponentialBackoff::new`].
pub const MAX_BACKOFF_FACTOR: f64 = 100.0;

/// Produces a sequence of delays growing exponentially from an initial value
/// up to a maximum, with uniform jitter in `[0, jitter_ms]` added to each
/// returned delay.
///
/// When `immediate_first` is set the first call to
/// [`ExponentialBackoff::next_duration`] returns [`Duration::ZERO`] so a
/// freshly dropped connection is retried immediately before delays kick in.
#[derive(Clone, Debug)]
pub struct ExponentialBackoff {
    initial: Duration,
    max: Duration,
    factor: f64,
    jitter_ms: u64,
    immediate_first: bool,
    current: Duration,
    first_call: bool,
}

impl ExponentialBackoff {
    /// Creates a new backoff schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if `factor` is outside `[1.0, 100.0]`, if `initial`
    /// is zero, or if `initial` exceeds `max`.
    pub fn new(
        initial: Duration,
        max: Duration,
        factor: f64,
        jitter_ms: u64,
        immediate_first: bool,
    ) -> Result<Self, &'static str> {
        if !(1.0..=MAX_BACKOFF_FACTOR).contains(&factor) {
            return Err("backoff factor must be within [1.0, 100.0]");
        }
        if initial.is_zero() {
            return Err("initial delay must be positive");
        }
        if initial > max {
            return Err("initial delay must not exceed max delay");
        }
        Ok(Self {
            initial,
            max,
            factor,
            jitter_ms,
            immediate_first,
            current: initial,
            first_call: immediate_first,
        })
    }

    /// Returns the next delay to sleep and advances the schedule.
    pub fn next_duration(&mut self) -> Duration {
        if self.first_call {
            self.first_call = false;
            return Duration::ZERO;
        }

        let jitter_ms = if self.jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=self.jitter_ms)
        };
        let delay = self.current + Duration::from_millis(jitter_ms);

        self.current = self.current.mul_f64(self.factor).min(self.max);

        delay
    }

    /// Returns the current base delay (without jitter).
    #[must_use]
    pub const fn current_delay(&self) -> Duration {
        self.current
    }

    /// Restores the schedule to its initial state, used after a successful
    /// connection.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.first_call = self.immediate_first;
    }
}
