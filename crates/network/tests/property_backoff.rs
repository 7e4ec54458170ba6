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

//! Property-based tests for the reconnect backoff schedule.
//!
//! These verify invariants that must hold for any parameter combination:
//! delays grow monotonically up to the maximum, jitter stays within bounds,
//! and reset restores the initial state.

use std::time::Duration;

use polyfeed_network::backoff::ExponentialBackoff;
use proptest::prelude::*;
use rstest::rstest;

/// Generate valid backoff parameters.
fn backoff_params_strategy() -> impl Strategy<Value = (Duration, Duration, f64, u64, bool)> {
    (
        1u64..=5000u64,   // initial_ms: 1ms to 5s
        10u64..=60000u64, // max_ms: 10ms to 60s
        1.1f64..=10.0f64, // factor: reasonable exponential growth
        0u64..=1000u64,   // jitter_ms: 0 to 1s
        any::<bool>(),    // immediate_first
    )
        .prop_filter("max >= initial", |(initial_ms, max_ms, _, _, _)| {
            max_ms >= initial_ms
        })
        .prop_map(|(initial_ms, max_ms, factor, jitter_ms, immediate_first)| {
            (
                Duration::from_millis(initial_ms),
                Duration::from_millis(max_ms),
                factor,
                jitter_ms,
                immediate_first,
            )
        })
}

proptest! {
    /// Property: delays grow up to the maximum and jitter stays within bounds.
    #[rstest]
    fn backoff_grows_to_max_with_bounded_jitter(
        (initial, max, factor, jitter_ms, immediate_first) in backoff_params_strategy(),
        iterations in 1usize..=30
    ) {
        let mut backoff = ExponentialBackoff::new(initial, max, factor, jitter_ms, immediate_first)
            .expect("Valid backoff parameters");

        let mut last_base_delay = Duration::ZERO;

        for i in 0..iterations {
            let base_before = backoff.current_delay();
            let delay = backoff.next_duration();
            let base_after = backoff.current_delay();

            if immediate_first && i == 0 {
                prop_assert_eq!(delay, Duration::ZERO, "First delay should be zero with immediate_first");
                continue;
            }

            // The returned delay is based on the base before the call, plus jitter.
            prop_assert!(delay >= base_before, "Delay {delay:?} below base {base_before:?}");
            prop_assert!(
                delay <= base_before + Duration::from_millis(jitter_ms),
                "Delay {delay:?} exceeds base {base_before:?} plus jitter {jitter_ms}ms"
            );

            // The base never exceeds the maximum and never shrinks.
            prop_assert!(base_after <= max);
            if last_base_delay > Duration::ZERO {
                prop_assert!(base_after >= last_base_delay, "Base delay shrank");
            }
            last_base_delay = base_after;
        }
    }

    /// Property: sufficient iterations reach the maximum and stay there.
    #[rstest]
    fn backoff_eventually_reaches_maximum(
        (initial, max, factor, jitter_ms, immediate_first) in backoff_params_strategy(),
        excess_iterations in 1usize..=10
    ) {
        prop_assume!(factor > 1.1);
        prop_assume!(max > initial * 2);

        let mut backoff = ExponentialBackoff::new(initial, max, factor, jitter_ms, immediate_first)
            .expect("Valid backoff parameters");

        let growth_ratio = max.as_millis() as f64 / initial.as_millis() as f64;
        let expected_iterations = growth_ratio.log(factor).ceil() as usize + 5;

        for _ in 0..expected_iterations {
            backoff.next_duration();
        }
        prop_assert_eq!(backoff.current_delay(), max);

        for _ in 0..excess_iterations {
            backoff.next_duration();
            prop_assert_eq!(backoff.current_delay(), max);
        }
    }

    /// Property: reset restores the initial delay and immediate-first behavior.
    #[rstest]
    fn backoff_reset_restores_initial_state(
        (initial, max, factor, jitter_ms, immediate_first) in backoff_params_strategy(),
        advance_iterations in 1usize..=10
    ) {
        let mut backoff = ExponentialBackoff::new(initial, max, factor, jitter_ms, immediate_first)
            .expect("Valid backoff parameters");

        for _ in 0..advance_iterations {
            backoff.next_duration();
        }

        backoff.reset();
        prop_assert_eq!(backoff.current_delay(), initial);

        if immediate_first {
            prop_assert_eq!(backoff.next_duration(), Duration::ZERO);
        }
    }

    /// Property: the base progression is deterministic without jitter.
    #[rstest]
    fn backoff_deterministic_without_jitter(
        (initial, max, factor, _jitter_ms, immediate_first) in backoff_params_strategy(),
        iterations in 1usize..=10
    ) {
        let mut a = ExponentialBackoff::new(initial, max, factor, 0, immediate_first)
            .expect("Valid backoff parameters");
        let mut b = ExponentialBackoff::new(initial, max, factor, 0, immediate_first)
            .expect("Valid backoff parameters");

        for _ in 0..iterations {
            prop_assert_eq!(a.next_duration(), b.next_duration());
            prop_assert_eq!(a.current_delay(), b.current_delay());
        }
    }
}

#[rstest]
fn factor_bounds_respected() {
    let initial = Duration::from_millis(100);
    let max = Duration::from_secs(10);

    for factor in [1.0, 1.1, 2.0, 10.0, 50.0, 100.0] {
        assert!(
            ExponentialBackoff::new(initial, max, factor, 0, false).is_ok(),
            "Factor {factor} should be valid"
        );
    }
    for factor in [0.0, 0.5, 0.99, 100.1, 150.0] {
        assert!(
            ExponentialBackoff::new(initial, max, factor, 0, false).is_err(),
            "Factor {factor} should be invalid"
        );
    }
}
