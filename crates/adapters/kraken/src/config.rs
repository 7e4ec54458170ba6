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

//! Shared Kraken connector constants.

use polyfeed_model::{MarketDataError, MarketVariant, Timeframe};

pub const KRAKEN_SPOT_HTTP_URL: &str = "https://api.kraken.com";
pub const KRAKEN_FUTURES_HTTP_URL: &str = "https://futures.kraken.com/derivatives";

/// The spot OHLC endpoint serves at most 720 bars per call.
pub const KRAKEN_MAX_OHLC_BARS: u32 = 720;
pub const KRAKEN_MAX_TRADES: u32 = 1000;
pub const KRAKEN_MAX_BOOK_DEPTH: u32 = 500;

/// Futures chart history path per contract variant. The endpoint name varies
/// across variants, so it is a constant here rather than a guessed path; only
/// the spot OHLC endpoint is wired into fetches.
#[must_use]
pub const fn futures_chart_path(variant: MarketVariant) -> &'static str {
    match variant {
        MarketVariant::InversePerp => "/api/charts/v1/trade",
        _ => "/api/charts/v1/analytics",
    }
}

/// Maps a timeframe to the OHLC `interval` parameter (minutes).
///
/// # Errors
///
/// Returns [`MarketDataError::InvalidInterval`] for intervals the spot OHLC
/// endpoint does not serve.
pub fn interval_minutes(timeframe: Timeframe) -> Result<u32, MarketDataError> {
    match timeframe {
        Timeframe::M1 => Ok(1),
        Timeframe::M5 => Ok(5),
        Timeframe::M15 => Ok(15),
        Timeframe::M30 => Ok(30),
        Timeframe::H1 => Ok(60),
        Timeframe::H4 => Ok(240),
        Timeframe::D1 => Ok(1_440),
        Timeframe::W1 => Ok(10_080),
        other => Err(MarketDataError::InvalidInterval(format!(
            "Kraken does not serve the {other} interval"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_ohlc_intervals_are_minutes() {
        assert_eq!(interval_minutes(Timeframe::M1).unwrap(), 1);
        assert_eq!(interval_minutes(Timeframe::D1).unwrap(), 1_440);
        assert!(interval_minutes(Timeframe::H8).is_err());
        assert!(interval_minutes(Timeframe::Mo1).is_err());
    }
}
