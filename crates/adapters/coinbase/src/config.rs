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

//! Shared Coinbase Exchange connector constants.

use polyfeed_model::{MarketDataError, Timeframe};

pub const COINBASE_HTTP_URL: &str = "https://api.exchange.coinbase.com";
pub const COINBASE_WS_URL: &str = "wss://ws-feed.exchange.coinbase.com";

pub const COINBASE_MAX_CANDLES: u32 = 300;
pub const COINBASE_MAX_TRADES: u32 = 1000;
pub const COINBASE_MAX_PRODUCTS_PER_CONNECTION: usize = 50;

/// Maps a timeframe to the candle granularity in seconds.
///
/// # Errors
///
/// Returns [`MarketDataError::InvalidInterval`] for granularities Coinbase
/// does not serve (only 1m, 5m, 15m, 1h, 6h and 1d exist).
pub fn granularity_secs(timeframe: Timeframe) -> Result<u64, MarketDataError> {
    match timeframe {
        Timeframe::M1 => Ok(60),
        Timeframe::M5 => Ok(300),
        Timeframe::M15 => Ok(900),
        Timeframe::H1 => Ok(3_600),
        Timeframe::H6 => Ok(21_600),
        Timeframe::D1 => Ok(86_400),
        other => Err(MarketDataError::InvalidInterval(format!(
            "Coinbase does not serve the {other} granularity"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exchange_granularities_are_accepted() {
        assert_eq!(granularity_secs(Timeframe::M1).unwrap(), 60);
        assert_eq!(granularity_secs(Timeframe::D1).unwrap(), 86_400);
        assert!(granularity_secs(Timeframe::M3).is_err());
        assert!(granularity_secs(Timeframe::W1).is_err());
    }
}
