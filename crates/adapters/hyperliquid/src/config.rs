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

//! Shared Hyperliquid connector constants.

use polyfeed_model::{MarketDataError, Timeframe};

pub const HYPERLIQUID_HTTP_URL: &str = "https://api.hyperliquid.xyz";
pub const HYPERLIQUID_WS_URL: &str = "wss://api.hyperliquid.xyz/ws";

pub const HYPERLIQUID_MAX_CANDLES: u32 = 5000;
pub const HYPERLIQUID_MAX_FUNDING_RATES: u32 = 500;
pub const HYPERLIQUID_MAX_STREAMS_PER_CONNECTION: usize = 50;

/// Maps a timeframe to the candle interval code.
///
/// # Errors
///
/// Returns [`MarketDataError::InvalidInterval`] for intervals Hyperliquid
/// does not serve (`6h`).
pub fn interval_str(timeframe: Timeframe) -> Result<&'static str, MarketDataError> {
    match timeframe {
        Timeframe::H6 => Err(MarketDataError::InvalidInterval(
            "Hyperliquid does not serve the 6h interval".to_string(),
        )),
        other => Ok(other.as_str()),
    }
}
