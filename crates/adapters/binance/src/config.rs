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

//! Shared Binance connector constants: URLs, interval mapping and weights.

use polyfeed_model::{MarketDataError, MarketVariant, Timeframe};

pub const BINANCE_SPOT_HTTP_URL: &str = "https://api.binance.com";
pub const BINANCE_FUTURES_HTTP_URL: &str = "https://fapi.binance.com";
pub const BINANCE_SPOT_WS_URL: &str = "wss://stream.binance.com:9443";
pub const BINANCE_FUTURES_WS_URL: &str = "wss://fstream.binance.com";

/// Combined-stream topic cap per connection.
pub const BINANCE_MAX_STREAMS_PER_CONNECTION: usize = 200;

/// Per-request point caps.
pub const BINANCE_MAX_KLINES: u32 = 1000;
pub const BINANCE_MAX_TRADES: u32 = 1000;
pub const BINANCE_MAX_FUNDING_RATES: u32 = 1000;
pub const BINANCE_MAX_OPEN_INTEREST_HIST: u32 = 500;

/// Returns the REST base URL for the market variant.
#[must_use]
pub fn http_base(variant: MarketVariant) -> &'static str {
    match variant {
        MarketVariant::Spot => BINANCE_SPOT_HTTP_URL,
        _ => BINANCE_FUTURES_HTTP_URL,
    }
}

/// Returns the WebSocket base URL for the market variant.
#[must_use]
pub fn ws_base(variant: MarketVariant) -> &'static str {
    match variant {
        MarketVariant::Spot => BINANCE_SPOT_WS_URL,
        _ => BINANCE_FUTURES_WS_URL,
    }
}

/// Maps a timeframe to Binance's interval code.
///
/// Binance uses the canonical codes directly (`1m` … `1M`).
///
/// # Errors
///
/// Currently infallible; kept fallible for parity with venues that support a
/// subset of intervals.
pub fn interval_str(timeframe: Timeframe) -> Result<&'static str, MarketDataError> {
    Ok(timeframe.as_str())
}

/// Request weight of a kline call by its limit, per the Binance fee table.
#[must_use]
pub const fn kline_weight(limit: u32) -> u32 {
    match limit {
        0..=100 => 1,
        101..=500 => 2,
        501..=1000 => 5,
        _ => 10,
    }
}
