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

//! Shared MEXC connector constants.

use polyfeed_model::{MarketDataError, Timeframe};

pub const MEXC_SPOT_HTTP_URL: &str = "https://api.mexc.com";
pub const MEXC_CONTRACT_HTTP_URL: &str = "https://contract.mexc.com";

pub const MEXC_MAX_KLINES: u32 = 1000;
pub const MEXC_MAX_TRADES: u32 = 1000;

/// Maps a timeframe to the spot kline interval code.
///
/// # Errors
///
/// Returns [`MarketDataError::InvalidInterval`] for intervals MEXC does not
/// serve.
pub fn interval_str(timeframe: Timeframe) -> Result<&'static str, MarketDataError> {
    match timeframe {
        Timeframe::M1 => Ok("1m"),
        Timeframe::M5 => Ok("5m"),
        Timeframe::M15 => Ok("15m"),
        Timeframe::M30 => Ok("30m"),
        Timeframe::H1 => Ok("60m"),
        Timeframe::H4 => Ok("4h"),
        Timeframe::D1 => Ok("1d"),
        Timeframe::W1 => Ok("1W"),
        Timeframe::Mo1 => Ok("1M"),
        other => Err(MarketDataError::InvalidInterval(format!(
            "MEXC does not serve the {other} interval"
        ))),
    }
}

/// Converts a canonical pair into the contract symbol form (`BTC_USDT`).
///
/// # Errors
///
/// Returns [`MarketDataError::SymbolResolution`] when the pair cannot be
/// split.
pub fn contract_symbol(canonical: &str) -> Result<String, MarketDataError> {
    let (base, quote) = polyfeed_runtime::symbol::split_concatenated(canonical)?;
    Ok(format!("{base}_{quote}"))
}
