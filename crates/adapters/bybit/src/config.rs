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

//! Shared Bybit connector constants: URLs, category and interval mappings.

use polyfeed_model::{MarketDataError, MarketVariant, Timeframe};

pub const BYBIT_HTTP_URL: &str = "https://api.bybit.com";
pub const BYBIT_WS_SPOT_URL: &str = "wss://stream.bybit.com/v5/public/spot";
pub const BYBIT_WS_LINEAR_URL: &str = "wss://stream.bybit.com/v5/public/linear";
pub const BYBIT_WS_INVERSE_URL: &str = "wss://stream.bybit.com/v5/public/inverse";

/// Topic cap per public connection.
pub const BYBIT_MAX_TOPICS_PER_CONNECTION: usize = 50;
/// Args cap per subscription request frame.
pub const BYBIT_MAX_ARGS_PER_SUBSCRIPTION_REQUEST: usize = 10;
/// Application heartbeat expected by Bybit public streams.
pub const BYBIT_HEARTBEAT_SECS: u64 = 20;
pub const BYBIT_PING_MESSAGE: &str = r#"{"op":"ping"}"#;

/// Per-request point caps.
pub const BYBIT_MAX_KLINES: u32 = 1000;
pub const BYBIT_MAX_TRADES: u32 = 1000;
pub const BYBIT_MAX_OPEN_INTEREST: u32 = 200;
pub const BYBIT_MAX_FUNDING_RATES: u32 = 200;

/// Maps a market variant to the v5 `category` parameter.
///
/// # Errors
///
/// Returns [`MarketDataError::Validation`] for delivery variants, which the
/// connector does not cover.
pub fn category(variant: MarketVariant) -> Result<&'static str, MarketDataError> {
    match variant {
        MarketVariant::Spot => Ok("spot"),
        MarketVariant::LinearPerp => Ok("linear"),
        MarketVariant::InversePerp => Ok("inverse"),
        MarketVariant::DeliveryLinear | MarketVariant::DeliveryInverse => Err(
            MarketDataError::Validation(format!("Unsupported Bybit market variant: {variant}")),
        ),
    }
}

/// Returns the public stream URL for the market variant.
///
/// # Errors
///
/// Returns [`MarketDataError::Validation`] for delivery variants.
pub fn ws_url(variant: MarketVariant) -> Result<&'static str, MarketDataError> {
    match variant {
        MarketVariant::Spot => Ok(BYBIT_WS_SPOT_URL),
        MarketVariant::LinearPerp => Ok(BYBIT_WS_LINEAR_URL),
        MarketVariant::InversePerp => Ok(BYBIT_WS_INVERSE_URL),
        MarketVariant::DeliveryLinear | MarketVariant::DeliveryInverse => Err(
            MarketDataError::Validation(format!("Unsupported Bybit market variant: {variant}")),
        ),
    }
}

/// Maps a timeframe to Bybit's interval code (minutes, or `D`/`W`/`M`).
///
/// # Errors
///
/// Returns [`MarketDataError::InvalidInterval`] for intervals Bybit does not
/// serve (`8h`, `3d`).
pub fn interval_str(timeframe: Timeframe) -> Result<&'static str, MarketDataError> {
    match timeframe {
        Timeframe::M1 => Ok("1"),
        Timeframe::M3 => Ok("3"),
        Timeframe::M5 => Ok("5"),
        Timeframe::M15 => Ok("15"),
        Timeframe::M30 => Ok("30"),
        Timeframe::H1 => Ok("60"),
        Timeframe::H2 => Ok("120"),
        Timeframe::H4 => Ok("240"),
        Timeframe::H6 => Ok("360"),
        Timeframe::H12 => Ok("720"),
        Timeframe::D1 => Ok("D"),
        Timeframe::W1 => Ok("W"),
        Timeframe::Mo1 => Ok("M"),
        Timeframe::H8 | Timeframe::D3 => Err(MarketDataError::InvalidInterval(format!(
            "Bybit does not serve the {timeframe} interval"
        ))),
    }
}

/// Maps a sampling period to Bybit's `intervalTime` values.
///
/// # Errors
///
/// Returns [`MarketDataError::Validation`] for unsupported periods.
pub fn oi_interval_time(period: &str) -> Result<&'static str, MarketDataError> {
    match period {
        "5m" => Ok("5min"),
        "15m" => Ok("15min"),
        "30m" => Ok("30min"),
        "1h" => Ok("1h"),
        "4h" => Ok("4h"),
        "1d" => Ok("1d"),
        other => Err(MarketDataError::Validation(format!(
            "Unsupported Bybit open-interest period '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn categories_cover_tradable_variants() {
        assert_eq!(category(MarketVariant::Spot).unwrap(), "spot");
        assert_eq!(category(MarketVariant::LinearPerp).unwrap(), "linear");
        assert_eq!(category(MarketVariant::InversePerp).unwrap(), "inverse");
        assert!(category(MarketVariant::DeliveryLinear).is_err());
    }

    #[rstest]
    fn unsupported_intervals_are_rejected() {
        assert_eq!(interval_str(Timeframe::H1).unwrap(), "60");
        assert_eq!(interval_str(Timeframe::Mo1).unwrap(), "M");
        assert!(interval_str(Timeframe::H8).is_err());
        assert!(interval_str(Timeframe::D3).is_err());
    }
}
