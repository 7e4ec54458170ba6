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

//! Shared OKX connector constants: URLs, instrument types and bar codes.

use polyfeed_model::{MarketDataError, MarketVariant, Timeframe};

pub const OKX_HTTP_URL: &str = "https://www.okx.com";
/// Public channel endpoint (trades, books, tickers).
pub const OKX_WS_PUBLIC_URL: &str = "wss://ws.okx.com:8443/ws/v5/public";
/// Business channel endpoint (candle streams live here on v5).
pub const OKX_WS_BUSINESS_URL: &str = "wss://ws.okx.com:8443/ws/v5/business";

pub const OKX_MAX_CANDLES: u32 = 300;
pub const OKX_MAX_TRADES: u32 = 500;
pub const OKX_MAX_FUNDING_RATES: u32 = 100;
pub const OKX_MAX_BOOK_DEPTH: u32 = 400;

/// Topic cap per connection.
pub const OKX_MAX_STREAMS_PER_CONNECTION: usize = 50;
/// OKX drops idle sockets after 30 seconds without traffic.
pub const OKX_HEARTBEAT_SECS: u64 = 20;
pub const OKX_PING_MESSAGE: &str = "ping";

/// Maps a market variant to the v5 `instType` parameter.
#[must_use]
pub fn inst_type(variant: MarketVariant) -> &'static str {
    match variant {
        MarketVariant::Spot => "SPOT",
        MarketVariant::LinearPerp | MarketVariant::InversePerp => "SWAP",
        MarketVariant::DeliveryLinear | MarketVariant::DeliveryInverse => "FUTURES",
    }
}

/// Maps a timeframe to OKX's bar code (minutes lower-case, hours and above
/// upper-case).
///
/// # Errors
///
/// Returns [`MarketDataError::InvalidInterval`] for intervals OKX does not
/// serve (`8h`).
pub fn bar_str(timeframe: Timeframe) -> Result<&'static str, MarketDataError> {
    match timeframe {
        Timeframe::M1 => Ok("1m"),
        Timeframe::M3 => Ok("3m"),
        Timeframe::M5 => Ok("5m"),
        Timeframe::M15 => Ok("15m"),
        Timeframe::M30 => Ok("30m"),
        Timeframe::H1 => Ok("1H"),
        Timeframe::H2 => Ok("2H"),
        Timeframe::H4 => Ok("4H"),
        Timeframe::H6 => Ok("6H"),
        Timeframe::H12 => Ok("12H"),
        Timeframe::D1 => Ok("1D"),
        Timeframe::D3 => Ok("3D"),
        Timeframe::W1 => Ok("1W"),
        Timeframe::Mo1 => Ok("1M"),
        Timeframe::H8 => Err(MarketDataError::InvalidInterval(
            "OKX does not serve the 8h interval".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_codes_follow_okx_case_convention() {
        assert_eq!(bar_str(Timeframe::M1).unwrap(), "1m");
        assert_eq!(bar_str(Timeframe::H1).unwrap(), "1H");
        assert_eq!(bar_str(Timeframe::Mo1).unwrap(), "1M");
        assert!(bar_str(Timeframe::H8).is_err());
    }

    #[test]
    fn inst_types_cover_variants() {
        assert_eq!(inst_type(MarketVariant::Spot), "SPOT");
        assert_eq!(inst_type(MarketVariant::LinearPerp), "SWAP");
        assert_eq!(inst_type(MarketVariant::DeliveryLinear), "FUTURES");
    }
}
