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

//! Enumerations shared across venues, transports and the request pipeline.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Supported cryptocurrency venues.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Exchange {
    Binance,
    Bybit,
    Okx,
    Coinbase,
    Kraken,
    Mexc,
    Hyperliquid,
}

/// Top-level asset class of a market.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Default,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum MarketType {
    #[default]
    Spot,
    Futures,
    Options,
}

/// Refinement of [`MarketType`] used to pick venue categories and URLs.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MarketVariant {
    Spot,
    LinearPerp,
    InversePerp,
    DeliveryLinear,
    DeliveryInverse,
}

impl MarketVariant {
    /// Derives the default variant for a market type (futures default to
    /// linear perpetuals).
    #[must_use]
    pub const fn from_market_type(market_type: MarketType) -> Self {
        match market_type {
            MarketType::Spot => Self::Spot,
            MarketType::Futures | MarketType::Options => Self::LinearPerp,
        }
    }

    /// Returns `true` for perpetual or delivery contract variants.
    #[must_use]
    pub const fn is_derivative(self) -> bool {
        !matches!(self, Self::Spot)
    }
}

/// Instrument classification used by capability lookups.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Default,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum InstrumentType {
    #[default]
    Spot,
    Perpetual,
    Delivery,
    Option,
}

impl InstrumentType {
    /// Derives the default instrument type for a market type.
    #[must_use]
    pub const fn from_market_type(market_type: MarketType) -> Self {
        match market_type {
            MarketType::Spot => Self::Spot,
            MarketType::Futures => Self::Perpetual,
            MarketType::Options => Self::Option,
        }
    }
}

/// Transport mechanism for a data request.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Default,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransportKind {
    #[default]
    Rest,
    Ws,
}

/// Data capabilities exposed through the unified API.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DataFeature {
    Health,
    Ohlcv,
    Trades,
    HistoricalTrades,
    OrderBook,
    SymbolMetadata,
    OpenInterest,
    FundingRate,
    MarkPrice,
    Liquidations,
}

/// Side of an order or trade.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    Buy,
    Sell,
}

/// Discrete bar interval.
///
/// Every timeframe except [`Timeframe::Mo1`] carries a fixed second count;
/// calendar months have no fixed length and report `None` from
/// [`Timeframe::seconds`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "8h")]
    H8,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "3d")]
    D3,
    #[serde(rename = "1w")]
    W1,
    #[serde(rename = "1M")]
    Mo1,
}

impl Timeframe {
    /// All timeframes in ascending interval order.
    pub const ALL: [Self; 15] = [
        Self::M1,
        Self::M3,
        Self::M5,
        Self::M15,
        Self::M30,
        Self::H1,
        Self::H2,
        Self::H4,
        Self::H6,
        Self::H8,
        Self::H12,
        Self::D1,
        Self::D3,
        Self::W1,
        Self::Mo1,
    ];

    /// Returns the canonical interval code (e.g. `"1m"`, `"4h"`, `"1M"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::M3 => "3m",
            Self::M5 => "5m",
            Self::M15 => "15m",
            Self::M30 => "30m",
            Self::H1 => "1h",
            Self::H2 => "2h",
            Self::H4 => "4h",
            Self::H6 => "6h",
            Self::H8 => "8h",
            Self::H12 => "12h",
            Self::D1 => "1d",
            Self::D3 => "3d",
            Self::W1 => "1w",
            Self::Mo1 => "1M",
        }
    }

    /// Returns the interval length in seconds, or `None` for calendar months.
    #[must_use]
    pub const fn seconds(self) -> Option<u64> {
        match self {
            Self::M1 => Some(60),
            Self::M3 => Some(180),
            Self::M5 => Some(300),
            Self::M15 => Some(900),
            Self::M30 => Some(1_800),
            Self::H1 => Some(3_600),
            Self::H2 => Some(7_200),
            Self::H4 => Some(14_400),
            Self::H6 => Some(21_600),
            Self::H8 => Some(28_800),
            Self::H12 => Some(43_200),
            Self::D1 => Some(86_400),
            Self::D3 => Some(259_200),
            Self::W1 => Some(604_800),
            Self::Mo1 => None,
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Timeframe {
    type Err = crate::errors::MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| {
                crate::errors::MarketDataError::InvalidInterval(format!(
                    "Unrecognized timeframe code '{s}'"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Timeframe::M1, "1m", Some(60))]
    #[case(Timeframe::H4, "4h", Some(14_400))]
    #[case(Timeframe::D1, "1d", Some(86_400))]
    #[case(Timeframe::W1, "1w", Some(604_800))]
    #[case(Timeframe::Mo1, "1M", None)]
    fn timeframe_codes_and_seconds(
        #[case] tf: Timeframe,
        #[case] code: &str,
        #[case] seconds: Option<u64>,
    ) {
        assert_eq!(tf.as_str(), code);
        assert_eq!(tf.seconds(), seconds);
        assert_eq!(code.parse::<Timeframe>().unwrap(), tf);
    }

    #[rstest]
    fn timeframe_rejects_unknown_code() {
        assert!("7m".parse::<Timeframe>().is_err());
        // Case matters: "1M" is a calendar month, "1m" is one minute.
        assert_eq!("1M".parse::<Timeframe>().unwrap(), Timeframe::Mo1);
    }

    #[rstest]
    fn market_variant_defaults() {
        assert_eq!(
            MarketVariant::from_market_type(MarketType::Futures),
            MarketVariant::LinearPerp
        );
        assert_eq!(
            MarketVariant::from_market_type(MarketType::Spot),
            MarketVariant::Spot
        );
    }

    #[rstest]
    fn exchange_parses_case_insensitively() {
        assert_eq!("Binance".parse::<Exchange>().unwrap(), Exchange::Binance);
        assert_eq!("OKX".parse::<Exchange>().unwrap(), Exchange::Okx);
    }
}
