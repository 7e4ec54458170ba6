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

//! Universal reference mapping between canonical and venue symbol forms.
//!
//! The canonical form is the concatenated upper-case pair (`BTCUSDT`); venues
//! deviate with separators (`BTC-USDT` on OKX, `BTC-USD` on Coinbase) and
//! asset aliases (`XBT` for `BTC` on Kraken). Mappers must round-trip: for
//! any venue symbol resolved by `to_spec`, `to_venue` reconstructs it
//! exactly.

use std::fmt::Debug;

use polyfeed_model::{MarketDataError, MarketType, MarketVariant};
use ustr::Ustr;

/// Quote assets recognized when splitting concatenated pairs, longest first.
pub const KNOWN_QUOTES: &[&str] = &[
    "USDT", "USDC", "TUSD", "FDUSD", "USD", "EUR", "GBP", "BTC", "ETH", "BNB", "DAI", "TRY", "JPY",
];

/// Well-known venue asset aliases applied during canonicalization.
#[must_use]
pub fn apply_alias(asset: &str) -> &str {
    match asset {
        "XBT" => "BTC",
        "XDG" => "DOGE",
        other => other,
    }
}

/// Canonical decomposition of a venue symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolSpec {
    pub base: Ustr,
    pub quote: Ustr,
    pub variant: MarketVariant,
}

impl SymbolSpec {
    #[must_use]
    pub fn new(base: &str, quote: &str, variant: MarketVariant) -> Self {
        Self {
            base: Ustr::from(&base.to_uppercase()),
            quote: Ustr::from(&quote.to_uppercase()),
            variant,
        }
    }

    /// The canonical concatenated form (`BTCUSDT`).
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

/// Canonical ↔ venue symbol translation for one venue.
pub trait SymbolMapper: Send + Sync + Debug {
    /// Decomposes a venue symbol into its canonical parts.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::SymbolResolution`] when the symbol cannot
    /// be decomposed.
    fn to_spec(
        &self,
        venue_symbol: &str,
        market_type: MarketType,
    ) -> Result<SymbolSpec, MarketDataError>;

    /// Maps a canonical symbol to the venue's native form.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::SymbolResolution`] when the symbol cannot
    /// be mapped.
    fn to_venue(&self, canonical: &str, market_type: MarketType)
    -> Result<String, MarketDataError>;
}

/// Splits a concatenated pair (`BTCUSDT`) on a known quote suffix.
///
/// # Errors
///
/// Returns [`MarketDataError::SymbolResolution`] when no known quote asset
/// matches the suffix.
pub fn split_concatenated(symbol: &str) -> Result<(String, String), MarketDataError> {
    let upper = symbol.to_uppercase();
    for quote in KNOWN_QUOTES {
        if upper.len() > quote.len()
            && let Some(base) = upper.strip_suffix(quote)
        {
            return Ok((base.to_string(), (*quote).to_string()));
        }
    }
    Err(MarketDataError::SymbolResolution(format!(
        "Cannot split '{symbol}' into base/quote on any known quote asset"
    )))
}

/// Mapper for venues whose native form is already the canonical
/// concatenation (Binance, Bybit, MEXC).
#[derive(Copy, Clone, Debug, Default)]
pub struct PassthroughMapper;

impl SymbolMapper for PassthroughMapper {
    fn to_spec(
        &self,
        venue_symbol: &str,
        market_type: MarketType,
    ) -> Result<SymbolSpec, MarketDataError> {
        let (base, quote) = split_concatenated(venue_symbol)?;
        Ok(SymbolSpec::new(
            apply_alias(&base),
            apply_alias(&quote),
            MarketVariant::from_market_type(market_type),
        ))
    }

    fn to_venue(
        &self,
        canonical: &str,
        _market_type: MarketType,
    ) -> Result<String, MarketDataError> {
        Ok(canonical.to_uppercase())
    }
}

/// Mapper for venues using dash-separated pairs (`BTC-USDT` on OKX,
/// `BTC-USD` on Coinbase).
#[derive(Copy, Clone, Debug, Default)]
pub struct DashPairMapper;

impl SymbolMapper for DashPairMapper {
    fn to_spec(
        &self,
        venue_symbol: &str,
        market_type: MarketType,
    ) -> Result<SymbolSpec, MarketDataError> {
        let upper = venue_symbol.to_uppercase();
        let mut parts = upper.split('-');
        match (parts.next(), parts.next()) {
            (Some(base), Some(quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(SymbolSpec::new(
                    apply_alias(base),
                    apply_alias(quote),
                    MarketVariant::from_market_type(market_type),
                ))
            }
            _ => Err(MarketDataError::SymbolResolution(format!(
                "Expected a dash-separated pair, got '{venue_symbol}'"
            ))),
        }
    }

    fn to_venue(
        &self,
        canonical: &str,
        _market_type: MarketType,
    ) -> Result<String, MarketDataError> {
        let upper = canonical.to_uppercase();
        if upper.contains('-') {
            return Ok(upper);
        }
        let (base, quote) = split_concatenated(&upper)?;
        Ok(format!("{base}-{quote}"))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("BTCUSDT", "BTC", "USDT")]
    #[case("ethbtc", "ETH", "BTC")]
    #[case("SOLUSDC", "SOL", "USDC")]
    fn passthrough_round_trip(#[case] symbol: &str, #[case] base: &str, #[case] quote: &str) {
        let mapper = PassthroughMapper;
        let spec = mapper.to_spec(symbol, MarketType::Spot).unwrap();
        assert_eq!(spec.base.as_str(), base);
        assert_eq!(spec.quote.as_str(), quote);

        let venue = mapper.to_venue(&spec.canonical(), MarketType::Spot).unwrap();
        assert_eq!(venue, symbol.to_uppercase());
    }

    #[rstest]
    fn passthrough_rejects_unknown_quote() {
        let mapper = PassthroughMapper;
        assert!(mapper.to_spec("BTCXYZQ", MarketType::Spot).is_err());
    }

    #[rstest]
    #[case("BTC-USDT", "BTC", "USDT")]
    #[case("btc-usd", "BTC", "USD")]
    fn dash_pair_round_trip(#[case] symbol: &str, #[case] base: &str, #[case] quote: &str) {
        let mapper = DashPairMapper;
        let spec = mapper.to_spec(symbol, MarketType::Spot).unwrap();
        assert_eq!(spec.base.as_str(), base);
        assert_eq!(spec.quote.as_str(), quote);

        let venue = mapper.to_venue(&spec.canonical(), MarketType::Spot).unwrap();
        assert_eq!(venue, symbol.to_uppercase());
    }

    #[rstest]
    fn aliases_normalize_kraken_assets() {
        assert_eq!(apply_alias("XBT"), "BTC");
        assert_eq!(apply_alias("XDG"), "DOGE");
        assert_eq!(apply_alias("ETH"), "ETH");
    }
}
