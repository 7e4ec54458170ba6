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

//! Kraken symbol mapping.
//!
//! Spot pairs use `XBT` for Bitcoin (`XBTUSD`); classic result keys prefix
//! assets with `X`/`Z` (`XXBTZUSD`). Futures contracts are
//! `PF_<BASE><QUOTE>` (linear multi-collateral) or `PI_<BASE><QUOTE>`
//! (inverse).

use polyfeed_model::{MarketDataError, MarketType, MarketVariant};
use polyfeed_runtime::symbol::{SymbolMapper, SymbolSpec, apply_alias, split_concatenated};

/// Strips the classic `X`/`Z` asset-class prefix (`XXBT` → `XBT`).
#[must_use]
pub fn strip_asset_prefix(asset: &str) -> &str {
    if asset.len() >= 4 && (asset.starts_with('X') || asset.starts_with('Z')) {
        &asset[1..]
    } else {
        asset
    }
}

/// Reverses the `BTC` → `XBT` alias for building venue pairs.
fn to_venue_asset(asset: &str) -> &str {
    match asset {
        "BTC" => "XBT",
        "DOGE" => "XDG",
        other => other,
    }
}

/// Mapper for Kraken spot pairs and futures contract symbols.
#[derive(Copy, Clone, Debug, Default)]
pub struct KrakenSymbolMapper;

impl SymbolMapper for KrakenSymbolMapper {
    fn to_spec(
        &self,
        venue_symbol: &str,
        market_type: MarketType,
    ) -> Result<SymbolSpec, MarketDataError> {
        let upper = venue_symbol.to_uppercase();

        // Futures contract ids (PF_XBTUSD / PI_XBTUSD).
        if let Some(rest) = upper.strip_prefix("PF_") {
            let (base, quote) = split_concatenated(rest)?;
            return Ok(SymbolSpec::new(
                apply_alias(&base),
                apply_alias(&quote),
                MarketVariant::LinearPerp,
            ));
        }
        if let Some(rest) = upper.strip_prefix("PI_") {
            let (base, quote) = split_concatenated(rest)?;
            return Ok(SymbolSpec::new(
                apply_alias(&base),
                apply_alias(&quote),
                MarketVariant::InversePerp,
            ));
        }

        // Classic result keys (XXBTZUSD) or plain pairs (XBTUSD).
        let (base, quote) = if upper.len() == 8 {
            let (base, quote) = upper.split_at(4);
            (
                strip_asset_prefix(base).to_string(),
                strip_asset_prefix(quote).to_string(),
            )
        } else {
            split_concatenated(&upper).map(|(b, q)| (b, q)).or_else(
                |_| -> Result<(String, String), MarketDataError> {
                    // XBT pairs are not in the generic quote table.
                    let upper_aliased = upper.replace("XBT", "BTC").replace("XDG", "DOGE");
                    split_concatenated(&upper_aliased)
                },
            )?
        };

        Ok(SymbolSpec::new(
            apply_alias(&base),
            apply_alias(&quote),
            MarketVariant::from_market_type(market_type),
        ))
    }

    fn to_venue(
        &self,
        canonical: &str,
        market_type: MarketType,
    ) -> Result<String, MarketDataError> {
        let (base, quote) = split_concatenated(&canonical.to_uppercase())?;
        let base = to_venue_asset(&base);
        let quote = to_venue_asset(&quote);

        match market_type {
            MarketType::Spot => Ok(format!("{base}{quote}")),
            // Linear multi-collateral contracts are the futures default.
            _ => Ok(format!("PF_{base}{quote}")),
        }
    }
}
