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

//! OKX symbol mapping: `BTCUSDT` ↔ `BTC-USDT` (spot) / `BTC-USDT-SWAP`
//! (perpetuals).

use polyfeed_model::{MarketDataError, MarketType, MarketVariant};
use polyfeed_runtime::symbol::{SymbolMapper, SymbolSpec, split_concatenated};

/// Mapper for OKX dash-separated instrument ids.
#[derive(Copy, Clone, Debug, Default)]
pub struct OkxSymbolMapper;

impl SymbolMapper for OkxSymbolMapper {
    fn to_spec(
        &self,
        venue_symbol: &str,
        market_type: MarketType,
    ) -> Result<SymbolSpec, MarketDataError> {
        let upper = venue_symbol.to_uppercase();
        let mut parts = upper.split('-');
        let (Some(base), Some(quote)) = (parts.next(), parts.next()) else {
            return Err(MarketDataError::SymbolResolution(format!(
                "Expected a dash-separated OKX instrument id, got '{venue_symbol}'"
            )));
        };
        if base.is_empty() || quote.is_empty() {
            return Err(MarketDataError::SymbolResolution(format!(
                "Malformed OKX instrument id '{venue_symbol}'"
            )));
        }

        let variant = match parts.next() {
            Some("SWAP") if quote == "USD" => MarketVariant::InversePerp,
            Some("SWAP") => MarketVariant::LinearPerp,
            Some(_) if quote == "USD" => MarketVariant::DeliveryInverse,
            Some(_) => MarketVariant::DeliveryLinear,
            None => MarketVariant::from_market_type(market_type),
        };
        Ok(SymbolSpec::new(base, quote, variant))
    }

    fn to_venue(
        &self,
        canonical: &str,
        market_type: MarketType,
    ) -> Result<String, MarketDataError> {
        let upper = canonical.to_uppercase();
        let pair = if upper.contains('-') {
            upper
        } else {
            let (base, quote) = split_concatenated(&upper)?;
            format!("{base}-{quote}")
        };

        // Perpetual instruments carry the SWAP suffix.
        if market_type == MarketType::Futures && !pair.ends_with("-SWAP") {
            return Ok(format!("{pair}-SWAP"));
        }
        Ok(pair)
    }
}
