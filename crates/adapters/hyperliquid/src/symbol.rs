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

//! Hyperliquid symbol mapping: perpetuals are bare coin names (`BTC`),
//! quoted in USD(C).

use polyfeed_model::{MarketDataError, MarketType, MarketVariant};
use polyfeed_runtime::symbol::{SymbolMapper, SymbolSpec, split_concatenated};

/// Mapper between canonical pairs and Hyperliquid coin names.
#[derive(Copy, Clone, Debug, Default)]
pub struct HyperliquidSymbolMapper;

impl SymbolMapper for HyperliquidSymbolMapper {
    fn to_spec(
        &self,
        venue_symbol: &str,
        _market_type: MarketType,
    ) -> Result<SymbolSpec, MarketDataError> {
        let coin = venue_symbol.to_uppercase();
        if coin.is_empty() {
            return Err(MarketDataError::SymbolResolution(
                "Empty Hyperliquid coin name".to_string(),
            ));
        }
        Ok(SymbolSpec::new(&coin, "USD", MarketVariant::LinearPerp))
    }

    fn to_venue(
        &self,
        canonical: &str,
        _market_type: MarketType,
    ) -> Result<String, MarketDataError> {
        let upper = canonical.to_uppercase();
        // Accept both bare coins ("BTC") and canonical pairs ("BTCUSD").
        match split_concatenated(&upper) {
            Ok((base, _quote)) => Ok(base),
            Err(_) => Ok(upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_and_bare_coins_map_to_coin_names() {
        let mapper = HyperliquidSymbolMapper;
        assert_eq!(mapper.to_venue("BTCUSD", MarketType::Futures).unwrap(), "BTC");
        assert_eq!(mapper.to_venue("eth", MarketType::Futures).unwrap(), "ETH");
    }

    #[test]
    fn round_trip_is_identity() {
        let mapper = HyperliquidSymbolMapper;
        let spec = mapper.to_spec("BTC", MarketType::Futures).unwrap();
        assert_eq!(spec.canonical(), "BTCUSD");
        assert_eq!(
            mapper.to_venue(&spec.canonical(), MarketType::Futures).unwrap(),
            "BTC"
        );
    }
}
