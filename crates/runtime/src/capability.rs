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

//! Static capability registry.
//!
//! The registry answers whether a `(venue, feature, transport, market)`
//! combination is supported before any connection is opened. Unknown keys are
//! unsupported by default; providers may override individual answers through
//! their dynamic `describe_capability` hook.

use std::{collections::HashMap, sync::LazyLock};

use polyfeed_model::{DataFeature, Exchange, InstrumentType, MarketType, TransportKind};

use DataFeature::*;

/// Lookup key into the capability table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CapabilityKey {
    pub exchange: Exchange,
    pub feature: DataFeature,
    pub transport: TransportKind,
    pub market_type: MarketType,
    pub instrument_type: InstrumentType,
}

/// Origin of a capability answer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CapabilitySource {
    /// From the static table.
    Static,
    /// From a provider's `describe_capability` hook.
    Dynamic,
}

/// Support record for one capability key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityStatus {
    pub supported: bool,
    pub reason: String,
    pub source: CapabilitySource,
}

impl CapabilityStatus {
    /// A statically supported capability.
    #[must_use]
    pub fn supported() -> Self {
        Self {
            supported: true,
            reason: "supported".to_string(),
            source: CapabilitySource::Static,
        }
    }

    /// An unsupported capability with the given reason.
    #[must_use]
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            supported: false,
            reason: reason.into(),
            source: CapabilitySource::Static,
        }
    }
}

/// Queries the static table; unknown keys report `supported = false`.
#[must_use]
pub fn supports(key: &CapabilityKey) -> CapabilityStatus {
    REGISTRY
        .get(key)
        .cloned()
        .unwrap_or_else(|| CapabilityStatus::unsupported("unsupported"))
}

/// Convenience lookup without building a key by hand.
#[must_use]
pub fn lookup(
    exchange: Exchange,
    feature: DataFeature,
    transport: TransportKind,
    market_type: MarketType,
    instrument_type: InstrumentType,
) -> CapabilityStatus {
    supports(&CapabilityKey {
        exchange,
        feature,
        transport,
        market_type,
        instrument_type,
    })
}

static REGISTRY: LazyLock<HashMap<CapabilityKey, CapabilityStatus>> = LazyLock::new(build_registry);

fn grant(
    map: &mut HashMap<CapabilityKey, CapabilityStatus>,
    exchange: Exchange,
    transport: TransportKind,
    market_type: MarketType,
    features: &[DataFeature],
) {
    let instrument_type = InstrumentType::from_market_type(market_type);
    for &feature in features {
        map.insert(
            CapabilityKey {
                exchange,
                feature,
                transport,
                market_type,
                instrument_type,
            },
            CapabilityStatus::supported(),
        );
    }
}

#[allow(clippy::too_many_lines)]
fn build_registry() -> HashMap<CapabilityKey, CapabilityStatus> {
    use Exchange::*;
    use MarketType::{Futures, Spot};
    use TransportKind::{Rest, Ws};

    let mut map = HashMap::new();

    // Binance
    grant(
        &mut map,
        Binance,
        Rest,
        Spot,
        &[Health, Ohlcv, Trades, HistoricalTrades, OrderBook, SymbolMetadata],
    );
    grant(
        &mut map,
        Binance,
        Rest,
        Futures,
        &[
            Health,
            Ohlcv,
            Trades,
            HistoricalTrades,
            OrderBook,
            SymbolMetadata,
            OpenInterest,
            FundingRate,
            MarkPrice,
        ],
    );
    grant(&mut map, Binance, Ws, Spot, &[Ohlcv, Trades, OrderBook]);
    grant(
        &mut map,
        Binance,
        Ws,
        Futures,
        &[Ohlcv, Trades, OrderBook, MarkPrice, Liquidations],
    );

    // Bybit
    grant(
        &mut map,
        Bybit,
        Rest,
        Spot,
        &[Health, Ohlcv, Trades, OrderBook, SymbolMetadata],
    );
    grant(
        &mut map,
        Bybit,
        Rest,
        Futures,
        &[
            Health,
            Ohlcv,
            Trades,
            OrderBook,
            SymbolMetadata,
            OpenInterest,
            FundingRate,
        ],
    );
    grant(&mut map, Bybit, Ws, Spot, &[Ohlcv, Trades, OrderBook]);
    grant(
        &mut map,
        Bybit,
        Ws,
        Futures,
        &[
            Ohlcv,
            Trades,
            OrderBook,
            OpenInterest,
            FundingRate,
            MarkPrice,
            Liquidations,
        ],
    );

    // OKX
    grant(
        &mut map,
        Okx,
        Rest,
        Spot,
        &[Health, Ohlcv, Trades, OrderBook, SymbolMetadata],
    );
    grant(
        &mut map,
        Okx,
        Rest,
        Futures,
        &[
            Health,
            Ohlcv,
            Trades,
            OrderBook,
            SymbolMetadata,
            OpenInterest,
            FundingRate,
        ],
    );
    grant(&mut map, Okx, Ws, Spot, &[Ohlcv, Trades]);
    grant(&mut map, Okx, Ws, Futures, &[Ohlcv, Trades]);

    // Coinbase Exchange is spot-only.
    grant(
        &mut map,
        Coinbase,
        Rest,
        Spot,
        &[Health, Ohlcv, Trades, OrderBook, SymbolMetadata],
    );
    grant(&mut map, Coinbase, Ws, Spot, &[Trades]);

    // Kraken
    grant(
        &mut map,
        Kraken,
        Rest,
        Spot,
        &[Health, Ohlcv, Trades, HistoricalTrades, OrderBook, SymbolMetadata],
    );
    grant(
        &mut map,
        Kraken,
        Rest,
        Futures,
        &[Health, OpenInterest, FundingRate],
    );

    // MEXC (REST only)
    grant(
        &mut map,
        Mexc,
        Rest,
        Spot,
        &[Health, Ohlcv, Trades, SymbolMetadata],
    );
    grant(&mut map, Mexc, Rest, Futures, &[OpenInterest]);

    // Hyperliquid (perpetuals-native info API)
    grant(
        &mut map,
        Hyperliquid,
        Rest,
        Futures,
        &[Health, Ohlcv, OrderBook, SymbolMetadata, FundingRate, MarkPrice],
    );
    grant(&mut map, Hyperliquid, Ws, Futures, &[Ohlcv, Trades]);

    map
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn unknown_keys_default_to_unsupported() {
        let status = lookup(
            Exchange::Coinbase,
            DataFeature::FundingRate,
            TransportKind::Rest,
            MarketType::Futures,
            InstrumentType::Perpetual,
        );
        assert!(!status.supported);
        assert_eq!(status.reason, "unsupported");
        assert_eq!(status.source, CapabilitySource::Static);
    }

    #[rstest]
    #[case(Exchange::Binance, DataFeature::Ohlcv, TransportKind::Rest, MarketType::Spot, true)]
    #[case(Exchange::Binance, DataFeature::Liquidations, TransportKind::Ws, MarketType::Futures, true)]
    #[case(Exchange::Binance, DataFeature::Liquidations, TransportKind::Ws, MarketType::Spot, false)]
    #[case(Exchange::Mexc, DataFeature::Ohlcv, TransportKind::Ws, MarketType::Spot, false)]
    #[case(Exchange::Kraken, DataFeature::OpenInterest, TransportKind::Rest, MarketType::Futures, true)]
    #[case(Exchange::Hyperliquid, DataFeature::Ohlcv, TransportKind::Rest, MarketType::Futures, true)]
    fn static_table_answers(
        #[case] exchange: Exchange,
        #[case] feature: DataFeature,
        #[case] transport: TransportKind,
        #[case] market_type: MarketType,
        #[case] supported: bool,
    ) {
        let status = lookup(
            exchange,
            feature,
            transport,
            market_type,
            InstrumentType::from_market_type(market_type),
        );
        assert_eq!(status.supported, supported);
    }
}
