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

//! Polyfeed — a unified market-data aggregation library for cryptocurrency
//! venues.
//!
//! One typed interface — historical and live — over heterogeneous exchange
//! APIs (Binance, Bybit, OKX, Coinbase, Kraken, MEXC, Hyperliquid). Requests
//! are routed by the static capability registry, split into per-call chunks
//! where venues cap points per request, and normalized into a shared domain
//! model with exact decimal arithmetic.
//!
//! ```rust,no_run
//! use polyfeed::{DataClient, OhlcvOptions};
//! use polyfeed_model::{Exchange, Timeframe};
//!
//! # async fn example() -> Result<(), polyfeed_model::MarketDataError> {
//! let client = DataClient::new(Some(Exchange::Binance));
//! let series = client
//!     .fetch_ohlcv("BTCUSDT", Timeframe::M1, OhlcvOptions::default())
//!     .await?;
//! println!("{} bars", series.bars.len());
//! client.close().await;
//! # Ok(())
//! # }
//! ```

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod feed;
pub mod router;

// Re-exports
pub use polyfeed_model::{
    Bar, BookLevel, DataFeature, Exchange, FundingRate, InstrumentType, Liquidation, MarkPrice,
    MarketDataError, MarketType, MarketVariant, Ohlcv, OpenInterest, OrderBook, SeriesMeta, Side,
    StreamingBar, SymbolInfo, Timeframe, Trade, TransportKind,
};
pub use polyfeed_network::sink::InMemorySink;
pub use polyfeed_runtime::{DataPayload, DataProvider, DataRequest, DataRequestBuilder, StreamItem};

pub use crate::{
    api::{
        BookOptions, DataClient, FundingOptions, OhlcvOptions, OpenInterestOptions, StreamOptions,
        SymbolsOptions, TradeOptions,
    },
    feed::BarFeed,
    router::Router,
};
