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

//! The top-level typed API facade.
//!
//! [`DataClient`] holds default exchange/market settings, resolves them per
//! call (explicit options win), builds [`DataRequest`]s and dispatches them
//! through the [`Router`]. Call [`DataClient::close`] when finished to
//! release cached providers.

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream::BoxStream};
use polyfeed_model::{
    DataFeature, Exchange, FundingRate, InstrumentType, Liquidation, MarkPrice, MarketDataError,
    MarketType, Ohlcv, OpenInterest, OrderBook, StreamingBar, SymbolInfo, Timeframe, Trade,
    TransportKind,
};
use polyfeed_runtime::{DataPayload, DataRequest, DataRequestBuilder, StreamItem};

use crate::router::Router;

pub const DEFAULT_ORDER_BOOK_DEPTH: u32 = 100;
pub const DEFAULT_RECENT_TRADES_LIMIT: u32 = 500;
pub const DEFAULT_FUNDING_RATES_LIMIT: u32 = 100;

/// Options for historical OHLCV fetches.
#[derive(Clone, Debug, Default)]
pub struct OhlcvOptions {
    pub exchange: Option<Exchange>,
    pub market_type: Option<MarketType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub max_chunks: Option<u32>,
}

/// Options for order-book snapshots.
#[derive(Clone, Debug, Default)]
pub struct BookOptions {
    pub exchange: Option<Exchange>,
    pub market_type: Option<MarketType>,
    pub depth: Option<u32>,
}

/// Options for recent and historical trades.
#[derive(Clone, Debug, Default)]
pub struct TradeOptions {
    pub exchange: Option<Exchange>,
    pub market_type: Option<MarketType>,
    pub limit: Option<u32>,
    pub from_id: Option<u64>,
}

/// Options for symbol metadata.
#[derive(Clone, Debug, Default)]
pub struct SymbolsOptions {
    pub exchange: Option<Exchange>,
    pub market_type: Option<MarketType>,
    /// Keep only symbols quoted in this asset.
    pub quote_asset: Option<String>,
}

/// Options for open-interest queries.
#[derive(Clone, Debug, Default)]
pub struct OpenInterestOptions {
    pub exchange: Option<Exchange>,
    pub market_type: Option<MarketType>,
    /// Request windowed history where the venue distinguishes it.
    pub historical: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Venue sampling period (e.g. `"5m"`).
    pub period: Option<String>,
    pub limit: Option<u32>,
}

/// Options for funding-rate queries.
#[derive(Clone, Debug, Default)]
pub struct FundingOptions {
    pub exchange: Option<Exchange>,
    pub market_type: Option<MarketType>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

/// Options shared by every `stream_*` method.
#[derive(Clone, Debug, Default)]
pub struct StreamOptions {
    pub exchange: Option<Exchange>,
    pub market_type: Option<MarketType>,
    /// Drop non-closed bars.
    pub closed_only: bool,
    /// Emit at most one point per symbol per window.
    pub throttle_ms: Option<u64>,
    /// Drop consecutive duplicates.
    pub dedupe: bool,
}

/// The unified market-data client.
pub struct DataClient {
    router: Router,
    default_exchange: Option<Exchange>,
    default_market_type: MarketType,
    default_instrument_type: Option<InstrumentType>,
}

impl std::fmt::Debug for DataClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(DataClient))
            .field("default_exchange", &self.default_exchange)
            .field("default_market_type", &self.default_market_type)
            .finish_non_exhaustive()
    }
}

impl DataClient {
    /// Creates a client with the built-in venue registry.
    #[must_use]
    pub fn new(default_exchange: Option<Exchange>) -> Self {
        Self::with_router(Router::with_default_providers(), default_exchange)
    }

    /// Creates a client around a custom router (e.g. with injected
    /// providers).
    #[must_use]
    pub fn with_router(router: Router, default_exchange: Option<Exchange>) -> Self {
        Self {
            router,
            default_exchange,
            default_market_type: MarketType::Spot,
            default_instrument_type: None,
        }
    }

    /// Sets the default market type (spot unless overridden).
    #[must_use]
    pub fn with_default_market_type(mut self, market_type: MarketType) -> Self {
        self.default_market_type = market_type;
        self
    }

    /// Sets the default instrument type (derived from the market otherwise).
    #[must_use]
    pub fn with_default_instrument_type(mut self, instrument_type: InstrumentType) -> Self {
        self.default_instrument_type = Some(instrument_type);
        self
    }

    /// Returns the underlying router.
    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Closes the router and every cached provider.
    pub async fn close(&self) {
        self.router.close_all().await;
    }

    fn resolve_exchange(&self, exchange: Option<Exchange>) -> Result<Exchange, MarketDataError> {
        exchange.or(self.default_exchange).ok_or_else(|| {
            MarketDataError::Validation(
                "No exchange given and no default exchange configured".to_string(),
            )
        })
    }

    fn resolve_market_type(&self, market_type: Option<MarketType>) -> MarketType {
        market_type.unwrap_or(self.default_market_type)
    }

    fn request(
        &self,
        feature: DataFeature,
        transport: TransportKind,
        exchange: Option<Exchange>,
        market_type: Option<MarketType>,
    ) -> Result<DataRequestBuilder, MarketDataError> {
        let mut builder = DataRequestBuilder::default();
        builder
            .feature(feature)
            .transport(transport)
            .exchange(self.resolve_exchange(exchange)?)
            .market_type(self.resolve_market_type(market_type));
        if let Some(instrument_type) = self.default_instrument_type {
            builder.instrument_type(instrument_type);
        }
        Ok(builder)
    }

    fn build(builder: &DataRequestBuilder) -> Result<DataRequest, MarketDataError> {
        builder
            .build()
            .map_err(|e| MarketDataError::Validation(e.to_string()))
    }

    /// Fetches the venue's health/ping payload.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_health(
        &self,
        exchange: Option<Exchange>,
        market_type: Option<MarketType>,
    ) -> Result<serde_json::Value, MarketDataError> {
        let request = Self::build(&self.request(
            DataFeature::Health,
            TransportKind::Rest,
            exchange,
            market_type,
        )?)?;
        match self.router.route(&request).await? {
            DataPayload::Health(value) | DataPayload::Raw(value) => Ok(value),
            other => Err(unexpected_payload("health", &other)),
        }
    }

    /// Fetches OHLCV bars, chunking transparently when the ask exceeds the
    /// venue's per-call point limit.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        options: OhlcvOptions,
    ) -> Result<Ohlcv, MarketDataError> {
        let mut builder = self.request(
            DataFeature::Ohlcv,
            TransportKind::Rest,
            options.exchange,
            options.market_type,
        )?;
        builder.symbol(symbol).timeframe(timeframe);
        if let Some(start) = options.start_time {
            builder.start_time(start);
        }
        if let Some(end) = options.end_time {
            builder.end_time(end);
        }
        if let Some(limit) = options.limit {
            builder.limit(limit);
        }
        if let Some(max_chunks) = options.max_chunks {
            builder.max_chunks(max_chunks);
        }

        match self.router.route(&Self::build(&builder)?).await? {
            DataPayload::Ohlcv(series) => Ok(series),
            other => Err(unexpected_payload("ohlcv", &other)),
        }
    }

    /// Fetches an order-book snapshot (depth 100 by default).
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_order_book(
        &self,
        symbol: &str,
        options: BookOptions,
    ) -> Result<OrderBook, MarketDataError> {
        let mut builder = self.request(
            DataFeature::OrderBook,
            TransportKind::Rest,
            options.exchange,
            options.market_type,
        )?;
        builder
            .symbol(symbol)
            .depth(options.depth.unwrap_or(DEFAULT_ORDER_BOOK_DEPTH));

        match self.router.route(&Self::build(&builder)?).await? {
            DataPayload::Book(book) => Ok(book),
            other => Err(unexpected_payload("order_book", &other)),
        }
    }

    /// Fetches recent trades (limit 500 by default).
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_recent_trades(
        &self,
        symbol: &str,
        options: TradeOptions,
    ) -> Result<Vec<Trade>, MarketDataError> {
        self.fetch_trades(DataFeature::Trades, symbol, options, DEFAULT_RECENT_TRADES_LIMIT)
            .await
    }

    /// Fetches historical trades, paginating from `from_id` when given.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_historical_trades(
        &self,
        symbol: &str,
        options: TradeOptions,
    ) -> Result<Vec<Trade>, MarketDataError> {
        self.fetch_trades(
            DataFeature::HistoricalTrades,
            symbol,
            options,
            DEFAULT_RECENT_TRADES_LIMIT,
        )
        .await
    }

    async fn fetch_trades(
        &self,
        feature: DataFeature,
        symbol: &str,
        options: TradeOptions,
        default_limit: u32,
    ) -> Result<Vec<Trade>, MarketDataError> {
        let mut builder = self.request(
            feature,
            TransportKind::Rest,
            options.exchange,
            options.market_type,
        )?;
        builder
            .symbol(symbol)
            .limit(options.limit.unwrap_or(default_limit));
        if let Some(from_id) = options.from_id {
            builder.from_id(from_id);
        }

        match self.router.route(&Self::build(&builder)?).await? {
            DataPayload::Trades(trades) => Ok(trades),
            other => Err(unexpected_payload("trades", &other)),
        }
    }

    /// Fetches tradable symbol metadata, optionally filtered by quote asset.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_symbols(
        &self,
        options: SymbolsOptions,
    ) -> Result<Vec<SymbolInfo>, MarketDataError> {
        let builder = self.request(
            DataFeature::SymbolMetadata,
            TransportKind::Rest,
            options.exchange,
            options.market_type,
        )?;

        let mut symbols = match self.router.route(&Self::build(&builder)?).await? {
            DataPayload::Symbols(symbols) => symbols,
            other => return Err(unexpected_payload("symbols", &other)),
        };
        if let Some(quote) = options.quote_asset {
            let quote = quote.to_uppercase();
            symbols.retain(|s| s.quote_asset.as_str() == quote);
        }
        Ok(symbols)
    }

    /// Fetches open interest: the current venue-stamped sample, or windowed
    /// history where supported and requested.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_open_interest(
        &self,
        symbol: &str,
        options: OpenInterestOptions,
    ) -> Result<Vec<OpenInterest>, MarketDataError> {
        let mut builder = self.request(
            DataFeature::OpenInterest,
            TransportKind::Rest,
            options.exchange,
            options.market_type.or(Some(MarketType::Futures)),
        )?;
        builder.symbol(symbol).historical(options.historical);
        if let Some(start) = options.start_time {
            builder.start_time(start);
        }
        if let Some(end) = options.end_time {
            builder.end_time(end);
        }
        if let Some(period) = options.period {
            builder.period(period);
        }
        if let Some(limit) = options.limit {
            builder.limit(limit);
        }

        match self.router.route(&Self::build(&builder)?).await? {
            DataPayload::OpenInterest(samples) => Ok(samples),
            other => Err(unexpected_payload("open_interest", &other)),
        }
    }

    /// Fetches funding rates (limit 100 by default).
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy.
    pub async fn fetch_funding_rates(
        &self,
        symbol: &str,
        options: FundingOptions,
    ) -> Result<Vec<FundingRate>, MarketDataError> {
        let mut builder = self.request(
            DataFeature::FundingRate,
            TransportKind::Rest,
            options.exchange,
            options.market_type.or(Some(MarketType::Futures)),
        )?;
        builder
            .symbol(symbol)
            .limit(options.limit.unwrap_or(DEFAULT_FUNDING_RATES_LIMIT));
        if let Some(start) = options.start_time {
            builder.start_time(start).historical(true);
        }
        if let Some(end) = options.end_time {
            builder.end_time(end).historical(true);
        }

        match self.router.route(&Self::build(&builder)?).await? {
            DataPayload::FundingRates(rates) => Ok(rates),
            other => Err(unexpected_payload("funding_rates", &other)),
        }
    }

    /// Streams live bars for one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError`] kinds per the shared taxonomy; no socket
    /// is opened on validation or capability failures.
    pub async fn stream_ohlcv(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, StreamingBar>, MarketDataError> {
        self.stream_ohlcv_multi(&[symbol], timeframe, options).await
    }

    /// Streams live bars for several symbols over one multiplexed
    /// subscription.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_ohlcv_multi(
        &self,
        symbols: &[&str],
        timeframe: Timeframe,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, StreamingBar>, MarketDataError> {
        let stream = self
            .open_stream(DataFeature::Ohlcv, symbols, Some(timeframe), &options)
            .await?;
        Ok(Box::pin(stream.filter_map(|item| async move {
            match item {
                StreamItem::Bar(bar) => Some(bar),
                _ => None,
            }
        })))
    }

    /// Streams live trades for one symbol.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_trades(
        &self,
        symbol: &str,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, Trade>, MarketDataError> {
        self.stream_trades_multi(&[symbol], options).await
    }

    /// Streams live trades for several symbols.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_trades_multi(
        &self,
        symbols: &[&str],
        options: StreamOptions,
    ) -> Result<BoxStream<'static, Trade>, MarketDataError> {
        let stream = self
            .open_stream(DataFeature::Trades, symbols, None, &options)
            .await?;
        Ok(Box::pin(stream.filter_map(|item| async move {
            match item {
                StreamItem::Trade(trade) => Some(trade),
                _ => None,
            }
        })))
    }

    /// Streams order-book snapshots for one symbol.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_order_book(
        &self,
        symbol: &str,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, OrderBook>, MarketDataError> {
        self.stream_order_book_multi(&[symbol], options).await
    }

    /// Streams order-book snapshots for several symbols.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_order_book_multi(
        &self,
        symbols: &[&str],
        options: StreamOptions,
    ) -> Result<BoxStream<'static, OrderBook>, MarketDataError> {
        let stream = self
            .open_stream(DataFeature::OrderBook, symbols, None, &options)
            .await?;
        Ok(Box::pin(stream.filter_map(|item| async move {
            match item {
                StreamItem::Book(book) => Some(book),
                _ => None,
            }
        })))
    }

    /// Streams open-interest updates.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_open_interest(
        &self,
        symbol: &str,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, OpenInterest>, MarketDataError> {
        let stream = self
            .open_stream(DataFeature::OpenInterest, &[symbol], None, &options)
            .await?;
        Ok(Box::pin(stream.filter_map(|item| async move {
            match item {
                StreamItem::OpenInterest(sample) => Some(sample),
                _ => None,
            }
        })))
    }

    /// Streams funding-rate updates.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_funding_rate(
        &self,
        symbol: &str,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, FundingRate>, MarketDataError> {
        let stream = self
            .open_stream(DataFeature::FundingRate, &[symbol], None, &options)
            .await?;
        Ok(Box::pin(stream.filter_map(|item| async move {
            match item {
                StreamItem::FundingRate(rate) => Some(rate),
                _ => None,
            }
        })))
    }

    /// Streams mark-price updates.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_mark_price(
        &self,
        symbol: &str,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, MarkPrice>, MarketDataError> {
        let stream = self
            .open_stream(DataFeature::MarkPrice, &[symbol], None, &options)
            .await?;
        Ok(Box::pin(stream.filter_map(|item| async move {
            match item {
                StreamItem::MarkPrice(mark) => Some(mark),
                _ => None,
            }
        })))
    }

    /// Streams forced liquidations.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DataClient::stream_ohlcv`].
    pub async fn stream_liquidations(
        &self,
        symbol: &str,
        options: StreamOptions,
    ) -> Result<BoxStream<'static, Liquidation>, MarketDataError> {
        let stream = self
            .open_stream(DataFeature::Liquidations, &[symbol], None, &options)
            .await?;
        Ok(Box::pin(stream.filter_map(|item| async move {
            match item {
                StreamItem::Liquidation(liquidation) => Some(liquidation),
                _ => None,
            }
        })))
    }

    async fn open_stream(
        &self,
        feature: DataFeature,
        symbols: &[&str],
        timeframe: Option<Timeframe>,
        options: &StreamOptions,
    ) -> Result<BoxStream<'static, StreamItem>, MarketDataError> {
        let mut builder = self.request(
            feature,
            TransportKind::Ws,
            options.exchange,
            options.market_type,
        )?;
        builder
            .symbols(symbols.iter().map(ToString::to_string).collect::<Vec<_>>())
            .closed_only(options.closed_only)
            .dedupe(options.dedupe);
        if let Some(timeframe) = timeframe {
            builder.timeframe(timeframe);
        }
        if let Some(throttle_ms) = options.throttle_ms {
            builder.throttle_ms(throttle_ms);
        }
        self.router.route_stream(&Self::build(&builder)?).await
    }
}

fn unexpected_payload(expected: &str, got: &DataPayload) -> MarketDataError {
    MarketDataError::Data(format!(
        "Expected a {expected} payload, got {}",
        got.kind()
    ))
}
