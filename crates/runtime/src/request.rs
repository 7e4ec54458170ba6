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

//! The unified request model.
//!
//! A [`DataRequest`] is what the router dispatches; [`RequestParams`] is the
//! resolved, per-venue parameter bag handed to endpoint builders and response
//! adapters (with the market variant injected and the symbol translated to
//! its venue form).

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use polyfeed_model::{
    DataFeature, Exchange, InstrumentType, MarketDataError, MarketType, MarketVariant, Timeframe,
    TransportKind,
};
use ustr::Ustr;

use crate::chunking::ChunkPlan;

/// An immutable, transport-agnostic description of one data request.
///
/// Build with [`DataRequestBuilder`]:
///
/// ```rust
/// use polyfeed_model::{DataFeature, Exchange, Timeframe};
/// use polyfeed_runtime::DataRequestBuilder;
///
/// let request = DataRequestBuilder::default()
///     .feature(DataFeature::Ohlcv)
///     .exchange(Exchange::Binance)
///     .symbol("BTCUSDT")
///     .timeframe(Timeframe::M1)
///     .limit(1200_u32)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone, Debug, PartialEq, Builder)]
#[builder(setter(into, strip_option), build_fn(validate = "Self::validate"))]
pub struct DataRequest {
    /// The requested data capability.
    pub feature: DataFeature,
    /// REST or WebSocket.
    #[builder(default)]
    pub transport: TransportKind,
    /// Target venue.
    pub exchange: Exchange,
    #[builder(default)]
    pub market_type: MarketType,
    /// Instrument classification; derived from `market_type` when omitted.
    #[builder(default)]
    pub instrument_type: Option<InstrumentType>,
    /// Canonical symbol for single-symbol features.
    #[builder(default)]
    pub symbol: Option<String>,
    /// Canonical symbols for multi-symbol streams.
    #[builder(default)]
    pub symbols: Vec<String>,
    #[builder(default)]
    pub timeframe: Option<Timeframe>,
    #[builder(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[builder(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Total number of points requested across all chunks.
    #[builder(default)]
    pub limit: Option<u32>,
    /// Upper bound on chunked sub-requests.
    #[builder(default)]
    pub max_chunks: Option<u32>,
    /// Order-book depth.
    #[builder(default)]
    pub depth: Option<u32>,
    /// Venue sampling period for historical open interest (e.g. `"5m"`).
    #[builder(default)]
    pub period: Option<String>,
    /// Request historical (windowed) data where the venue distinguishes it.
    #[builder(default)]
    pub historical: bool,
    /// Pagination id for historical trades.
    #[builder(default)]
    pub from_id: Option<u64>,
    /// Drop non-closed bars in streams.
    #[builder(default)]
    pub closed_only: bool,
    /// Per-stream throttle window in milliseconds.
    #[builder(default)]
    pub throttle_ms: Option<u64>,
    /// Drop consecutive stream points with identical dedupe keys.
    #[builder(default)]
    pub dedupe: bool,
    /// Venue-specific extras forwarded verbatim to endpoint builders.
    #[builder(default)]
    pub extra_params: serde_json::Map<String, serde_json::Value>,
}

impl DataRequestBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(limit)) = self.limit
            && limit == 0
        {
            return Err("limit must be positive".to_string());
        }
        if let (Some(Some(start)), Some(Some(end))) = (self.start_time, self.end_time)
            && start >= end
        {
            return Err(format!("start_time {start} must be before end_time {end}"));
        }
        Ok(())
    }
}

impl DataRequest {
    /// The effective instrument type, derived from the market type when not
    /// set explicitly.
    #[must_use]
    pub fn effective_instrument_type(&self) -> InstrumentType {
        self.instrument_type
            .unwrap_or_else(|| InstrumentType::from_market_type(self.market_type))
    }

    /// Resolves the market variant: an explicit `market_variant` extra
    /// parameter wins, otherwise the market-type default applies.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] for an unrecognized variant
    /// name.
    pub fn resolve_variant(&self) -> Result<MarketVariant, MarketDataError> {
        match self.extra_params.get("market_variant") {
            Some(serde_json::Value::String(name)) => name.parse().map_err(|_| {
                MarketDataError::Validation(format!("Unknown market variant '{name}'"))
            }),
            Some(other) => Err(MarketDataError::Validation(format!(
                "market_variant must be a string, got {other}"
            ))),
            None => Ok(MarketVariant::from_market_type(self.market_type)),
        }
    }

    /// All symbols the request names (single plus multi), upper-cased.
    #[must_use]
    pub fn all_symbols(&self) -> Vec<Ustr> {
        let mut out: Vec<Ustr> = Vec::new();
        if let Some(symbol) = &self.symbol {
            out.push(Ustr::from(&symbol.to_uppercase()));
        }
        for symbol in &self.symbols {
            let upper = Ustr::from(&symbol.to_uppercase());
            if !out.contains(&upper) {
                out.push(upper);
            }
        }
        out
    }
}

/// The resolved parameter bag passed to every endpoint builder and adapter.
#[derive(Clone, Debug)]
pub struct RequestParams {
    pub exchange: Exchange,
    pub market_type: MarketType,
    pub market_variant: MarketVariant,
    pub instrument_type: InstrumentType,
    /// Canonical upper-case symbol (e.g. `BTCUSDT`).
    pub symbol: Option<Ustr>,
    /// Venue-native symbol form (e.g. `BTC-USDT` on OKX).
    pub venue_symbol: Option<String>,
    pub symbols: Vec<Ustr>,
    pub timeframe: Option<Timeframe>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub max_chunks: Option<u32>,
    pub depth: Option<u32>,
    pub period: Option<String>,
    pub historical: bool,
    pub from_id: Option<u64>,
    /// Cursor for cursor-windowed chunked requests.
    pub cursor: Option<serde_json::Value>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RequestParams {
    /// Resolves a request into venue parameters with the given market variant.
    ///
    /// The venue symbol defaults to the canonical form; providers overwrite it
    /// after consulting their symbol mapper.
    #[must_use]
    pub fn from_request(request: &DataRequest, market_variant: MarketVariant) -> Self {
        let symbol = request
            .symbol
            .as_deref()
            .map(|s| Ustr::from(&s.to_uppercase()));
        Self {
            exchange: request.exchange,
            market_type: request.market_type,
            market_variant,
            instrument_type: request.effective_instrument_type(),
            symbol,
            venue_symbol: symbol.map(|s| s.to_string()),
            symbols: request.all_symbols(),
            timeframe: request.timeframe,
            start_time: request.start_time,
            end_time: request.end_time,
            limit: request.limit,
            max_chunks: request.max_chunks,
            depth: request.depth,
            period: request.period.clone(),
            historical: request.historical,
            from_id: request.from_id,
            cursor: None,
            extra: request.extra_params.clone(),
        }
    }

    /// Narrows the parameters to one chunk plan's window.
    pub fn apply_plan(&mut self, plan: &ChunkPlan) {
        if plan.start_time.is_some() {
            self.start_time = plan.start_time;
        }
        if plan.end_time.is_some() {
            self.end_time = plan.end_time;
        }
        self.limit = Some(plan.limit);
        self.cursor = plan.cursor.clone();
    }

    /// Returns the venue symbol or fails validation.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when no symbol was provided.
    pub fn require_venue_symbol(&self) -> Result<&str, MarketDataError> {
        self.venue_symbol
            .as_deref()
            .ok_or_else(|| MarketDataError::Validation("Request requires a symbol".to_string()))
    }

    /// Returns the canonical symbol or fails validation.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when no symbol was provided.
    pub fn require_symbol(&self) -> Result<Ustr, MarketDataError> {
        self.symbol
            .ok_or_else(|| MarketDataError::Validation("Request requires a symbol".to_string()))
    }

    /// Returns the timeframe or fails validation.
    ///
    /// # Errors
    ///
    /// Returns [`MarketDataError::Validation`] when no timeframe was provided.
    pub fn require_timeframe(&self) -> Result<Timeframe, MarketDataError> {
        self.timeframe
            .ok_or_else(|| MarketDataError::Validation("Request requires a timeframe".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn base_request() -> DataRequestBuilder {
        let mut builder = DataRequestBuilder::default();
        builder
            .feature(DataFeature::Ohlcv)
            .exchange(Exchange::Binance)
            .symbol("btcusdt")
            .timeframe(Timeframe::M1);
        builder
    }

    #[rstest]
    fn builder_rejects_zero_limit() {
        let result = base_request().limit(0_u32).build();
        assert!(result.is_err());
    }

    #[rstest]
    fn builder_rejects_inverted_time_range() {
        let start = chrono::Utc::now();
        let end = start - chrono::Duration::minutes(1);
        let result = base_request().start_time(start).end_time(end).build();
        assert!(result.is_err());
    }

    #[rstest]
    fn params_upper_case_symbols_and_derive_instrument() {
        let request = base_request().build().unwrap();
        assert_eq!(request.effective_instrument_type(), InstrumentType::Spot);

        let params = RequestParams::from_request(&request, MarketVariant::Spot);
        assert_eq!(params.symbol.unwrap().as_str(), "BTCUSDT");
        assert_eq!(params.venue_symbol.as_deref(), Some("BTCUSDT"));
    }

    #[rstest]
    fn all_symbols_merges_and_dedupes() {
        let request = base_request()
            .symbols(vec!["ethusdt".to_string(), "BTCUSDT".to_string()])
            .build()
            .unwrap();
        let symbols = request.all_symbols();
        assert_eq!(
            symbols.iter().map(Ustr::as_str).collect::<Vec<_>>(),
            vec!["BTCUSDT", "ETHUSDT"]
        );
    }

    #[rstest]
    fn apply_plan_overrides_window() {
        let request = base_request().limit(5000_u32).build().unwrap();
        let mut params = RequestParams::from_request(&request, MarketVariant::Spot);

        let plan = ChunkPlan {
            start_time: Some(chrono::Utc::now()),
            end_time: None,
            limit: 1000,
            cursor: None,
            chunk_index: 0,
        };
        params.apply_plan(&plan);
        assert_eq!(params.limit, Some(1000));
        assert_eq!(params.start_time, plan.start_time);
    }
}
