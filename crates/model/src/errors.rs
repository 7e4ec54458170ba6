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

//! Error taxonomy shared by every layer of the library.
//!
//! Transport crates define their own error enums (`HttpClientError`,
//! `WsClientError`) and convert into [`MarketDataError`] at the runner
//! boundary so that consumers only ever see these kinds.

use thiserror::Error;

/// A typed error enumeration covering the whole request pipeline.
///
/// Each variant is a machine-readable kind carrying a human message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MarketDataError {
    /// Request parameters violate structural constraints; raised before any I/O.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Symbol rejected by the venue mapper.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    /// Timeframe not present in the venue's interval map.
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
    /// The capability registry reports the combination as unsupported.
    #[error("Capability not supported: {0}")]
    Capability(String),
    /// Symbol cannot be mapped to a venue form.
    #[error("Symbol resolution failed: {0}")]
    SymbolResolution(String),
    /// The transport exhausted its internal 429 retry budget.
    #[error("Rate limit exceeded (retry_after: {retry_after:?})")]
    RateLimit {
        /// Seconds the venue asked us to wait, when known.
        retry_after: Option<u64>,
    },
    /// Transport-level failure (DNS, TCP, TLS, timeout).
    #[error("Network error: {0}")]
    Network(String),
    /// The venue returned a structured error or an unexpected HTTP status.
    #[error("Provider error {code}: {message}")]
    Provider {
        /// Venue error code (or HTTP status when no envelope code exists).
        code: String,
        /// Venue-supplied message.
        message: String,
    },
    /// Adapter-level mismatch: missing field, wrong type, unparseable value.
    #[error("Data error: {0}")]
    Data(String),
    /// Cooperative cancellation; always propagated.
    #[error("Request canceled: {0}")]
    Canceled(String),
}

impl MarketDataError {
    /// Builds a [`Self::Provider`] error from a venue code and message.
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns the machine-readable kind label for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::InvalidSymbol(_) => "invalid_symbol",
            Self::InvalidInterval(_) => "invalid_interval",
            Self::Capability(_) => "capability",
            Self::SymbolResolution(_) => "symbol_resolution",
            Self::RateLimit { .. } => "rate_limit",
            Self::Network(_) => "network",
            Self::Provider { .. } => "provider",
            Self::Data(_) => "data",
            Self::Canceled(_) => "canceled",
        }
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(error: serde_json::Error) -> Self {
        Self::Data(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_carries_code_and_message() {
        let err = MarketDataError::provider("10001", "invalid symbol");
        assert_eq!(err.kind(), "provider");
        assert_eq!(err.to_string(), "Provider error 10001: invalid symbol");
    }

    #[test]
    fn rate_limit_display_includes_retry_after() {
        let err = MarketDataError::RateLimit {
            retry_after: Some(7),
        };
        assert!(err.to_string().contains('7'));
    }
}
