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

//! Timestamp-unit conversions applied at the adapter boundary.
//!
//! Venues report times in seconds (Kraken, Coinbase granularity buckets),
//! milliseconds (Binance, Bybit, OKX, Hyperliquid) or nanoseconds (Kraken
//! trade feeds); everything is converted to UTC [`DateTime`]s before a domain
//! type is constructed.

use chrono::{DateTime, TimeZone, Utc};

use crate::errors::MarketDataError;

/// Converts a millisecond Unix timestamp to a UTC datetime.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] if the value is outside the representable
/// range.
pub fn ms_to_datetime(millis: i64) -> Result<DateTime<Utc>, MarketDataError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| MarketDataError::Data(format!("Millisecond timestamp out of range: {millis}")))
}

/// Converts a microsecond Unix timestamp to a UTC datetime.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] if the value is outside the representable
/// range.
pub fn us_to_datetime(micros: i64) -> Result<DateTime<Utc>, MarketDataError> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or_else(|| MarketDataError::Data(format!("Microsecond timestamp out of range: {micros}")))
}

/// Converts a second-resolution Unix timestamp to a UTC datetime.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] if the value is outside the representable
/// range.
pub fn secs_to_datetime(secs: i64) -> Result<DateTime<Utc>, MarketDataError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| MarketDataError::Data(format!("Second timestamp out of range: {secs}")))
}

/// Converts a nanosecond Unix timestamp to a UTC datetime.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] if the value is outside the representable
/// range.
pub fn ns_to_datetime(nanos: i64) -> Result<DateTime<Utc>, MarketDataError> {
    Ok(DateTime::<Utc>::from_timestamp_nanos(nanos))
}

/// Converts a UTC datetime to a millisecond Unix timestamp.
#[must_use]
pub fn datetime_to_ms(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Converts a UTC datetime to a second-resolution Unix timestamp.
#[must_use]
pub fn datetime_to_secs(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

/// Parses a millisecond timestamp carried as a string (OKX, Bybit list rows).
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] if the string is not an integer or the
/// value is out of range.
pub fn ms_str_to_datetime(value: &str) -> Result<DateTime<Utc>, MarketDataError> {
    let millis: i64 = value
        .parse()
        .map_err(|_| MarketDataError::Data(format!("Unparseable millisecond timestamp '{value}'")))?;
    ms_to_datetime(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ms_round_trip() {
        let dt = ms_to_datetime(1_704_067_200_000).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(datetime_to_ms(dt), 1_704_067_200_000);
    }

    #[test]
    fn secs_round_trip() {
        let dt = secs_to_datetime(1_704_067_200).unwrap();
        assert_eq!(datetime_to_secs(dt), 1_704_067_200);
    }

    #[test]
    fn ms_str_rejects_garbage() {
        assert!(ms_str_to_datetime("not-a-number").is_err());
        assert!(ms_str_to_datetime("1704067200000").is_ok());
    }
}
