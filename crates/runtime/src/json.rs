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

//! JSON extraction helpers for venue adapters.
//!
//! Venues disagree on whether numbers arrive as strings or JSON numbers;
//! these helpers normalize both without ever routing a price through binary
//! floats (numbers are re-parsed from their literal representation).

use polyfeed_model::MarketDataError;
use rust_decimal::Decimal;
use serde_json::Value;

fn data_err(context: &str, value: &Value) -> MarketDataError {
    MarketDataError::Data(format!("Expected {context}, got {value}"))
}

/// Extracts an array.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] when the value is not an array.
pub fn as_array<'a>(value: &'a Value, context: &str) -> Result<&'a Vec<Value>, MarketDataError> {
    value.as_array().ok_or_else(|| data_err(context, value))
}

/// Extracts a string slice.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] when the value is not a string.
pub fn as_str<'a>(value: &'a Value, context: &str) -> Result<&'a str, MarketDataError> {
    value.as_str().ok_or_else(|| data_err(context, value))
}

/// Extracts an integer from a JSON number or numeric string.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] when the value is neither.
pub fn as_i64(value: &Value, context: &str) -> Result<i64, MarketDataError> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| data_err(context, value)),
        Value::String(s) => s.trim().parse().map_err(|_| data_err(context, value)),
        _ => Err(data_err(context, value)),
    }
}

/// Extracts an unsigned integer from a JSON number or numeric string.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] when the value is neither.
pub fn as_u64(value: &Value, context: &str) -> Result<u64, MarketDataError> {
    match value {
        Value::Number(n) => n.as_u64().ok_or_else(|| data_err(context, value)),
        Value::String(s) => s.trim().parse().map_err(|_| data_err(context, value)),
        _ => Err(data_err(context, value)),
    }
}

/// Extracts an exact decimal from a string or a JSON number.
///
/// Numbers are re-parsed from their literal text so no value passes through
/// an `f64`.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] when the value is not a parseable
/// decimal.
pub fn as_decimal(value: &Value, context: &str) -> Result<Decimal, MarketDataError> {
    match value {
        Value::String(s) => s.trim().parse().map_err(|_| data_err(context, value)),
        Value::Number(n) => n.to_string().parse().map_err(|_| data_err(context, value)),
        _ => Err(data_err(context, value)),
    }
}

/// Extracts an optional decimal, treating `null` and empty strings as absent.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] for present but unparseable values.
pub fn opt_decimal(value: Option<&Value>, context: &str) -> Result<Option<Decimal>, MarketDataError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => as_decimal(v, context).map(Some),
    }
}

/// Parses an exact decimal from venue string fields.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] when the string is not a decimal.
pub fn decimal_str(value: &str, context: &str) -> Result<Decimal, MarketDataError> {
    value
        .trim()
        .parse()
        .map_err(|_| MarketDataError::Data(format!("Unparseable {context} '{value}'")))
}

/// Parses an optional decimal string, treating empty strings as absent.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] for present but unparseable values.
pub fn opt_decimal_str(
    value: Option<&str>,
    context: &str,
) -> Result<Option<Decimal>, MarketDataError> {
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => decimal_str(s, context).map(Some),
    }
}

/// Extracts a required object field.
///
/// # Errors
///
/// Returns [`MarketDataError::Data`] when the field is missing.
pub fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value, MarketDataError> {
    value
        .get(name)
        .ok_or_else(|| MarketDataError::Data(format!("Missing required field '{name}'")))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    #[test]
    fn decimals_parse_from_strings_and_numbers() {
        assert_eq!(as_decimal(&json!("42.5"), "price").unwrap(), dec!(42.5));
        assert_eq!(as_decimal(&json!(42.5), "price").unwrap(), dec!(42.5));
        assert_eq!(as_decimal(&json!(7), "price").unwrap(), dec!(7));
        assert!(as_decimal(&json!("abc"), "price").is_err());
        assert!(as_decimal(&json!(null), "price").is_err());
    }

    #[test]
    fn integers_parse_from_strings_and_numbers() {
        assert_eq!(as_i64(&json!("1704067200000"), "ts").unwrap(), 1_704_067_200_000);
        assert_eq!(as_i64(&json!(1_704_067_200_000_i64), "ts").unwrap(), 1_704_067_200_000);
        assert!(as_i64(&json!(true), "ts").is_err());
    }

    #[test]
    fn opt_decimal_treats_empty_as_absent() {
        assert_eq!(opt_decimal(Some(&json!("")), "rate").unwrap(), None);
        assert_eq!(opt_decimal(None, "rate").unwrap(), None);
        assert_eq!(
            opt_decimal(Some(&json!("0.0001")), "rate").unwrap(),
            Some(dec!(0.0001))
        );
    }
}
