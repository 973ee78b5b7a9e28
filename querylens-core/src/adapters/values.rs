//! Conversion helpers shared by the per-dialect row decoders.
//!
//! Each adapter probes a column value with a dialect-specific sequence of
//! Rust types; once a probe succeeds the value is turned into a JSON scalar
//! with one of these helpers so that every dialect renders the same kinds of
//! data the same way.

use base64::Engine;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value as JsonValue;

/// Wraps an optional value, mapping SQL NULL to JSON null.
pub fn nullable<T>(value: Option<T>, convert: impl FnOnce(T) -> JsonValue) -> JsonValue {
    value.map(convert).unwrap_or(JsonValue::Null)
}

/// Integer to JSON number.
pub fn integer(value: i64) -> JsonValue {
    JsonValue::Number(value.into())
}

/// Unsigned integer to JSON number.
pub fn unsigned(value: u64) -> JsonValue {
    JsonValue::Number(value.into())
}

/// Float to JSON number; NaN and infinities have no JSON form and become null.
pub fn float(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Exact decimal to JSON number.
///
/// Integral decimals that fit in `i64` stay integers so that `SUM(qty)`
/// renders as `12`, not `12.0`.
pub fn decimal(value: Decimal) -> JsonValue {
    if value.fract().is_zero()
        && let Some(i) = value.to_i64()
    {
        return integer(i);
    }
    value.to_f64().map(float).unwrap_or(JsonValue::Null)
}

/// Text to JSON string.
pub fn text(value: String) -> JsonValue {
    JsonValue::String(value)
}

/// Binary data to a `base64:`-prefixed JSON string.
pub fn bytes(value: Vec<u8>) -> JsonValue {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&value);
    JsonValue::String(format!("base64:{}", encoded))
}

/// Anything with a `Display` form (dates, times, UUIDs) to a JSON string.
pub fn display<T: std::fmt::Display>(value: T) -> JsonValue {
    JsonValue::String(value.to_string())
}
