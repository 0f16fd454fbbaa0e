//! Lenient numeric coercion for money and quantity fields.
//!
//! Client payloads historically send money and quantity fields as either
//! numbers or strings; unparseable input falls back to zero instead of
//! failing the write. That zero-fallback masks bad input, so it lives here
//! behind named functions rather than inline at every call site: swapping
//! in a strict policy touches this module only.

use serde_json::Value;

/// Coerces a money field to `f64`, substituting `0.0` on parse failure.
pub fn money_or_zero(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerces a quantity field to a non-negative integer, substituting `0`
/// on parse failure. Negative input also collapses to zero.
pub fn quantity_or_zero(value: Option<&Value>) -> u32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    };
    u32::try_from(parsed).unwrap_or(0)
}
