//! Lenient decoding of loosely-typed API fields.
//!
//! Upstream payloads carry amounts as numbers or numeric strings and
//! category tags as arrays, JSON-encoded strings, or null. Anything that
//! cannot be read as a valid value collapses to a neutral default (zero,
//! empty list) so a partial payload still renders.

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a currency amount, defaulting to zero for missing, malformed,
/// or negative input.
pub fn to_amount(value: &Value) -> Decimal {
    let parsed = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    };

    parsed
        .filter(|amount| !amount.is_sign_negative())
        .unwrap_or(Decimal::ZERO)
}

fn parse_amount_str(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Read a list of category tags from an array, a JSON-encoded array
/// string, or a single bare tag string.
pub fn to_tags(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(inner @ Value::Array(_)) => to_tags(&inner),
                _ => vec![trimmed.to_string()],
            }
        }
        _ => Vec::new(),
    }
}

/// Serde adapter for [`to_amount`].
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_amount(&value))
}

/// Serde adapter for [`to_tags`].
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_tags(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(to_amount(&json!(500)), dec!(500));
        assert_eq!(to_amount(&json!(12.5)), dec!(12.5));
        assert_eq!(to_amount(&json!("250.75")), dec!(250.75));
        assert_eq!(to_amount(&json!("  40 ")), dec!(40));
        assert_eq!(to_amount(&json!("1e3")), dec!(1000));
    }

    #[test]
    fn malformed_amounts_become_zero() {
        assert_eq!(to_amount(&json!("abc")), Decimal::ZERO);
        assert_eq!(to_amount(&json!("")), Decimal::ZERO);
        assert_eq!(to_amount(&Value::Null), Decimal::ZERO);
        assert_eq!(to_amount(&json!({"value": 3})), Decimal::ZERO);
        assert_eq!(to_amount(&json!([1, 2])), Decimal::ZERO);
        assert_eq!(to_amount(&json!(true)), Decimal::ZERO);
    }

    #[test]
    fn negative_amounts_become_zero() {
        assert_eq!(to_amount(&json!(-20)), Decimal::ZERO);
        assert_eq!(to_amount(&json!("-0.01")), Decimal::ZERO);
    }

    #[test]
    fn tags_from_array() {
        assert_eq!(
            to_tags(&json!(["Education", "Elderly", 7, null])),
            vec!["Education", "Elderly", "7"]
        );
    }

    #[test]
    fn tags_from_encoded_string() {
        assert_eq!(
            to_tags(&json!("[\"Health\",\"Children\"]")),
            vec!["Health", "Children"]
        );
        assert_eq!(to_tags(&json!("Animals")), vec!["Animals"]);
    }

    #[test]
    fn tags_from_null_or_garbage() {
        assert!(to_tags(&Value::Null).is_empty());
        assert!(to_tags(&json!("   ")).is_empty());
        assert!(to_tags(&json!({"a": 1})).is_empty());
    }
}
