//! Composite grouping keys.
//!
//! Key parts are the string forms of the grouping values joined by a separator.
//! Null, missing values and fields without a column all map to the same null
//! sentinel, so null rows form their own group instead of being dropped.
//!
//! String coercion means a number and a string with the same text (`1` and
//! `"1"`) land in the same group. Callers mixing heterogeneous sources rely on
//! this collapsing behavior.

use serde_json::Value;

use crate::model::{Field, Row};

/// Key part used for null, missing or column-less values.
pub const NULL_SENTINEL: &str = "__null__";
/// Separator between key parts.
pub const KEY_SEPARATOR: &str = "\u{1f}";

/// String form of a grouping value.
pub fn key_part(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NULL_SENTINEL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => coerce_number(n),
        Some(other) => other.to_string(),
    }
}

/// Integral floats print without a fraction so `2.0` and `2` share a key.
fn coerce_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Builds the composite key of a row for the ordered grouping fields.
pub fn group_key(row: &Row, fields: &[&Field]) -> String {
    fields
        .iter()
        .map(|field| match field.column_name.as_deref() {
            Some(column) => key_part(row.get(column)),
            None => NULL_SENTINEL.to_string(),
        })
        .collect::<Vec<_>>()
        .join(KEY_SEPARATOR)
}
