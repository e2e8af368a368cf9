//! Row predicates from insight filters.

use std::cmp::Ordering;

use serde_json::Value;

use super::accumulator::lenient_number;
use super::group_key::key_part;
use crate::model::{FilterOperator, InsightFilter, Row};

/// True when the row satisfies every filter.
pub(crate) fn matches_all(row: &Row, filters: &[InsightFilter]) -> bool {
    filters.iter().all(|filter| matches(row, filter))
}

fn matches(row: &Row, filter: &InsightFilter) -> bool {
    let value = row.get(&filter.column_name).filter(|v| !v.is_null());

    match filter.operator {
        FilterOperator::IsNull => value.is_none(),
        FilterOperator::IsNotNull => value.is_some(),
        FilterOperator::Eq => value.is_some_and(|v| loosely_equal(v, &filter.value)),
        FilterOperator::Neq => !value.is_some_and(|v| loosely_equal(v, &filter.value)),
        FilterOperator::Contains => value.is_some_and(|v| {
            key_part(Some(v))
                .to_lowercase()
                .contains(&key_part(Some(&filter.value)).to_lowercase())
        }),
        FilterOperator::Gt => compare(value, &filter.value) == Some(Ordering::Greater),
        FilterOperator::Gte => matches!(
            compare(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::Lt => compare(value, &filter.value) == Some(Ordering::Less),
        FilterOperator::Lte => matches!(
            compare(value, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn loosely_equal(left: &Value, right: &Value) -> bool {
    match (lenient_number(left), lenient_number(right)) {
        (Some(a), Some(b)) => a == b,
        _ => key_part(Some(left)) == key_part(Some(right)),
    }
}

/// Numeric comparison when both sides are numbers, lexical otherwise (ISO dates sort lexically).
fn compare(value: Option<&Value>, target: &Value) -> Option<Ordering> {
    let value = value?;
    if target.is_null() {
        return None;
    }
    match (lenient_number(value), lenient_number(target)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(key_part(Some(value)).cmp(&key_part(Some(target)))),
    }
}
