//! Per-group metric accumulators.
//!
//! Every accumulator finalizes to a JSON number. Aggregations with nothing to
//! aggregate finalize to 0 rather than null so metric columns stay numeric.

use std::collections::HashSet;

use serde_json::Value;

use crate::model::{Aggregation, InsightMetric, Row};

/// Running state of one metric within one group.
#[derive(Debug, Clone)]
pub(crate) enum MetricAccumulator {
    Count(u64),
    /// Canonical JSON text of every non-null value seen.
    CountDistinct(HashSet<String>),
    Sum(f64),
    Avg { sum: f64, count: u64 },
    Min(Option<f64>),
    Max(Option<f64>),
    /// A non-count metric without a column.
    Zero,
}

impl MetricAccumulator {
    pub(crate) fn new(metric: &InsightMetric) -> Self {
        match (metric.aggregation, metric.column_name.as_deref()) {
            (Aggregation::Count, _) => MetricAccumulator::Count(0),
            (_, None) => MetricAccumulator::Zero,
            (Aggregation::CountDistinct, Some(_)) => {
                MetricAccumulator::CountDistinct(HashSet::new())
            }
            (Aggregation::Sum, Some(_)) => MetricAccumulator::Sum(0.0),
            (Aggregation::Avg, Some(_)) => MetricAccumulator::Avg { sum: 0.0, count: 0 },
            (Aggregation::Min, Some(_)) => MetricAccumulator::Min(None),
            (Aggregation::Max, Some(_)) => MetricAccumulator::Max(None),
        }
    }

    /// Folds one row into the accumulator.
    pub(crate) fn update(&mut self, row: &Row, column: Option<&str>) {
        let value = column.and_then(|c| row.get(c));
        match self {
            MetricAccumulator::Count(n) => *n += 1,
            MetricAccumulator::CountDistinct(seen) => {
                if let Some(v) = value.filter(|v| !v.is_null()) {
                    seen.insert(v.to_string());
                }
            }
            MetricAccumulator::Sum(sum) => *sum += value.and_then(lenient_number).unwrap_or(0.0),
            MetricAccumulator::Avg { sum, count } => {
                if let Some(n) = value.and_then(strict_number) {
                    *sum += n;
                    *count += 1;
                }
            }
            MetricAccumulator::Min(min) => {
                if let Some(n) = value.and_then(strict_number) {
                    *min = Some(min.map_or(n, |m| m.min(n)));
                }
            }
            MetricAccumulator::Max(max) => {
                if let Some(n) = value.and_then(strict_number) {
                    *max = Some(max.map_or(n, |m| m.max(n)));
                }
            }
            MetricAccumulator::Zero => {}
        }
    }

    pub(crate) fn finalize(&self) -> Value {
        match self {
            MetricAccumulator::Count(n) => Value::from(*n),
            MetricAccumulator::CountDistinct(seen) => Value::from(seen.len() as u64),
            MetricAccumulator::Sum(sum) => number_value(*sum),
            MetricAccumulator::Avg { sum, count } => {
                if *count == 0 {
                    number_value(0.0)
                } else {
                    number_value(*sum / *count as f64)
                }
            }
            MetricAccumulator::Min(v) | MetricAccumulator::Max(v) => {
                number_value(v.unwrap_or(0.0))
            }
            MetricAccumulator::Zero => number_value(0.0),
        }
    }
}

/// A JSON number only; strings and booleans are not numbers here.
pub(crate) fn strict_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

/// A JSON number or a string that parses as one.
pub(crate) fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        other => strict_number(other),
    }
}

/// Integral values become JSON integers so `600.0` renders as `600`.
pub(crate) fn number_value(n: f64) -> Value {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if !n.is_finite() {
        return Value::from(0);
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}
