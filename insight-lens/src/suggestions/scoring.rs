//! Composite heuristic score of a candidate encoding.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{ColumnAnalysis, Encoding};
use crate::suitability::looks_like_identifier;

/// Name patterns and the likelihood that a column holds a measure. First match wins.
#[allow(clippy::expect_used)]
static METRIC_NAME_PATTERNS: Lazy<Vec<(Regex, u8)>> = Lazy::new(|| {
    [
        (r"(?i)(total|revenue|amount|sales|price|cost|profit|income|spend|balance)", 3),
        (r"(?i)(count|qty|quantity|units|volume|orders)", 2),
        (r"(?i)(rate|ratio|score|percent|pct|margin|avg|average|mean)", 2),
    ]
    .into_iter()
    .map(|(pattern, weight)| {
        (
            Regex::new(pattern).expect("Hard-coded regex pattern should be valid"),
            weight,
        )
    })
    .collect()
});

/// Names whose values are better averaged than summed.
#[allow(clippy::expect_used)]
static AVERAGED_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(rate|ratio|score|percent|pct|margin|avg|average|mean|temperature|(^|_)age($|_))")
        .expect("Hard-coded regex pattern should be valid")
});

/// How measure-like a column name is: 3 strong, 2 likely, 1 neutral, 0 never.
pub fn metric_likelihood(column_name: &str) -> u8 {
    if looks_like_identifier(column_name) {
        return 0;
    }
    METRIC_NAME_PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(column_name))
        .map_or(1, |(_, weight)| *weight)
}

/// True when the column reads like a rate or mean rather than an additive amount.
pub fn prefers_average(column_name: &str) -> bool {
    AVERAGED_NAME_PATTERN.is_match(column_name)
}

/// 3 to 20 distinct X values read best; 2 to 30 are acceptable.
pub fn x_cardinality_bonus(cardinality: u64) -> f64 {
    match cardinality {
        3..=20 => 2.0,
        2..=30 => 1.0,
        _ => 0.0,
    }
}

/// 2 to 5 colors read best; up to 10 are acceptable.
pub fn color_cardinality_bonus(cardinality: u64) -> f64 {
    match cardinality {
        2..=5 => 2.0,
        6..=10 => 1.0,
        _ => 0.0,
    }
}

/// Mean fill rate of the given columns, in `[0, 1]`.
pub fn completeness_bonus(columns: &[&ColumnAnalysis], row_count: Option<u64>) -> f64 {
    if columns.is_empty() {
        return 0.0;
    }
    columns.iter().map(|c| c.fill_rate(row_count)).sum::<f64>() / columns.len() as f64
}

/// Distinct source tables touched by an encoding. Unmapped columns count as no table.
pub fn tables_touched(encoding: &Encoding, column_tables: &HashMap<String, String>) -> usize {
    encoding
        .columns()
        .into_iter()
        .filter_map(|c| column_tables.get(c))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Breakdown of a candidate score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub coverage: f64,
    pub metric: f64,
    pub completeness: f64,
    pub x_cardinality: f64,
    pub color: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.coverage + self.metric + self.completeness + self.x_cardinality + self.color
    }
}

impl fmt::Display for ScoreBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} (coverage {:.1}, metric {:.1}, completeness {:.2}, x {:.1}, color {:.1})",
            self.total(),
            self.coverage,
            self.metric,
            self.completeness,
            self.x_cardinality,
            self.color
        )
    }
}

/// Inputs of one score computation.
pub struct ScoreInputs<'c, 'a> {
    pub encoding: &'c Encoding,
    pub x: Option<&'a ColumnAnalysis>,
    pub y: Option<&'a ColumnAnalysis>,
    pub color: Option<&'a ColumnAnalysis>,
    pub column_tables: &'c HashMap<String, String>,
    pub row_count: Option<u64>,
}

/// Scores a candidate. `None` means the value column is disqualified.
pub fn score(inputs: &ScoreInputs<'_, '_>) -> Option<ScoreBreakdown> {
    let metric = match inputs.y {
        Some(y) => match metric_likelihood(&y.column_name) {
            0 => return None,
            weight => f64::from(weight),
        },
        // Count-based charts have no value column to judge.
        None => 1.0,
    };

    // Multi-table joins earn one point per extra table touched.
    let touched = tables_touched(inputs.encoding, inputs.column_tables);
    let coverage = touched.saturating_sub(1) as f64;

    let used: Vec<&ColumnAnalysis> = [inputs.x, inputs.y, inputs.color]
        .into_iter()
        .flatten()
        .collect();

    Some(ScoreBreakdown {
        coverage,
        metric,
        completeness: completeness_bonus(&used, inputs.row_count),
        x_cardinality: inputs.x.map_or(0.0, |x| {
            if x.semantic.is_categorical_like() || x.is_temporal() {
                x_cardinality_bonus(x.cardinality)
            } else {
                0.0
            }
        }),
        color: inputs
            .color
            .map_or(0.0, |c| color_cardinality_bonus(c.cardinality)),
    })
}
