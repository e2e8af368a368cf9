//! Partitioning of analysed columns into chart-role buckets.

use tracing::debug;

use super::rng::SeededRng;
use super::SuggestionInput;
use crate::model::{ColumnAnalysis, Semantic};
use crate::suitability::{
    has_numerical_variance, is_blocked_column, CATEGORICAL_X_MAX, COLOR_MAX, COLOR_MIN,
};

/// Columns grouped by the role they can play on a chart.
///
/// A column may sit in several buckets; categorical columns with few values
/// are both X candidates and color candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnBuckets<'a> {
    pub numerical: Vec<&'a ColumnAnalysis>,
    pub temporal: Vec<&'a ColumnAnalysis>,
    pub categorical: Vec<&'a ColumnAnalysis>,
    pub color_suitable: Vec<&'a ColumnAnalysis>,
}

impl<'a> ColumnBuckets<'a> {
    /// Buckets the input columns and shuffles every bucket with `rng`.
    ///
    /// Buckets are shuffled in a fixed order (numerical, temporal,
    /// categorical, color) so one seed always yields the same layout.
    pub fn build(input: &SuggestionInput<'a>, rng: &mut SeededRng) -> Self {
        let mut buckets = Self::default();

        for &col in &input.columns {
            let blocked = is_blocked_column(col, input.field_for(col), input.row_count);
            if !blocked.good {
                debug!(
                    column = col.column_name,
                    reason = blocked.reason.as_deref().unwrap_or(""),
                    "Column excluded from suggestions"
                );
                continue;
            }

            if col.semantic == Semantic::Numerical
                && has_numerical_variance(col, input.row_count).good
            {
                buckets.numerical.push(col);
            }
            if col.is_temporal() {
                buckets.temporal.push(col);
            }
            if col.semantic.is_categorical_like() {
                if col.cardinality > 1 && col.cardinality <= CATEGORICAL_X_MAX {
                    buckets.categorical.push(col);
                }
                if (COLOR_MIN..=COLOR_MAX).contains(&col.cardinality) {
                    buckets.color_suitable.push(col);
                }
            }
        }

        rng.shuffle(&mut buckets.numerical);
        rng.shuffle(&mut buckets.temporal);
        rng.shuffle(&mut buckets.categorical);
        rng.shuffle(&mut buckets.color_suitable);

        debug!(
            numerical = buckets.numerical.len(),
            temporal = buckets.temporal.len(),
            categorical = buckets.categorical.len(),
            color_suitable = buckets.color_suitable.len(),
            "Bucketed columns"
        );

        buckets
    }

    pub fn is_empty(&self) -> bool {
        self.numerical.is_empty()
            && self.temporal.is_empty()
            && self.categorical.is_empty()
            && self.color_suitable.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<ColumnAnalysis> {
        vec![
            ColumnAnalysis::numerical("sales", 400, 1.0, 900.0),
            ColumnAnalysis::numerical("flat", 1, 5.0, 5.0),
            ColumnAnalysis::temporal("order_date", 365),
            ColumnAnalysis::categorical("region", 4),
            ColumnAnalysis::categorical("city", 40),
            ColumnAnalysis::categorical("single", 1),
            ColumnAnalysis::categorical("customer_id", 900),
            ColumnAnalysis::boolean("returned", 10, 90),
        ]
    }

    fn names(cols: &[&ColumnAnalysis]) -> Vec<String> {
        let mut names: Vec<String> = cols.iter().map(|c| c.column_name.clone()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_bucket_membership() {
        let cols = columns();
        let input = SuggestionInput::new(&cols).with_row_count(1_000);
        let buckets = ColumnBuckets::build(&input, &mut SeededRng::new(0));

        assert_eq!(names(&buckets.numerical), vec!["sales"]);
        assert_eq!(names(&buckets.temporal), vec!["order_date"]);
        assert_eq!(names(&buckets.categorical), vec!["city", "region", "returned"]);
        assert_eq!(names(&buckets.color_suitable), vec!["region", "returned"]);
    }

    #[test]
    fn test_identifier_semantic_is_excluded_everywhere() {
        let cols = vec![ColumnAnalysis::numerical("amount", 50, 0.0, 10.0)
            .with_semantic(Semantic::Identifier)];
        let input = SuggestionInput::new(&cols);
        let buckets = ColumnBuckets::build(&input, &mut SeededRng::new(0));
        assert!(buckets.is_empty());
    }

    #[test]
    fn test_same_seed_same_order() {
        let cols: Vec<ColumnAnalysis> = (0..12)
            .map(|i| ColumnAnalysis::numerical(format!("m{i}"), 100, 0.0, 100.0))
            .collect();
        let input = SuggestionInput::new(&cols);

        let a = ColumnBuckets::build(&input, &mut SeededRng::new(5));
        let b = ColumnBuckets::build(&input, &mut SeededRng::new(5));
        let c = ColumnBuckets::build(&input, &mut SeededRng::new(6));
        assert_eq!(a, b);
        assert_eq!(names(&a.numerical), names(&c.numerical));
    }
}
