//! Tag-scoped suggestions: one chart type chosen from the analytical intent.

use tracing::{debug, info, instrument};

use super::buckets::ColumnBuckets;
use super::rng::SeededRng;
use super::{SuggestionEngine, SuggestionInput};
use crate::model::{AnalyticalTag, ChartSuggestion, ChartType};

/// Picks the chart type that answers `tag` for the given column shape.
///
/// Returns `None` when the data cannot support the intent. A trend needs a
/// temporal or continuous X axis and never falls back to categories.
pub fn best_chart_type_for_tag(tag: AnalyticalTag, buckets: &ColumnBuckets<'_>) -> Option<ChartType> {
    let has_measure = !buckets.numerical.is_empty();

    match tag {
        AnalyticalTag::Comparison => {
            (!buckets.categorical.is_empty()).then_some(ChartType::Bar)
        }
        AnalyticalTag::Trend => {
            let temporal_x = !buckets.temporal.is_empty() && has_measure;
            let continuous_x = buckets.numerical.len() >= 2;
            (temporal_x || continuous_x).then_some(ChartType::Line)
        }
        AnalyticalTag::Correlation => (buckets.numerical.len() >= 2).then_some(ChartType::Scatter),
        AnalyticalTag::Distribution => {
            if has_measure {
                Some(ChartType::Histogram)
            } else if !buckets.categorical.is_empty() {
                // Row counts per category.
                Some(ChartType::Bar)
            } else {
                None
            }
        }
    }
}

impl SuggestionEngine {
    /// Chart type that best serves `tag` for this input, if any.
    pub fn select_best_chart_type_for_tag(
        &self,
        input: &SuggestionInput<'_>,
        tag: AnalyticalTag,
    ) -> Option<ChartType> {
        let mut rng = SeededRng::new(self.config().seed);
        let buckets = ColumnBuckets::build(input, &mut rng);
        best_chart_type_for_tag(tag, &buckets)
    }

    /// Suggestions restricted to the chart type chosen for `tag`.
    #[instrument(skip(self, input))]
    pub fn suggest_by_tag(
        &self,
        input: &SuggestionInput<'_>,
        tag: AnalyticalTag,
    ) -> Vec<ChartSuggestion> {
        match self.select_best_chart_type_for_tag(input, tag) {
            Some(chart_type) => {
                debug!(chart_type = chart_type.as_str(), "Selected chart type for tag");
                self.suggest_for_chart_type(input, chart_type)
            }
            None => {
                info!("No chart type fits the requested tag");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnAnalysis;

    fn pick(cols: &[ColumnAnalysis], tag: AnalyticalTag) -> Option<ChartType> {
        let input = SuggestionInput::new(cols);
        let buckets = ColumnBuckets::build(&input, &mut SeededRng::new(0));
        best_chart_type_for_tag(tag, &buckets)
    }

    #[test]
    fn test_trend_fails_closed_on_categories() {
        let cols = vec![
            ColumnAnalysis::categorical("region", 4),
            ColumnAnalysis::numerical("sales", 100, 0.0, 10.0),
        ];
        assert_eq!(pick(&cols, AnalyticalTag::Trend), None);
        assert_eq!(pick(&cols, AnalyticalTag::Comparison), Some(ChartType::Bar));
    }

    #[test]
    fn test_trend_accepts_time_or_continuous_axis() {
        let temporal = vec![
            ColumnAnalysis::temporal("order_date", 90),
            ColumnAnalysis::numerical("sales", 100, 0.0, 10.0),
        ];
        assert_eq!(pick(&temporal, AnalyticalTag::Trend), Some(ChartType::Line));

        let continuous = vec![
            ColumnAnalysis::numerical("price", 100, 0.0, 10.0),
            ColumnAnalysis::numerical("sales", 100, 0.0, 10.0),
        ];
        assert_eq!(pick(&continuous, AnalyticalTag::Trend), Some(ChartType::Line));
    }

    #[test]
    fn test_correlation_and_distribution() {
        let one = vec![ColumnAnalysis::numerical("sales", 100, 0.0, 10.0)];
        assert_eq!(pick(&one, AnalyticalTag::Correlation), None);
        assert_eq!(pick(&one, AnalyticalTag::Distribution), Some(ChartType::Histogram));

        let cats = vec![ColumnAnalysis::categorical("region", 4)];
        assert_eq!(pick(&cats, AnalyticalTag::Distribution), Some(ChartType::Bar));
        assert_eq!(pick(&[], AnalyticalTag::Distribution), None);
    }

    #[test]
    fn test_suggest_by_tag_returns_only_that_type() {
        let cols = vec![
            ColumnAnalysis::temporal("order_date", 90),
            ColumnAnalysis::categorical("region", 4),
            ColumnAnalysis::numerical("sales", 100, 0.0, 10.0),
            ColumnAnalysis::numerical("cost", 100, 0.0, 8.0),
        ];
        let input = SuggestionInput::new(&cols);
        let engine = SuggestionEngine::new();

        let trend = engine.suggest_by_tag(&input, AnalyticalTag::Trend);
        assert!(!trend.is_empty());
        assert!(trend.iter().all(|s| s.chart_type == ChartType::Line));

        let nothing = engine.suggest_by_tag(
            &SuggestionInput::new(&cols[1..3]),
            AnalyticalTag::Trend,
        );
        assert!(nothing.is_empty());
    }
}
