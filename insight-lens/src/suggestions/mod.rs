//! Chart suggestion engine.
//!
//! A single pass per request:
//!
//! 1. analysed columns are bucketed by role (numerical, temporal,
//!    categorical, color) and every bucket is shuffled with a seeded LCG;
//! 2. each requested chart type generates scored candidates from the buckets;
//! 3. up to `max_per_chart_type` candidates are drawn per type from the
//!    `top_k` best, weighted by `(score + 1)^2`;
//! 4. candidates whose `x|y|color` signature was already accepted or is
//!    excluded by the caller are rejected;
//! 5. the accepted set is ranked and truncated.
//!
//! Identical inputs and seed always produce identical output.
//!
//! # Example
//!
//! ```rust
//! use insight_lens::model::ColumnAnalysis;
//! use insight_lens::suggestions::{SuggestionEngine, SuggestionInput};
//!
//! let columns = vec![
//!     ColumnAnalysis::categorical("region", 4),
//!     ColumnAnalysis::temporal("order_date", 365),
//!     ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0),
//! ];
//!
//! let engine = SuggestionEngine::builder().seed(7).build();
//! let input = SuggestionInput::new(&columns).with_row_count(1_000);
//! let suggestions = engine.suggest(&input);
//!
//! assert!(!suggestions.is_empty());
//! assert!(suggestions.iter().all(|s| s.encoding.y.as_deref() == Some("sales")));
//! ```

pub mod buckets;
pub mod candidates;
pub mod ranking;
pub mod rng;
pub mod scoring;
pub mod tags;

use std::collections::{HashMap, HashSet};

use tracing::{info, instrument};

use crate::config::SuggestionConfig;
use crate::{log_candidate, perf_debug};
use crate::logging::{truncate_field, LogConfig};
use crate::merge::merge_analyses;
use crate::model::{
    Aggregation, ChartSuggestion, ChartType, ColumnAnalysis, DataFrameAnalysis, Field, Insight,
    Table, Transform, COUNT_FIELD,
};
use buckets::ColumnBuckets;
use candidates::{Candidate, CandidateContext};
use ranking::Ranked;
use rng::SeededRng;

pub use tags::best_chart_type_for_tag;

/// Everything the engine knows about the data behind an insight.
#[derive(Debug, Clone, Default)]
pub struct SuggestionInput<'a> {
    /// Merged column analyses, in merge order.
    pub columns: Vec<&'a ColumnAnalysis>,
    /// Source table of every column; used for table coverage.
    pub column_tables: HashMap<String, String>,
    /// Number of joined tables, base table included.
    pub total_tables: usize,
    pub row_count: Option<u64>,
    /// Field metadata consulted by the blocking rules.
    pub fields: Vec<&'a Field>,
    /// Columns already part of the insight.
    pub selected_columns: HashSet<String>,
    /// Signatures of visualizations that already exist.
    pub excluded_signatures: HashSet<String>,
}

impl<'a> SuggestionInput<'a> {
    /// Input over a single table's columns.
    pub fn new<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = &'a ColumnAnalysis>,
    {
        Self {
            columns: columns.into_iter().collect(),
            total_tables: 1,
            ..Self::default()
        }
    }

    /// Merges the analyses of a base table and its joins, recording which
    /// table every surviving column came from.
    ///
    /// The first pair is the base table; its row count becomes the input's.
    pub fn from_tables<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = (&'a Table, &'a DataFrameAnalysis)>,
    {
        let tables: Vec<(&'a Table, &'a DataFrameAnalysis)> = tables.into_iter().collect();

        let mut column_tables = HashMap::new();
        for (table, analysis) in &tables {
            for column in &analysis.columns {
                column_tables
                    .entry(column.column_name.clone())
                    .or_insert_with(|| table.id.clone());
            }
        }

        let merged = merge_analyses(tables.iter().map(|&(_, analysis)| analysis));

        Self {
            columns: merged.to_vec(),
            column_tables,
            total_tables: tables.len(),
            row_count: tables.first().map(|(_, analysis)| analysis.row_count),
            fields: tables
                .iter()
                .flat_map(|&(table, _)| table.fields.iter())
                .collect(),
            selected_columns: HashSet::new(),
            excluded_signatures: HashSet::new(),
        }
    }

    pub fn with_row_count(mut self, row_count: u64) -> Self {
        self.row_count = Some(row_count);
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = &'a Field>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    pub fn with_column_table(mut self, column: impl Into<String>, table_id: impl Into<String>) -> Self {
        self.column_tables.insert(column.into(), table_id.into());
        self
    }

    pub fn with_total_tables(mut self, total_tables: usize) -> Self {
        self.total_tables = total_tables;
        self
    }

    pub fn with_selected_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Marks the insight's selected field columns and metric columns as selected.
    ///
    /// Field ids resolve against the fields already on the input.
    pub fn with_insight(mut self, insight: &Insight) -> Self {
        for field_id in &insight.selected_fields {
            if let Some(column) = self
                .fields
                .iter()
                .find(|f| f.id == *field_id)
                .and_then(|f| f.column_name.clone())
            {
                self.selected_columns.insert(column);
            }
        }
        self.selected_columns.extend(
            insight
                .metrics
                .iter()
                .filter_map(|m| m.column_name.clone()),
        );
        self
    }

    pub fn with_excluded_signatures<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_signatures
            .extend(signatures.into_iter().map(Into::into));
        self
    }

    /// Field metadata of a column, by field id first and column name second.
    pub fn field_for(&self, col: &ColumnAnalysis) -> Option<&'a Field> {
        if let Some(id) = &col.field_id {
            if let Some(field) = self.fields.iter().find(|f| f.id == *id) {
                return Some(*field);
            }
        }
        self.fields
            .iter()
            .find(|f| f.column_name.as_deref() == Some(col.column_name.as_str()))
            .copied()
    }
}

/// Builder for [`SuggestionEngine`].
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngineBuilder {
    config: SuggestionConfig,
    log_config: LogConfig,
}

impl SuggestionEngineBuilder {
    /// Seed of the shuffle and tie-breaking draws.
    pub fn seed(mut self, seed: i64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn max_suggestions(mut self, max: usize) -> Self {
        self.config.max_suggestions = max.max(1);
        self
    }

    pub fn max_per_chart_type(mut self, max: usize) -> Self {
        self.config.max_per_chart_type = max.max(1);
        self
    }

    /// Size of the pool the weighted draw picks from.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k.max(1);
        self
    }

    pub fn chart_types(mut self, chart_types: impl IntoIterator<Item = ChartType>) -> Self {
        self.config.chart_types = chart_types.into_iter().collect();
        self
    }

    pub fn scatter_point_ceiling(mut self, ceiling: u64) -> Self {
        self.config.scatter_point_ceiling = ceiling;
        self
    }

    pub fn max_dominant_color_ratio(mut self, ratio: f64) -> Self {
        self.config.max_dominant_color_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: SuggestionConfig) -> Self {
        self.config = config;
        self
    }

    /// Controls candidate-level logging.
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn build(self) -> SuggestionEngine {
        SuggestionEngine {
            config: self.config,
            log_config: self.log_config,
        }
    }
}

/// Produces ranked chart suggestions from column analyses.
#[derive(Debug, Clone, Default)]
pub struct SuggestionEngine {
    config: SuggestionConfig,
    log_config: LogConfig,
}

impl SuggestionEngine {
    pub fn builder() -> SuggestionEngineBuilder {
        SuggestionEngineBuilder::default()
    }

    /// Engine with the default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_config(config: SuggestionConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Suggestions over every configured chart type.
    #[instrument(skip(self, input), fields(columns = input.columns.len(), seed = self.config.seed))]
    pub fn suggest(&self, input: &SuggestionInput<'_>) -> Vec<ChartSuggestion> {
        self.run(input, &self.config.chart_types)
    }

    /// Suggestions for a single chart type.
    #[instrument(skip(self, input), fields(columns = input.columns.len()))]
    pub fn suggest_for_chart_type(
        &self,
        input: &SuggestionInput<'_>,
        chart_type: ChartType,
    ) -> Vec<ChartSuggestion> {
        self.run(input, &[chart_type])
    }

    fn run(&self, input: &SuggestionInput<'_>, chart_types: &[ChartType]) -> Vec<ChartSuggestion> {
        let mut rng = SeededRng::new(self.config.seed);
        let buckets = ColumnBuckets::build(input, &mut rng);
        let ctx = CandidateContext {
            input,
            buckets: &buckets,
            config: &self.config,
        };

        let mut seen: HashSet<String> = input.excluded_signatures.clone();
        let mut accepted: Vec<Ranked> = Vec::new();

        for &chart_type in chart_types {
            let candidates = candidates::generate(chart_type, &ctx);
            for candidate in self.select(candidates, &mut seen, &mut rng) {
                accepted.push(self.to_ranked(candidate, input));
            }
        }

        let mut ranked = ranking::rank(accepted, input.total_tables);
        ranked.truncate(self.config.max_suggestions);

        info!(
            suggestions = ranked.len(),
            chart_types = chart_types.len(),
            "Generated chart suggestions"
        );
        ranked
    }

    /// Draws up to `max_per_chart_type` distinct candidates.
    fn select<'a>(
        &self,
        candidates: Vec<Candidate<'a>>,
        seen: &mut HashSet<String>,
        rng: &mut SeededRng,
    ) -> Vec<Candidate<'a>> {
        let mut pool: Vec<Candidate<'a>> = candidates
            .into_iter()
            .filter(|c| {
                let fresh = !seen.contains(&c.signature());
                if !fresh {
                    log_candidate!(
                        self.log_config,
                        signature = c.signature(),
                        "Skipping duplicate or excluded encoding"
                    );
                }
                fresh
            })
            .collect();

        perf_debug!(
            self.log_config,
            pool = pool.len(),
            top_k = self.config.top_k,
            "Drawing from candidate pool"
        );

        // Stable: equal scores keep the shuffled bucket order.
        pool.sort_by(|a, b| b.total_score().total_cmp(&a.total_score()));

        let mut picked = Vec::new();
        while picked.len() < self.config.max_per_chart_type && !pool.is_empty() {
            let window = self.config.top_k.min(pool.len());
            let scores: Vec<f64> = pool[..window].iter().map(Candidate::total_score).collect();
            let Some(index) = rng.weighted_index(&scores) else {
                break;
            };

            let chosen = pool.remove(index);
            let signature = chosen.signature();
            pool.retain(|c| c.signature() != signature);
            seen.insert(signature);

            log_candidate!(
                self.log_config,
                chart_type = chosen.chart_type.as_str(),
                signature = truncate_field(&chosen.signature(), self.log_config.max_field_length),
                score = %chosen.score,
                "Accepted candidate"
            );
            picked.push(chosen);
        }
        picked
    }

    fn to_ranked(&self, candidate: Candidate<'_>, input: &SuggestionInput<'_>) -> Ranked {
        let tables_touched = scoring::tables_touched(&candidate.encoding, &input.column_tables);

        let new_fields: Vec<String> = candidate
            .encoding
            .columns()
            .into_iter()
            .filter(|c| !input.selected_columns.contains(*c))
            .map(str::to_string)
            .collect();

        let suggestion = ChartSuggestion {
            id: format!("{}:{}", candidate.chart_type, candidate.signature()),
            title: title(&candidate),
            chart_type: candidate.chart_type,
            rationale: Some(rationale(&candidate, tables_touched)),
            uses_existing_fields_only: new_fields.is_empty(),
            new_fields,
            x_transform: candidate.x_transform,
            y_transform: candidate.y_transform,
            score: candidate.total_score(),
            encoding: candidate.encoding,
        };

        Ranked {
            suggestion,
            tables_touched,
        }
    }
}

fn value_label(candidate: &Candidate<'_>) -> String {
    let y = candidate.encoding.y.as_deref().unwrap_or(COUNT_FIELD);
    match candidate.y_transform {
        _ if y == COUNT_FIELD => "Count".to_string(),
        Some(Transform::Aggregate {
            op: Aggregation::Avg,
        }) => format!("Average {y}"),
        Some(Transform::Aggregate {
            op: Aggregation::Sum,
        }) => format!("Total {y}"),
        _ => y.to_string(),
    }
}

fn title(candidate: &Candidate<'_>) -> String {
    let x = candidate.encoding.x.as_deref().unwrap_or_default();
    let value = value_label(candidate);
    let color = candidate.encoding.color.as_deref();

    match (candidate.chart_type, color) {
        (ChartType::Histogram, _) => format!("Distribution of {x}"),
        (ChartType::Scatter, _) => format!("{value} vs {x}"),
        (ChartType::Heatmap, _) => format!("Density of {value} vs {x}"),
        (ChartType::Line, _) => format!("{value} over {x}"),
        (ChartType::Area, _) => format!("{value} over {x} (area)"),
        (ChartType::Table, _) => format!("{value} by {x} (table)"),
        (_, Some(color)) => format!("{value} by {x} and {color}"),
        (_, None) => format!("{value} by {x}"),
    }
}

fn rationale(candidate: &Candidate<'_>, tables_touched: usize) -> String {
    let mut parts = Vec::new();
    if let Some(x) = candidate.x {
        if x.is_temporal() {
            parts.push(format!("{} is a time axis", x.column_name));
        } else if x.semantic.is_categorical_like() {
            parts.push(format!(
                "{} has {} categories",
                x.column_name, x.cardinality
            ));
        } else {
            parts.push(format!("{} is continuous", x.column_name));
        }
    }
    if let Some(y) = candidate.y {
        if candidate.score.metric >= 3.0 {
            parts.push(format!("{} looks like a key measure", y.column_name));
        } else {
            parts.push(format!("{} is numerical", y.column_name));
        }
    }
    if let Some(color) = candidate.color {
        parts.push(format!(
            "{} splits it into {} groups",
            color.column_name, color.cardinality
        ));
    }
    if tables_touched > 1 {
        parts.push(format!("combines {tables_touched} tables"));
    }
    if candidate.chart_type == ChartType::Heatmap {
        parts.push("binned because of the row count".to_string());
    }
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldType, InsightMetric, Semantic};

    fn columns() -> Vec<ColumnAnalysis> {
        vec![
            ColumnAnalysis::categorical("region", 4).with_max_frequency_ratio(0.3),
            ColumnAnalysis::categorical("segment", 3).with_max_frequency_ratio(0.5),
            ColumnAnalysis::temporal("order_date", 365),
            ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0),
            ColumnAnalysis::numerical("quantity", 30, 1.0, 40.0),
            ColumnAnalysis::numerical("order_id", 1_000, 1.0, 1_000.0),
        ]
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let cols = columns();
        let input = SuggestionInput::new(&cols).with_row_count(1_000);
        let engine = SuggestionEngine::builder().seed(42).build();

        let a = serde_json::to_string(&engine.suggest(&input)).unwrap();
        let b = serde_json::to_string(&engine.suggest(&input)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_duplicate_signatures() {
        let cols = columns();
        let input = SuggestionInput::new(&cols).with_row_count(1_000);
        let suggestions = SuggestionEngine::builder()
            .max_per_chart_type(6)
            .max_suggestions(40)
            .build()
            .suggest(&input);

        let mut signatures: Vec<String> = suggestions.iter().map(|s| s.signature()).collect();
        let total = signatures.len();
        signatures.sort();
        signatures.dedup();
        assert_eq!(signatures.len(), total);
    }

    #[test]
    fn test_excluded_signatures_are_respected() {
        let cols = vec![
            ColumnAnalysis::categorical("region", 4),
            ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0),
        ];
        let engine = SuggestionEngine::builder()
            .chart_types([ChartType::Bar])
            .build();

        let open = engine.suggest(&SuggestionInput::new(&cols));
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].signature(), "region|sales|");

        let closed =
            engine.suggest(&SuggestionInput::new(&cols).with_excluded_signatures(["region|sales|"]));
        assert!(closed.is_empty());
    }

    #[test]
    fn test_identifier_never_used() {
        let cols = columns();
        let input = SuggestionInput::new(&cols).with_row_count(1_000);
        for seed in 0..10 {
            let suggestions = SuggestionEngine::builder()
                .seed(seed)
                .chart_types(ChartType::DEFAULT_SET.into_iter().chain([ChartType::Histogram]))
                .build()
                .suggest(&input);
            for s in &suggestions {
                assert!(!s.encoding.columns().contains(&"order_id"), "{}", s.id);
            }
        }
    }

    #[test]
    fn test_field_flags_block_columns() {
        let cols = vec![
            ColumnAnalysis::categorical("region", 4),
            ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0).with_field_id("f_sales"),
        ];
        let sales = Field::new("f_sales", "Sales", FieldType::Number)
            .with_column_name(Some("sales".to_string()))
            .reference();
        let input = SuggestionInput::new(&cols).with_fields([&sales]);

        let suggestions = SuggestionEngine::new().suggest(&input);
        assert!(suggestions
            .iter()
            .all(|s| !s.encoding.columns().contains(&"sales")));
    }

    #[test]
    fn test_new_fields_accounting() {
        let cols = vec![
            ColumnAnalysis::categorical("region", 4),
            ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0),
        ];
        let region = Field::new("f_region", "region", FieldType::String);
        let insight = Insight::new("i", "Sales", "t")
            .with_selected_fields(["f_region"])
            .with_metric(InsightMetric::new(
                "m",
                "total",
                Some("sales"),
                Aggregation::Sum,
            ));
        let input = SuggestionInput::new(&cols)
            .with_fields([&region])
            .with_insight(&insight);

        let suggestions = SuggestionEngine::builder()
            .chart_types([ChartType::Bar])
            .build()
            .suggest(&input);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].uses_existing_fields_only);
        assert!(suggestions[0].new_fields.is_empty());
        assert_eq!(suggestions[0].title, "Total sales by region");
    }

    #[test]
    fn test_from_tables_maps_columns_and_ranks_coverage() {
        let orders = Table::new(
            "orders",
            "orders",
            vec![
                Field::new("o1", "region", FieldType::String),
                Field::new("o2", "sales", FieldType::Number),
            ],
        );
        let customers = Table::new(
            "customers",
            "customers",
            vec![Field::new("c1", "segment", FieldType::String)],
        );
        let orders_analysis = DataFrameAnalysis::new(
            vec![
                ColumnAnalysis::categorical("region", 4).with_max_frequency_ratio(0.3),
                ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0),
            ],
            1_000,
            "o1,o2",
        );
        let customers_analysis = DataFrameAnalysis::new(
            vec![
                ColumnAnalysis::categorical("segment", 3).with_max_frequency_ratio(0.4),
                ColumnAnalysis::categorical("region", 4),
            ],
            200,
            "c1",
        );

        let input = SuggestionInput::from_tables([
            (&orders, &orders_analysis),
            (&customers, &customers_analysis),
        ])
        .with_selected_columns(["region", "sales", "segment"]);
        assert_eq!(input.total_tables, 2);
        assert_eq!(input.row_count, Some(1_000));
        assert_eq!(input.columns.len(), 3);
        assert_eq!(input.column_tables["region"], "orders");
        assert_eq!(input.column_tables["segment"], "customers");
        assert_eq!(input.fields.len(), 3);

        let suggestions = SuggestionEngine::builder()
            .chart_types([ChartType::Bar, ChartType::GroupedBar])
            .build()
            .suggest(&input);
        let grouped = suggestions
            .iter()
            .position(|s| s.chart_type == ChartType::GroupedBar && s.encoding.columns().contains(&"segment"))
            .unwrap();
        let bar = suggestions
            .iter()
            .position(|s| s.chart_type == ChartType::Bar && !s.encoding.columns().contains(&"segment"))
            .unwrap();
        assert!(
            grouped < bar,
            "full coverage ranks before partial coverage"
        );
        assert!(suggestions[grouped]
            .rationale
            .as_deref()
            .unwrap()
            .contains("combines 2 tables"));
    }

    #[test]
    fn test_scatter_requires_two_measures() {
        let cols = vec![
            ColumnAnalysis::categorical("region", 4),
            ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0),
            ColumnAnalysis::numerical("sku", 900, 1.0, 4_800.0).with_semantic(Semantic::Identifier),
        ];
        for seed in [0, 1, 99] {
            let suggestions = SuggestionEngine::builder()
                .seed(seed)
                .build()
                .suggest(&SuggestionInput::new(&cols));
            assert!(suggestions
                .iter()
                .all(|s| !s.chart_type.is_scatter_like()));
        }
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let suggestions = SuggestionEngine::new().suggest(&SuggestionInput::default());
        assert!(suggestions.is_empty());
    }
}
