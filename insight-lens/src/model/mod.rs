//! Data model shared by the aggregation, merging and suggestion pipelines.
//!
//! All types are plain serde-serialisable snapshots. The pipelines read them and
//! never mutate them.

pub mod analysis;
pub mod field;
pub mod insight;
pub mod suggestion;

pub use analysis::{field_hash, ColumnAnalysis, ColumnDetails, DataFrameAnalysis, DataType, Semantic};
pub use field::{Field, FieldType, Table};
pub use insight::{
    Aggregation, FilterOperator, Insight, InsightFilter, InsightJoin, InsightMetric, JoinKind,
};
pub use suggestion::{
    AnalyticalTag, ChartSuggestion, ChartType, Encoding, TimeUnit, Transform, COUNT_FIELD,
};

/// A single source row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;
