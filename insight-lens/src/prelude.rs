//! Prelude for commonly used types and traits in insight-lens.

pub use crate::aggregation::{
    compute_insight_data_frame, compute_insight_preview, DataFrame, PreviewResult,
    DEFAULT_PREVIEW_ROWS,
};
pub use crate::cache::AnalysisCache;
pub use crate::config::SuggestionConfig;
pub use crate::error::{InsightError, Result};
pub use crate::formatters::{FormatterConfig, SuggestionFormatter};
pub use crate::logging::LogConfig;
pub use crate::merge::{are_analyses_valid, merge_analyses, AnalysisEntry};
pub use crate::model::{
    field_hash, Aggregation, AnalyticalTag, ChartSuggestion, ChartType, ColumnAnalysis,
    DataFrameAnalysis, Encoding, Field, FieldType, Insight, InsightMetric, Row, Semantic, Table,
};
pub use crate::suggestions::{SuggestionEngine, SuggestionInput};
