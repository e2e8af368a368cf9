//! # insight-lens - Insight aggregation and chart suggestions
//!
//! insight-lens is the pure, in-memory core behind an analytics UI: it groups
//! and aggregates the rows behind a user-defined *insight*, and proposes
//! ranked chart encodings for the columns involved.
//!
//! ## Overview
//!
//! Four synchronous components cover the pipeline:
//!
//! - **Column classification** ([`suitability`]): decides whether a column may
//!   sit on the X axis, the Y axis or the color channel of a chart type.
//! - **Analysis merging** ([`merge`]): combines per-table column analyses of a
//!   base table and its joins, and validates cached analyses against the
//!   current field set.
//! - **Insight aggregation** ([`aggregation`]): an implicit `GROUP BY` over the
//!   selected fields with `count`, `count_distinct`, `sum`, `avg`, `min` and
//!   `max` metrics, returning a capped preview plus the full group count.
//! - **Chart suggestions** ([`suggestions`]): seeded, reproducible candidate
//!   generation, scoring, weighted selection, deduplication and ranking.
//!
//! None of them perform I/O or keep shared state. Identical inputs always
//! yield identical outputs, so callers may recompute freely.
//!
//! ## Quick Start
//!
//! ```rust
//! use insight_lens::prelude::*;
//! use serde_json::json;
//!
//! let table = Table::new("orders", "Orders", vec![
//!     Field::new("f_region", "region", FieldType::String),
//!     Field::new("f_sales", "sales", FieldType::Number),
//! ]);
//! let insight = Insight::new("i1", "Sales by region", "orders")
//!     .with_selected_fields(["f_region"])
//!     .with_metric(InsightMetric::new("m1", "total", Some("sales"), Aggregation::Sum));
//!
//! let rows: Vec<Row> = vec![
//!     json!({"region": "North", "sales": 120}),
//!     json!({"region": "South", "sales": 80}),
//!     json!({"region": "North", "sales": 30}),
//! ]
//! .into_iter()
//! .filter_map(|v| v.as_object().cloned())
//! .collect();
//!
//! let preview = compute_insight_preview(&insight, &table, &rows, DEFAULT_PREVIEW_ROWS);
//! assert_eq!(preview.row_count, 2);
//!
//! let analysis = DataFrameAnalysis::new(
//!     vec![
//!         ColumnAnalysis::categorical("region", 2),
//!         ColumnAnalysis::numerical("sales", 3, 30.0, 120.0),
//!     ],
//!     3,
//!     field_hash(table.field_ids()),
//! );
//! let input = SuggestionInput::from_tables([(&table, &analysis)]).with_insight(&insight);
//! let suggestions = SuggestionEngine::builder().seed(1).build().suggest(&input);
//!
//! assert!(suggestions.iter().any(|s| s.encoding.signature() == "region|sales|"));
//! ```
//!
//! ## Architecture
//!
//! - **`model`**: fields, tables, insights, column analyses and suggestion types
//! - **`suitability`**: per-channel column rules and the blocking predicate
//! - **`merge`**: analysis merging and freshness validation
//! - **`cache`**: an explicit analysis cache keyed by field hash
//! - **`aggregation`**: the implicit `GROUP BY` engine
//! - **`suggestions`**: the chart suggestion engine and tag-scoped mode
//! - **`config`**: suggestion policy knobs
//! - **`formatters`**: JSON, text and Markdown rendering
//! - **`logging`**: tracing configuration helpers

pub mod aggregation;
pub mod cache;
pub mod config;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod merge;
pub mod model;
pub mod prelude;
pub mod suggestions;
pub mod suitability;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
