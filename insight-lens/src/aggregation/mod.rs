//! In-memory implicit GROUP BY over an insight's source rows.
//!
//! The engine groups rows by the insight's selected fields (or into a single
//! grand-total group when none resolve) and computes every metric per group.
//! Nothing passed in is mutated; the result is built from fresh rows.
//!
//! # Example
//!
//! ```rust
//! use insight_lens::aggregation::compute_insight_preview;
//! use insight_lens::model::{Aggregation, Field, FieldType, Insight, InsightMetric, Row, Table};
//! use serde_json::json;
//!
//! let table = Table::new("t1", "orders", vec![
//!     Field::new("f1", "category", FieldType::String),
//!     Field::new("f2", "sales", FieldType::Number),
//! ]);
//! let insight = Insight::new("i1", "Sales by category", "t1")
//!     .with_selected_fields(["f1"])
//!     .with_metric(InsightMetric::new("m1", "total", Some("sales"), Aggregation::Sum));
//!
//! let rows: Vec<Row> = vec![
//!     json!({"category": "A", "sales": 100}),
//!     json!({"category": "B", "sales": 50}),
//!     json!({"category": "A", "sales": 150}),
//! ]
//! .into_iter()
//! .filter_map(|v| v.as_object().cloned())
//! .collect();
//!
//! let preview = compute_insight_preview(&insight, &table, &rows, 50);
//! assert_eq!(preview.row_count, 2);
//! assert_eq!(preview.data_frame.rows[0]["total"], json!(250));
//! ```

mod accumulator;
mod filter;
pub mod group_key;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::model::{Field, FieldType, Insight, Row, Table};
use accumulator::MetricAccumulator;

/// Default preview cap.
pub const DEFAULT_PREVIEW_ROWS: usize = 50;

/// Column metadata of an aggregated result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFrameColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: FieldType,
}

/// A small, fully materialised table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    pub columns: Vec<DataFrameColumn>,
    pub rows: Vec<Row>,
}

/// Output of [`compute_insight_preview`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub data_frame: DataFrame,
    /// Number of groups before truncation.
    pub row_count: usize,
    /// Number of groups kept in `data_frame.rows`.
    pub sample_size: usize,
}

impl PreviewResult {
    /// True when the preview was cut short of the full result.
    pub fn is_truncated(&self) -> bool {
        self.sample_size < self.row_count
    }
}

/// One group under construction.
struct GroupState<'r> {
    first_row: &'r Row,
    accumulators: Vec<MetricAccumulator>,
}

/// Aggregates `source_rows` for `insight` and keeps at most `max_rows` groups.
///
/// Unknown selected field ids are ignored. Groups appear in order of first
/// appearance in `source_rows`.
#[instrument(skip(insight, table, source_rows), fields(insight = %insight.id, rows = source_rows.len()))]
pub fn compute_insight_preview(
    insight: &Insight,
    table: &Table,
    source_rows: &[Row],
    max_rows: usize,
) -> PreviewResult {
    let fields = resolve_fields(insight, table);

    let mut order: Vec<GroupState<'_>> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut filtered_out = 0usize;

    for row in source_rows {
        if !filter::matches_all(row, &insight.filters) {
            filtered_out += 1;
            continue;
        }

        let key = if fields.is_empty() {
            String::new()
        } else {
            group_key::group_key(row, &fields)
        };

        let index = *index_by_key.entry(key).or_insert_with(|| {
            order.push(GroupState {
                first_row: row,
                accumulators: insight.metrics.iter().map(MetricAccumulator::new).collect(),
            });
            order.len() - 1
        });

        let group = &mut order[index];
        for (acc, metric) in group.accumulators.iter_mut().zip(&insight.metrics) {
            acc.update(row, metric.column_name.as_deref());
        }
    }

    // The grand total exists even when every row was filtered out or none were given.
    if fields.is_empty() && order.is_empty() {
        return grand_total_of_nothing(insight, &fields, max_rows);
    }

    let row_count = order.len();
    let rows: Vec<Row> = order
        .iter()
        .take(max_rows)
        .map(|group| build_row(group, &fields, insight))
        .collect();
    let sample_size = rows.len();

    debug!(
        groups = row_count,
        sample_size, filtered_out, "Computed insight preview"
    );

    PreviewResult {
        data_frame: DataFrame {
            columns: output_columns(&fields, insight),
            rows,
        },
        row_count,
        sample_size,
    }
}

/// Full, unsampled aggregation. Identical to a preview with an unbounded cap.
pub fn compute_insight_data_frame(insight: &Insight, table: &Table, source_rows: &[Row]) -> DataFrame {
    compute_insight_preview(insight, table, source_rows, usize::MAX).data_frame
}

/// Selected fields that exist in the table, in selection order.
fn resolve_fields<'t>(insight: &Insight, table: &'t Table) -> Vec<&'t Field> {
    insight
        .selected_fields
        .iter()
        .filter_map(|id| {
            let field = table.field(id);
            if field.is_none() {
                debug!(field_id = id.as_str(), "Ignoring unknown selected field");
            }
            field
        })
        .collect()
}

fn output_columns(fields: &[&Field], insight: &Insight) -> Vec<DataFrameColumn> {
    fields
        .iter()
        .map(|f| DataFrameColumn {
            name: f.name.clone(),
            column_type: f.field_type,
        })
        .chain(insight.metrics.iter().map(|m| DataFrameColumn {
            name: m.name.clone(),
            column_type: FieldType::Number,
        }))
        .collect()
}

fn build_row(group: &GroupState<'_>, fields: &[&Field], insight: &Insight) -> Row {
    let mut row = Row::new();
    for field in fields {
        let value = field
            .column_name
            .as_deref()
            .and_then(|c| group.first_row.get(c))
            .cloned()
            .unwrap_or(Value::Null);
        row.insert(field.name.clone(), value);
    }
    for (acc, metric) in group.accumulators.iter().zip(&insight.metrics) {
        row.insert(metric.name.clone(), acc.finalize());
    }
    row
}

fn grand_total_of_nothing(insight: &Insight, fields: &[&Field], max_rows: usize) -> PreviewResult {
    let mut row = Row::new();
    for metric in &insight.metrics {
        row.insert(
            metric.name.clone(),
            MetricAccumulator::new(metric).finalize(),
        );
    }
    let rows: Vec<Row> = std::iter::once(row).take(max_rows).collect();
    let sample_size = rows.len();
    PreviewResult {
        data_frame: DataFrame {
            columns: output_columns(fields, insight),
            rows,
        },
        row_count: 1,
        sample_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Aggregation, FilterOperator, InsightFilter, InsightMetric};
    use serde_json::json;

    fn rows(values: Vec<Value>) -> Vec<Row> {
        values
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect()
    }

    fn table() -> Table {
        Table::new(
            "t1",
            "orders",
            vec![
                Field::new("f_cat", "category", FieldType::String),
                Field::new("f_sales", "sales", FieldType::Number),
                Field::new("f_region", "region", FieldType::String),
            ],
        )
    }

    #[test]
    fn test_grand_total() {
        let insight = Insight::new("i", "totals", "t1")
            .with_metric(InsightMetric::new("m1", "total", Some("sales"), Aggregation::Sum))
            .with_metric(InsightMetric::count("m2", "n"));
        let data = rows(vec![
            json!({"sales": 100}),
            json!({"sales": 200}),
            json!({"sales": 300}),
        ]);

        let preview = compute_insight_preview(&insight, &table(), &data, DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.row_count, 1);
        assert_eq!(preview.sample_size, 1);
        assert_eq!(preview.data_frame.rows[0]["total"], json!(600));
        assert_eq!(preview.data_frame.rows[0]["n"], json!(3));
    }

    #[test]
    fn test_grand_total_over_no_rows() {
        let insight = Insight::new("i", "totals", "t1")
            .with_metric(InsightMetric::count("m2", "n"))
            .with_metric(InsightMetric::new("m3", "avg", Some("sales"), Aggregation::Avg));
        let preview = compute_insight_preview(&insight, &table(), &[], DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.row_count, 1);
        assert_eq!(preview.data_frame.rows[0]["n"], json!(0));
        assert_eq!(preview.data_frame.rows[0]["avg"], json!(0));

        let capped = compute_insight_preview(&insight, &table(), &[], 0);
        assert_eq!(capped.row_count, 1);
        assert_eq!(capped.sample_size, 0);
        assert!(capped.data_frame.rows.is_empty());
        assert!(capped.is_truncated());
    }

    #[test]
    fn test_group_by_one_field() {
        let insight = Insight::new("i", "by category", "t1")
            .with_selected_fields(["f_cat"])
            .with_metric(InsightMetric::new("m1", "total", Some("sales"), Aggregation::Sum));
        let data = rows(vec![
            json!({"category": "A", "sales": 100}),
            json!({"category": "B", "sales": 50}),
            json!({"category": "A", "sales": 150}),
        ]);

        let preview = compute_insight_preview(&insight, &table(), &data, DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.row_count, 2);
        assert_eq!(preview.data_frame.rows[0]["category"], json!("A"));
        assert_eq!(preview.data_frame.rows[0]["total"], json!(250));
        assert_eq!(preview.data_frame.rows[1]["category"], json!("B"));
        assert_eq!(preview.data_frame.rows[1]["total"], json!(50));
    }

    #[test]
    fn test_null_values_form_their_own_group() {
        let insight = Insight::new("i", "by category", "t1")
            .with_selected_fields(["f_cat"])
            .with_metric(InsightMetric::count("m", "n"));
        let data = rows(vec![
            json!({"category": null}),
            json!({"category": "A"}),
            json!({}),
        ]);

        let preview = compute_insight_preview(&insight, &table(), &data, DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.row_count, 2);
        assert_eq!(preview.data_frame.rows[0]["category"], Value::Null);
        assert_eq!(preview.data_frame.rows[0]["n"], json!(2));
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let insight = Insight::new("i", "ghost", "t1")
            .with_selected_fields(["does_not_exist"])
            .with_metric(InsightMetric::count("m", "n"));
        let data = rows(vec![json!({"category": "A"}), json!({"category": "B"})]);

        let preview = compute_insight_preview(&insight, &table(), &data, DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.row_count, 1);
        assert_eq!(preview.data_frame.columns.len(), 1);
        assert_eq!(preview.data_frame.rows[0]["n"], json!(2));
    }

    #[test]
    fn test_truncation_reports_full_count() {
        let insight = Insight::new("i", "by sales", "t1")
            .with_selected_fields(["f_sales"])
            .with_metric(InsightMetric::count("m", "n"));
        let data = rows((0..10).map(|i| json!({ "sales": i })).collect());

        let preview = compute_insight_preview(&insight, &table(), &data, 3);
        assert_eq!(preview.row_count, 10);
        assert_eq!(preview.sample_size, 3);
        assert!(preview.is_truncated());

        let empty = compute_insight_preview(&insight, &table(), &data, 0);
        assert_eq!(empty.row_count, 10);
        assert_eq!(empty.sample_size, 0);
        assert!(empty.data_frame.rows.is_empty());
    }

    #[test]
    fn test_output_columns_metadata() {
        let insight = Insight::new("i", "cols", "t1")
            .with_selected_fields(["f_region", "f_cat"])
            .with_metric(InsightMetric::new("m", "avg_sales", Some("sales"), Aggregation::Avg));
        let preview = compute_insight_preview(&insight, &table(), &[], DEFAULT_PREVIEW_ROWS);

        let names: Vec<_> = preview
            .data_frame
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.column_type))
            .collect();
        assert_eq!(
            names,
            vec![
                ("region", FieldType::String),
                ("category", FieldType::String),
                ("avg_sales", FieldType::Number),
            ]
        );
        assert_eq!(preview.row_count, 0);
    }

    #[test]
    fn test_filters_apply_before_grouping() {
        let insight = Insight::new("i", "big orders", "t1")
            .with_selected_fields(["f_cat"])
            .with_metric(InsightMetric::new("m", "total", Some("sales"), Aggregation::Sum))
            .with_filter(InsightFilter::new("sales", FilterOperator::Gte, json!(100)));
        let data = rows(vec![
            json!({"category": "A", "sales": 100}),
            json!({"category": "B", "sales": 50}),
            json!({"category": "A", "sales": 150}),
        ]);

        let preview = compute_insight_preview(&insight, &table(), &data, DEFAULT_PREVIEW_ROWS);
        assert_eq!(preview.row_count, 1);
        assert_eq!(preview.data_frame.rows[0]["total"], json!(250));
    }

    #[test]
    fn test_data_frame_matches_unbounded_preview() {
        let insight = Insight::new("i", "by category", "t1")
            .with_selected_fields(["f_cat"])
            .with_metric(InsightMetric::new("m", "max", Some("sales"), Aggregation::Max));
        let data = rows(
            (0..120)
                .map(|i| json!({ "category": format!("c{}", i % 70), "sales": i }))
                .collect(),
        );

        let full = compute_insight_data_frame(&insight, &table(), &data);
        let preview = compute_insight_preview(&insight, &table(), &data, usize::MAX);
        assert_eq!(full, preview.data_frame);
        assert_eq!(full.rows.len(), 70);
        assert_eq!(
            serde_json::to_string(&full).unwrap(),
            serde_json::to_string(&preview.data_frame).unwrap()
        );
    }
}
