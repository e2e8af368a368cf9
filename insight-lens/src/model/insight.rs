//! Insight definitions: grouping fields, metric definitions, joins and filters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregation applied by an [`InsightMetric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    CountDistinct,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::Count => "count",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::CountDistinct => "count_distinct",
        }
    }

    /// Renders the aggregate expression for a column, e.g. `sum(sales)`.
    ///
    /// `count` ignores the column and always renders `count(*)`.
    pub fn expression(&self, column: Option<&str>) -> String {
        match (self, column) {
            (Aggregation::Count, _) | (_, None) => "count(*)".to_string(),
            (Aggregation::CountDistinct, Some(col)) => format!("count(distinct {col})"),
            (agg, Some(col)) => format!("{}({col})", agg.as_str()),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named aggregation over a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightMetric {
    pub id: String,
    pub name: String,
    /// Absent only for `count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
    pub aggregation: Aggregation,
}

impl InsightMetric {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        column_name: Option<&str>,
        aggregation: Aggregation,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_name: column_name.map(str::to_string),
            aggregation,
        }
    }

    /// Shorthand for a row-count metric.
    pub fn count(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, None, Aggregation::Count)
    }

    pub fn expression(&self) -> String {
        self.aggregation.expression(self.column_name.as_deref())
    }
}

/// Kind of join between the base table and a joined table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Left,
    Inner,
    Right,
    Full,
}

/// A join from the insight's base table to another table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightJoin {
    pub table_id: String,
    pub left_column: String,
    pub right_column: String,
    #[serde(default)]
    pub kind: JoinKind,
}

/// Comparison applied by an [`InsightFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    IsNull,
    IsNotNull,
}

/// A row predicate applied before grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightFilter {
    pub column_name: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl InsightFilter {
    pub fn new(
        column_name: impl Into<String>,
        operator: FilterOperator,
        value: serde_json::Value,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            operator,
            value,
        }
    }
}

/// A user-defined grouped/aggregated view over a base table and its joins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub name: String,
    pub base_table_id: String,
    /// Grouping key set; order matters for display only.
    #[serde(default)]
    pub selected_fields: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<InsightMetric>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<InsightJoin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<InsightFilter>,
}

impl Insight {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        base_table_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            base_table_id: base_table_id.into(),
            selected_fields: Vec::new(),
            metrics: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn with_selected_fields<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_fields = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metric(mut self, metric: InsightMetric) -> Self {
        self.metrics.push(metric);
        self
    }

    pub fn with_join(mut self, join: InsightJoin) -> Self {
        self.joins.push(join);
        self
    }

    pub fn with_filter(mut self, filter: InsightFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Base table id followed by joined table ids, without repeats.
    pub fn table_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = vec![self.base_table_id.as_str()];
        for join in &self.joins {
            if !ids.contains(&join.table_id.as_str()) {
                ids.push(join.table_id.as_str());
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_expressions() {
        assert_eq!(Aggregation::Sum.expression(Some("sales")), "sum(sales)");
        assert_eq!(Aggregation::Count.expression(Some("sales")), "count(*)");
        assert_eq!(
            Aggregation::CountDistinct.expression(Some("region")),
            "count(distinct region)"
        );
        assert_eq!(Aggregation::Max.expression(None), "count(*)");
    }

    #[test]
    fn test_table_ids_deduplicates_joins() {
        let insight = Insight::new("i1", "Sales", "orders")
            .with_join(InsightJoin {
                table_id: "customers".into(),
                left_column: "customer_id".into(),
                right_column: "id".into(),
                kind: JoinKind::Left,
            })
            .with_join(InsightJoin {
                table_id: "customers".into(),
                left_column: "referrer_id".into(),
                right_column: "id".into(),
                kind: JoinKind::Inner,
            });
        assert_eq!(insight.table_ids(), vec!["orders", "customers"]);
    }

    #[test]
    fn test_insight_deserializes_with_defaults() {
        let insight: Insight = serde_json::from_str(
            r#"{"id":"i1","name":"Totals","baseTableId":"t1",
                "metrics":[{"id":"m1","name":"n","aggregation":"count"},
                           {"id":"m2","name":"u","columnName":"user","aggregation":"count_distinct"}]}"#,
        )
        .unwrap();
        assert!(insight.selected_fields.is_empty());
        assert_eq!(insight.metrics[1].aggregation, Aggregation::CountDistinct);
        assert!(insight.filters.is_empty());
    }
}
