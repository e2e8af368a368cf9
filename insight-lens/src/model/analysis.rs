//! Precomputed column statistics supplied by the external analytical engine.
//!
//! A [`ColumnAnalysis`] shares a base shape across all physical types and
//! carries type-specific statistics in [`ColumnDetails`], tagged by `dataType`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of what a column means, independent of its storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semantic {
    Categorical,
    Numerical,
    Temporal,
    Boolean,
    Identifier,
    Reference,
    Email,
    Url,
    Uuid,
    Text,
}

impl Semantic {
    /// Semantics that can never be placed on a chart channel.
    pub fn is_blocked(&self) -> bool {
        matches!(
            self,
            Semantic::Identifier
                | Semantic::Reference
                | Semantic::Email
                | Semantic::Url
                | Semantic::Uuid
        )
    }

    /// Semantics that behave like discrete categories.
    pub fn is_categorical_like(&self) -> bool {
        matches!(
            self,
            Semantic::Categorical | Semantic::Text | Semantic::Boolean
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Semantic::Categorical => "categorical",
            Semantic::Numerical => "numerical",
            Semantic::Temporal => "temporal",
            Semantic::Boolean => "boolean",
            Semantic::Identifier => "identifier",
            Semantic::Reference => "reference",
            Semantic::Email => "email",
            Semantic::Url => "url",
            Semantic::Uuid => "uuid",
            Semantic::Text => "text",
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical data type discriminant of a [`ColumnAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Number,
    Date,
    Boolean,
}

/// Type-specific statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "lowercase")]
pub enum ColumnDetails {
    #[serde(rename_all = "camelCase")]
    String {
        /// Share of rows holding the most frequent value.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_frequency_ratio: Option<f64>,
    },
    #[serde(rename_all = "camelCase")]
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        std_dev: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zero_count: Option<u64>,
    },
    #[serde(rename_all = "camelCase")]
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_date: Option<DateTime<Utc>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_date: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    Boolean {
        #[serde(default)]
        true_count: u64,
        #[serde(default)]
        false_count: u64,
    },
}

/// Statistics and semantic classification for one physical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnAnalysis {
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    pub semantic: Semantic,
    pub cardinality: u64,
    #[serde(default)]
    pub null_count: u64,
    #[serde(default)]
    pub sample_values: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub details: ColumnDetails,
}

impl ColumnAnalysis {
    /// Creates an analysis with empty statistics for the given variant.
    pub fn new(
        column_name: impl Into<String>,
        semantic: Semantic,
        cardinality: u64,
        details: ColumnDetails,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            field_id: None,
            semantic,
            cardinality,
            null_count: 0,
            sample_values: Vec::new(),
            details,
        }
    }

    /// A numerical column with a known value range.
    pub fn numerical(column_name: impl Into<String>, cardinality: u64, min: f64, max: f64) -> Self {
        Self::new(
            column_name,
            Semantic::Numerical,
            cardinality,
            ColumnDetails::Number {
                min: Some(min),
                max: Some(max),
                std_dev: None,
                zero_count: Some(0),
            },
        )
    }

    /// A categorical string column.
    pub fn categorical(column_name: impl Into<String>, cardinality: u64) -> Self {
        Self::new(
            column_name,
            Semantic::Categorical,
            cardinality,
            ColumnDetails::String {
                max_frequency_ratio: None,
            },
        )
    }

    /// A temporal date column.
    pub fn temporal(column_name: impl Into<String>, cardinality: u64) -> Self {
        Self::new(
            column_name,
            Semantic::Temporal,
            cardinality,
            ColumnDetails::Date {
                min_date: None,
                max_date: None,
            },
        )
    }

    /// A boolean column.
    pub fn boolean(column_name: impl Into<String>, true_count: u64, false_count: u64) -> Self {
        let cardinality = u64::from(true_count > 0) + u64::from(false_count > 0);
        Self::new(
            column_name,
            Semantic::Boolean,
            cardinality,
            ColumnDetails::Boolean {
                true_count,
                false_count,
            },
        )
    }

    pub fn with_field_id(mut self, field_id: impl Into<String>) -> Self {
        self.field_id = Some(field_id.into());
        self
    }

    pub fn with_semantic(mut self, semantic: Semantic) -> Self {
        self.semantic = semantic;
        self
    }

    pub fn with_null_count(mut self, null_count: u64) -> Self {
        self.null_count = null_count;
        self
    }

    pub fn with_sample_values(mut self, values: Vec<serde_json::Value>) -> Self {
        self.sample_values = values;
        self
    }

    /// Sets the zero count on a number column; other variants are left untouched.
    pub fn with_zero_count(mut self, count: u64) -> Self {
        if let ColumnDetails::Number { zero_count, .. } = &mut self.details {
            *zero_count = Some(count);
        }
        self
    }

    /// Sets the dominant-value ratio on a string column; other variants are left untouched.
    pub fn with_max_frequency_ratio(mut self, ratio: f64) -> Self {
        if let ColumnDetails::String {
            max_frequency_ratio,
        } = &mut self.details
        {
            *max_frequency_ratio = Some(ratio);
        }
        self
    }

    pub fn data_type(&self) -> DataType {
        match self.details {
            ColumnDetails::String { .. } => DataType::String,
            ColumnDetails::Number { .. } => DataType::Number,
            ColumnDetails::Date { .. } => DataType::Date,
            ColumnDetails::Boolean { .. } => DataType::Boolean,
        }
    }

    /// `(min, max)` of a number column when both are known.
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        match self.details {
            ColumnDetails::Number {
                min: Some(min),
                max: Some(max),
                ..
            } => Some((min, max)),
            _ => None,
        }
    }

    pub fn zero_count(&self) -> Option<u64> {
        match self.details {
            ColumnDetails::Number { zero_count, .. } => zero_count,
            _ => None,
        }
    }

    pub fn max_frequency_ratio(&self) -> Option<f64> {
        match self.details {
            ColumnDetails::String {
                max_frequency_ratio,
            } => max_frequency_ratio,
            _ => None,
        }
    }

    /// Temporal either by semantic or by physical date type.
    pub fn is_temporal(&self) -> bool {
        self.semantic == Semantic::Temporal || self.data_type() == DataType::Date
    }

    /// Share of null values, or `None` when the row count is unknown or zero.
    pub fn null_ratio(&self, row_count: Option<u64>) -> Option<f64> {
        match row_count {
            Some(rows) if rows > 0 => Some(self.null_count as f64 / rows as f64),
            _ => None,
        }
    }

    /// Share of non-null values; a column with unknown row count counts as complete.
    pub fn fill_rate(&self, row_count: Option<u64>) -> f64 {
        self.null_ratio(row_count)
            .map(|ratio| (1.0 - ratio).clamp(0.0, 1.0))
            .unwrap_or(1.0)
    }
}

/// Column statistics for one physical table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFrameAnalysis {
    pub columns: Vec<ColumnAnalysis>,
    pub row_count: u64,
    pub analyzed_at: DateTime<Utc>,
    /// Fingerprint of the field set the analysis was computed for.
    pub field_hash: String,
}

impl DataFrameAnalysis {
    pub fn new(columns: Vec<ColumnAnalysis>, row_count: u64, field_hash: impl Into<String>) -> Self {
        Self {
            columns,
            row_count,
            analyzed_at: Utc::now(),
            field_hash: field_hash.into(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnAnalysis> {
        self.columns.iter().find(|c| c.column_name == name)
    }
}

/// Sorted, comma-joined field ids. Changes whenever the field set changes.
pub fn field_hash<I, S>(field_ids: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ids: Vec<String> = field_ids
        .into_iter()
        .map(|id| id.as_ref().to_string())
        .collect();
    ids.sort();
    ids.join(",")
}
