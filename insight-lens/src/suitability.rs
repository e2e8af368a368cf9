//! Column suitability checks for chart channels.
//!
//! These functions are the single decision surface for "can this column go on
//! this channel". The suggestion engine uses them to filter candidates and axis
//! pickers use them to warn about poor manual choices, so both always reach the
//! same verdict for the same input.
//!
//! # Example
//!
//! ```rust
//! use insight_lens::model::{ChartType, ColumnAnalysis, Semantic};
//! use insight_lens::suitability::{is_good_x_axis, is_good_y_axis};
//!
//! let region = ColumnAnalysis::categorical("region", 4);
//! let order_id = ColumnAnalysis::categorical("order_id", 4).with_semantic(Semantic::Identifier);
//!
//! assert!(is_good_x_axis(&region, ChartType::Bar, None, Some(100)).good);
//! let verdict = is_good_y_axis(&order_id, ChartType::Bar, None, Some(100));
//! assert!(!verdict.good);
//! assert!(verdict.reason.is_some());
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{ChartType, ColumnAnalysis, Encoding, Field, Semantic};

/// Highest cardinality a categorical X axis may have.
pub const CATEGORICAL_X_MAX: u64 = 50;
/// Fewest distinct values a color channel may have.
pub const COLOR_MIN: u64 = 2;
/// Most distinct values a color legend may have.
pub const COLOR_MAX: u64 = 10;
/// Highest cardinality of a numerical column used as discrete bar categories.
pub const NUMERIC_X_MAX_FOR_BAR: u64 = 20;
/// Columns with a larger null share are blocked.
pub const MAX_NULL_RATIO: f64 = 0.5;
/// Numerical columns with a larger zero share have no usable variance.
pub const MAX_ZERO_RATIO: f64 = 0.8;

/// Uniform verdict returned by every suitability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingEvaluation {
    pub good: bool,
    /// User-facing explanation, present only when `good` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EncodingEvaluation {
    pub fn good() -> Self {
        Self {
            good: true,
            reason: None,
        }
    }

    pub fn bad(reason: impl Into<String>) -> Self {
        Self {
            good: false,
            reason: Some(reason.into()),
        }
    }
}

static IDENTIFIER_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    [
        r"(?i)^(id|key|code|uuid|guid|pk|fk)$",
        r"(?i)[_\-\s.](id|key|code|uuid|guid)$",
        r"[a-z0-9](Id|ID|Key|Code|Uuid|UUID)$",
        r"(?i)^(id|key)[_\-]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Hard-coded regex pattern should be valid"))
    .collect()
});

/// True when the column name reads like an identifier, key or code.
pub fn looks_like_identifier(column_name: &str) -> bool {
    IDENTIFIER_NAME_PATTERNS
        .iter()
        .any(|re| re.is_match(column_name.trim()))
}

/// Rejects columns that must never be placed on a chart channel.
///
/// The boolean outcome does not depend on check order; the order only decides
/// which reason is reported.
pub fn is_blocked_column(
    col: &ColumnAnalysis,
    field: Option<&Field>,
    row_count: Option<u64>,
) -> EncodingEvaluation {
    if col.semantic.is_blocked() {
        return EncodingEvaluation::bad(format!(
            "'{}' is classified as {} and cannot be charted",
            col.column_name, col.semantic
        ));
    }

    if let Some(field) = field {
        if field.is_identifier {
            return EncodingEvaluation::bad(format!(
                "'{}' is marked as an identifier",
                field.name
            ));
        }
        if field.is_reference {
            return EncodingEvaluation::bad(format!(
                "'{}' is marked as a reference to another table",
                field.name
            ));
        }
    }

    if looks_like_identifier(&col.column_name) {
        return EncodingEvaluation::bad(format!(
            "'{}' looks like an identifier or code",
            col.column_name
        ));
    }

    if let Some(ratio) = col.null_ratio(row_count) {
        if ratio > MAX_NULL_RATIO {
            return EncodingEvaluation::bad(format!(
                "'{}' is {:.0}% empty",
                col.column_name,
                ratio * 100.0
            ));
        }
    }

    EncodingEvaluation::good()
}

/// Chart-type specific X axis rules.
pub fn is_good_x_axis(
    col: &ColumnAnalysis,
    chart_type: ChartType,
    field: Option<&Field>,
    row_count: Option<u64>,
) -> EncodingEvaluation {
    if chart_type == ChartType::Table {
        return EncodingEvaluation::good();
    }

    let blocked = is_blocked_column(col, field, row_count);
    if !blocked.good {
        return blocked;
    }

    let cardinality = col.cardinality;
    match chart_type {
        ChartType::Scatter | ChartType::Heatmap => {
            if col.semantic == Semantic::Numerical {
                EncodingEvaluation::good()
            } else {
                EncodingEvaluation::bad(format!(
                    "Scatter plots need a numerical X axis; '{}' is {}",
                    col.column_name, col.semantic
                ))
            }
        }
        ChartType::Histogram => {
            if col.semantic == Semantic::Numerical {
                has_numerical_variance(col, row_count)
            } else {
                EncodingEvaluation::bad(format!(
                    "Histograms bin numerical values; '{}' is {}",
                    col.column_name, col.semantic
                ))
            }
        }
        ChartType::Line | ChartType::Area => {
            if col.is_temporal() || col.semantic == Semantic::Numerical {
                EncodingEvaluation::good()
            } else if col.semantic.is_categorical_like() {
                if (2..=CATEGORICAL_X_MAX).contains(&cardinality) {
                    EncodingEvaluation::good()
                } else {
                    EncodingEvaluation::bad(format!(
                        "'{}' has {cardinality} distinct values; line charts over categories need 2 to {CATEGORICAL_X_MAX}",
                        col.column_name
                    ))
                }
            } else {
                EncodingEvaluation::bad(format!(
                    "'{}' is {} and has no natural order for a line",
                    col.column_name, col.semantic
                ))
            }
        }
        ChartType::Bar | ChartType::GroupedBar => {
            if col.is_temporal() {
                EncodingEvaluation::good()
            } else if col.semantic.is_categorical_like() {
                if cardinality > 1 && cardinality <= CATEGORICAL_X_MAX {
                    EncodingEvaluation::good()
                } else {
                    EncodingEvaluation::bad(format!(
                        "'{}' has {cardinality} distinct values; bar charts need 2 to {CATEGORICAL_X_MAX}",
                        col.column_name
                    ))
                }
            } else if col.semantic == Semantic::Numerical {
                if cardinality <= NUMERIC_X_MAX_FOR_BAR {
                    EncodingEvaluation::good()
                } else {
                    EncodingEvaluation::bad(format!(
                        "'{}' has {cardinality} distinct numbers; too many bars (max {NUMERIC_X_MAX_FOR_BAR})",
                        col.column_name
                    ))
                }
            } else {
                EncodingEvaluation::bad(format!(
                    "'{}' is {} and cannot form bar categories",
                    col.column_name, col.semantic
                ))
            }
        }
        ChartType::Table => EncodingEvaluation::good(),
    }
}

/// Y axis rules: every chart except table-like display needs a varying number.
pub fn is_good_y_axis(
    col: &ColumnAnalysis,
    chart_type: ChartType,
    field: Option<&Field>,
    row_count: Option<u64>,
) -> EncodingEvaluation {
    if chart_type == ChartType::Table {
        return EncodingEvaluation::good();
    }

    let blocked = is_blocked_column(col, field, row_count);
    if !blocked.good {
        return blocked;
    }

    if col.semantic != Semantic::Numerical {
        return EncodingEvaluation::bad(format!(
            "The Y axis needs a numerical column; '{}' is {}",
            col.column_name, col.semantic
        ));
    }

    has_numerical_variance(col, row_count)
}

/// Color channel rules, checked against the axes already in use.
pub fn is_good_color_column(
    col: &ColumnAnalysis,
    current_encoding: Option<&Encoding>,
) -> EncodingEvaluation {
    if let Some(encoding) = current_encoding {
        if encoding.uses_axis(&col.column_name) {
            return EncodingEvaluation::bad(format!(
                "'{}' is already used on an axis",
                col.column_name
            ));
        }
    }

    let blocked = is_blocked_column(col, None, None);
    if !blocked.good {
        return blocked;
    }

    // Numbers render as a gradient, so the legend size limit does not apply.
    if col.semantic == Semantic::Numerical {
        return EncodingEvaluation::good();
    }

    if col.is_temporal() {
        return EncodingEvaluation::bad(format!(
            "'{}' is temporal; dates have too many distinct values for a legend",
            col.column_name
        ));
    }

    if col.cardinality < COLOR_MIN || col.cardinality > COLOR_MAX {
        return EncodingEvaluation::bad(format!(
            "'{}' has {} distinct values; colors need {COLOR_MIN} to {COLOR_MAX}",
            col.column_name, col.cardinality
        ));
    }

    if col.semantic.is_categorical_like() {
        EncodingEvaluation::good()
    } else {
        EncodingEvaluation::bad(format!(
            "'{}' is {} and cannot be used for color",
            col.column_name, col.semantic
        ))
    }
}

/// Rejects numerical columns without usable spread.
pub fn has_numerical_variance(col: &ColumnAnalysis, row_count: Option<u64>) -> EncodingEvaluation {
    match col.numeric_range() {
        Some((min, max)) => {
            if min == max {
                return EncodingEvaluation::bad(format!(
                    "'{}' is constant ({min})",
                    col.column_name
                ));
            }
            if let (Some(zeros), Some(rows)) = (col.zero_count(), row_count) {
                if rows > 0 && zeros as f64 / rows as f64 > MAX_ZERO_RATIO {
                    return EncodingEvaluation::bad(format!(
                        "'{}' is mostly zeros",
                        col.column_name
                    ));
                }
            }
            EncodingEvaluation::good()
        }
        None => {
            if col.cardinality > 1 {
                EncodingEvaluation::good()
            } else {
                EncodingEvaluation::bad(format!(
                    "'{}' has a single distinct value",
                    col.column_name
                ))
            }
        }
    }
}
