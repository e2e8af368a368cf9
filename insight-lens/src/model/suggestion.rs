//! Chart suggestion output types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::InsightError;
use crate::model::Aggregation;

/// Pseudo column used on the Y channel of count-based charts.
pub const COUNT_FIELD: &str = "*";

/// Chart types the suggestion engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    GroupedBar,
    Line,
    Area,
    Scatter,
    /// Binned density rendering of a scatter plot for large row counts.
    Heatmap,
    Histogram,
    /// Table-like display; accepts any column on any channel.
    Table,
}

impl ChartType {
    /// Chart types produced by a default suggestion run.
    pub const DEFAULT_SET: [ChartType; 5] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Area,
        ChartType::Scatter,
        ChartType::GroupedBar,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::GroupedBar => "grouped_bar",
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Scatter => "scatter",
            ChartType::Heatmap => "heatmap",
            ChartType::Histogram => "histogram",
            ChartType::Table => "table",
        }
    }

    /// Ranking priority; lower sorts first (line/area, then bar, then scatter).
    pub fn priority(&self) -> u8 {
        match self {
            ChartType::Line | ChartType::Area => 0,
            ChartType::Bar | ChartType::GroupedBar | ChartType::Histogram => 1,
            ChartType::Scatter | ChartType::Heatmap => 2,
            ChartType::Table => 3,
        }
    }

    /// Scatter-like charts place numbers on both axes.
    pub fn is_scatter_like(&self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Heatmap)
    }

    pub fn is_bar_like(&self) -> bool {
        matches!(
            self,
            ChartType::Bar | ChartType::GroupedBar | ChartType::Histogram
        )
    }

    pub fn is_line_like(&self) -> bool {
        matches!(self, ChartType::Line | ChartType::Area)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "bar" => Ok(ChartType::Bar),
            "grouped_bar" | "groupedbar" => Ok(ChartType::GroupedBar),
            "line" => Ok(ChartType::Line),
            "area" => Ok(ChartType::Area),
            "scatter" | "point" => Ok(ChartType::Scatter),
            "heatmap" => Ok(ChartType::Heatmap),
            "histogram" => Ok(ChartType::Histogram),
            "table" => Ok(ChartType::Table),
            _ => Err(InsightError::UnknownChartType(s.to_string())),
        }
    }
}

/// Calendar bucket for temporal axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// A transform applied to a channel before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transform {
    Aggregate { op: Aggregation },
    Bin { max_bins: u32 },
    TimeUnit { unit: TimeUnit },
}

/// Mapping of chart channels to columns or aggregate expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Encoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl Encoding {
    pub fn xy(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
            color: None,
            size: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// `x|y|color` key used to deduplicate suggestions.
    pub fn signature(&self) -> String {
        format!(
            "{}|{}|{}",
            self.x.as_deref().unwrap_or(""),
            self.y.as_deref().unwrap_or(""),
            self.color.as_deref().unwrap_or("")
        )
    }

    /// True when `column` already occupies the x or y channel.
    pub fn uses_axis(&self, column: &str) -> bool {
        self.x.as_deref() == Some(column) || self.y.as_deref() == Some(column)
    }

    /// Column names on every channel, excluding the count pseudo column.
    pub fn columns(&self) -> Vec<&str> {
        [&self.x, &self.y, &self.color, &self.size]
            .into_iter()
            .filter_map(|c| c.as_deref())
            .filter(|c| *c != COUNT_FIELD)
            .collect()
    }

    pub fn has_color(&self) -> bool {
        self.color.is_some()
    }
}

/// A ranked, ready-to-apply encoding proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSuggestion {
    pub id: String,
    pub title: String,
    pub chart_type: ChartType,
    pub encoding: Encoding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// Encoding columns that are not already part of the insight.
    #[serde(default)]
    pub new_fields: Vec<String>,
    #[serde(default)]
    pub uses_existing_fields_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_transform: Option<Transform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_transform: Option<Transform>,
    /// Composite heuristic score the suggestion was selected with.
    #[serde(default)]
    pub score: f64,
}

impl ChartSuggestion {
    pub fn signature(&self) -> String {
        self.encoding.signature()
    }
}

/// Analytical intent for tag-scoped suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticalTag {
    Comparison,
    Trend,
    Correlation,
    Distribution,
}

impl AnalyticalTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticalTag::Comparison => "comparison",
            AnalyticalTag::Trend => "trend",
            AnalyticalTag::Correlation => "correlation",
            AnalyticalTag::Distribution => "distribution",
        }
    }
}

impl fmt::Display for AnalyticalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalyticalTag {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comparison" => Ok(AnalyticalTag::Comparison),
            "trend" => Ok(AnalyticalTag::Trend),
            "correlation" => Ok(AnalyticalTag::Correlation),
            "distribution" => Ok(AnalyticalTag::Distribution),
            _ => Err(InsightError::UnknownTag(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding_signature() {
        let enc = Encoding::xy("region", "sales");
        assert_eq!(enc.signature(), "region|sales|");
        assert_eq!(enc.with_color("segment").signature(), "region|sales|segment");
        assert_eq!(Encoding::default().signature(), "||");
    }

    #[test]
    fn test_encoding_columns_skip_count() {
        let enc = Encoding::xy("region", COUNT_FIELD).with_color("segment");
        assert_eq!(enc.columns(), vec!["region", "segment"]);
        assert!(enc.uses_axis("region"));
        assert!(!enc.uses_axis("segment"));
    }

    #[test]
    fn test_chart_type_parsing() {
        assert_eq!("Bar".parse::<ChartType>().unwrap(), ChartType::Bar);
        assert_eq!(
            "grouped-bar".parse::<ChartType>().unwrap(),
            ChartType::GroupedBar
        );
        assert!(matches!(
            "pie".parse::<ChartType>(),
            Err(InsightError::UnknownChartType(_))
        ));
    }

    #[test]
    fn test_chart_type_priority_order() {
        assert!(ChartType::Line.priority() < ChartType::Bar.priority());
        assert_eq!(ChartType::Line.priority(), ChartType::Area.priority());
        assert!(ChartType::Bar.priority() < ChartType::Scatter.priority());
    }

    #[test]
    fn test_tag_parsing() {
        assert_eq!(" Trend ".parse::<AnalyticalTag>().unwrap(), AnalyticalTag::Trend);
        assert!("story".parse::<AnalyticalTag>().is_err());
    }

    #[test]
    fn test_transform_serialization() {
        let t = Transform::Aggregate {
            op: Aggregation::Sum,
        };
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["type"], "aggregate");
        assert_eq!(json["op"], "sum");
    }
}
