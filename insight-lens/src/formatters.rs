//! Rendering of suggestion lists and preview tables.
//!
//! Three formatters share the [`SuggestionFormatter`] trait: JSON for
//! programmatic consumers, plain text for terminals and Markdown for
//! documentation.
//!
//! # Examples
//!
//! ```rust
//! use insight_lens::formatters::{HumanFormatter, SuggestionFormatter};
//! use insight_lens::model::ColumnAnalysis;
//! use insight_lens::suggestions::{SuggestionEngine, SuggestionInput};
//!
//! let columns = vec![
//!     ColumnAnalysis::categorical("region", 4),
//!     ColumnAnalysis::numerical("sales", 900, 1.0, 4_800.0),
//! ];
//! let suggestions = SuggestionEngine::new().suggest(&SuggestionInput::new(&columns));
//!
//! let text = HumanFormatter::new().format_suggestions(&suggestions).unwrap();
//! assert!(text.contains("Total sales by region"));
//! ```

use std::fmt::{self, Write};

use serde_json::Value;

use crate::aggregation::PreviewResult;
use crate::error::{InsightError, Result};
use crate::model::ChartSuggestion;

/// Configuration options for formatting.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the rationale of every suggestion
    pub include_rationale: bool,
    /// Include the heuristic score
    pub include_scores: bool,
    /// Maximum number of suggestions to display (`None` for all)
    pub max_suggestions: Option<usize>,
    /// Maximum number of preview rows to display (`None` for all)
    pub max_rows: Option<usize>,
    /// Whether to use colorized output (human formatter only)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_rationale: true,
            include_scores: false,
            max_suggestions: None,
            max_rows: Some(20),
            use_colors: true,
        }
    }
}

impl FormatterConfig {
    /// Titles and chart types only.
    pub fn minimal() -> Self {
        Self {
            include_rationale: false,
            include_scores: false,
            max_suggestions: Some(5),
            max_rows: Some(5),
            use_colors: false,
        }
    }

    /// Everything, including scores.
    pub fn detailed() -> Self {
        Self {
            include_rationale: true,
            include_scores: true,
            max_suggestions: None,
            max_rows: None,
            use_colors: true,
        }
    }

    pub fn with_rationale(mut self, include: bool) -> Self {
        self.include_rationale = include;
        self
    }

    pub fn with_scores(mut self, include: bool) -> Self {
        self.include_scores = include;
        self
    }

    pub fn with_max_suggestions(mut self, max: Option<usize>) -> Self {
        self.max_suggestions = max;
        self
    }

    pub fn with_max_rows(mut self, max: Option<usize>) -> Self {
        self.max_rows = max;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn suggestion_limit(&self, len: usize) -> usize {
        self.max_suggestions.map_or(len, |max| max.min(len))
    }

    fn row_limit(&self, len: usize) -> usize {
        self.max_rows.map_or(len, |max| max.min(len))
    }
}

/// Formats engine output into a string representation.
pub trait SuggestionFormatter {
    /// Formats a ranked suggestion list.
    fn format_suggestions(&self, suggestions: &[ChartSuggestion]) -> Result<String>;

    /// Formats an aggregation preview.
    fn format_preview(&self, preview: &PreviewResult) -> Result<String>;
}

fn write_failed(err: fmt::Error) -> InsightError {
    InsightError::internal(format!("Failed to write formatted output: {err}"))
}

/// Display form of a cell.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Formats output as structured JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn to_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        out.map_err(|e| InsightError::internal(format!("Failed to serialize to JSON: {e}")))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionFormatter for JsonFormatter {
    fn format_suggestions(&self, suggestions: &[ChartSuggestion]) -> Result<String> {
        let shown = &suggestions[..self.config.suggestion_limit(suggestions.len())];
        let mut values = Vec::with_capacity(shown.len());
        for suggestion in shown {
            let mut value = serde_json::to_value(suggestion)?;
            if let Value::Object(map) = &mut value {
                if !self.config.include_rationale {
                    map.remove("rationale");
                }
                if !self.config.include_scores {
                    map.remove("score");
                }
            }
            values.push(value);
        }
        self.to_json(&values)
    }

    fn format_preview(&self, preview: &PreviewResult) -> Result<String> {
        let limit = self.config.row_limit(preview.data_frame.rows.len());
        if limit == preview.data_frame.rows.len() {
            return self.to_json(preview);
        }
        let mut trimmed = preview.clone();
        trimmed.data_frame.rows.truncate(limit);
        self.to_json(&trimmed)
    }
}

/// Formats output for terminals.
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render_suggestions(&self, out: &mut String, suggestions: &[ChartSuggestion]) -> fmt::Result {
        let config = &self.config;
        if suggestions.is_empty() {
            writeln!(out, "No chart suggestions.")?;
            return Ok(());
        }

        writeln!(out, "Chart suggestions ({}):", suggestions.len())?;
        for (rank, s) in suggestions
            .iter()
            .take(config.suggestion_limit(suggestions.len()))
            .enumerate()
        {
            writeln!(out)?;
            if config.use_colors {
                writeln!(out, "{:>2}. \x1b[1m{}\x1b[0m [{}]", rank + 1, s.title, s.chart_type)?;
            } else {
                writeln!(out, "{:>2}. {} [{}]", rank + 1, s.title, s.chart_type)?;
            }
            writeln!(
                out,
                "    x: {}  y: {}{}",
                s.encoding.x.as_deref().unwrap_or("-"),
                s.encoding.y.as_deref().unwrap_or("-"),
                s.encoding
                    .color
                    .as_deref()
                    .map(|c| format!("  color: {c}"))
                    .unwrap_or_default()
            )?;
            if !s.new_fields.is_empty() {
                writeln!(out, "    adds: {}", s.new_fields.join(", "))?;
            }
            if config.include_rationale {
                if let Some(rationale) = &s.rationale {
                    writeln!(out, "    why: {rationale}")?;
                }
            }
            if config.include_scores {
                writeln!(out, "    score: {:.2}", s.score)?;
            }
        }
        Ok(())
    }

    fn render_preview(&self, out: &mut String, preview: &PreviewResult) -> fmt::Result {
        let frame = &preview.data_frame;
        let shown = &frame.rows[..self.config.row_limit(frame.rows.len())];

        let headers: Vec<&str> = frame.columns.iter().map(|c| c.name.as_str()).collect();
        let cells: Vec<Vec<String>> = shown
            .iter()
            .map(|row| headers.iter().map(|h| cell(row.get(*h))).collect())
            .collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |out: &mut String, values: Vec<&str>| -> fmt::Result {
            let padded: Vec<String> = values
                .iter()
                .zip(&widths)
                .map(|(v, &w)| format!("{v:<w$}"))
                .collect();
            writeln!(out, "{}", padded.join(" | ").trim_end())
        };

        line(&mut *out, headers.clone())?;
        writeln!(
            out,
            "{}",
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-")
        )?;
        for row in &cells {
            line(&mut *out, row.iter().map(String::as_str).collect())?;
        }
        writeln!(
            out,
            "({} of {} rows)",
            shown.len(),
            preview.row_count
        )
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionFormatter for HumanFormatter {
    fn format_suggestions(&self, suggestions: &[ChartSuggestion]) -> Result<String> {
        let mut out = String::new();
        self.render_suggestions(&mut out, suggestions)
            .map_err(write_failed)?;
        Ok(out)
    }

    fn format_preview(&self, preview: &PreviewResult) -> Result<String> {
        let mut out = String::new();
        self.render_preview(&mut out, preview).map_err(write_failed)?;
        Ok(out)
    }
}

/// Formats output as Markdown.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    fn render_suggestions(&self, out: &mut String, suggestions: &[ChartSuggestion]) -> fmt::Result {
        let h = "#".repeat(self.heading_level as usize);
        writeln!(out, "{h} Chart Suggestions")?;
        writeln!(out)?;
        if suggestions.is_empty() {
            writeln!(out, "_No suggestions._")?;
            return Ok(());
        }

        let mut header = String::from("| # | Title | Chart | X | Y | Color |");
        let mut rule = String::from("|---|-------|-------|---|---|-------|");
        if self.config.include_scores {
            header.push_str(" Score |");
            rule.push_str("-------|");
        }
        writeln!(out, "{header}")?;
        writeln!(out, "{rule}")?;

        let shown = self.config.suggestion_limit(suggestions.len());
        for (rank, s) in suggestions.iter().take(shown).enumerate() {
            write!(
                out,
                "| {} | {} | {} | {} | {} | {} |",
                rank + 1,
                s.title.replace('|', "\\|"),
                s.chart_type,
                s.encoding.x.as_deref().unwrap_or(""),
                s.encoding.y.as_deref().unwrap_or(""),
                s.encoding.color.as_deref().unwrap_or("")
            )?;
            if self.config.include_scores {
                write!(out, " {:.2} |", s.score)?;
            }
            writeln!(out)?;
        }

        if self.config.include_rationale {
            writeln!(out)?;
            for (rank, s) in suggestions.iter().take(shown).enumerate() {
                if let Some(rationale) = &s.rationale {
                    writeln!(out, "{}. **{}**: {}", rank + 1, s.title, rationale)?;
                }
            }
        }
        Ok(())
    }

    fn render_preview(&self, out: &mut String, preview: &PreviewResult) -> fmt::Result {
        let h = "#".repeat(self.heading_level as usize);
        let frame = &preview.data_frame;
        writeln!(out, "{h} Preview")?;
        writeln!(out)?;

        let headers: Vec<&str> = frame.columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(out, "| {} |", headers.join(" | "))?;
        writeln!(
            out,
            "|{}|",
            headers.iter().map(|_| "---").collect::<Vec<_>>().join("|")
        )?;
        for row in frame.rows.iter().take(self.config.row_limit(frame.rows.len())) {
            let cells: Vec<String> = headers
                .iter()
                .map(|h| cell(row.get(*h)).replace('|', "\\|"))
                .collect();
            writeln!(out, "| {} |", cells.join(" | "))?;
        }
        if preview.is_truncated() {
            writeln!(out)?;
            writeln!(
                out,
                "_Showing {} of {} rows._",
                preview.sample_size, preview.row_count
            )?;
        }
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SuggestionFormatter for MarkdownFormatter {
    fn format_suggestions(&self, suggestions: &[ChartSuggestion]) -> Result<String> {
        let mut out = String::new();
        self.render_suggestions(&mut out, suggestions)
            .map_err(write_failed)?;
        Ok(out)
    }

    fn format_preview(&self, preview: &PreviewResult) -> Result<String> {
        let mut out = String::new();
        self.render_preview(&mut out, preview).map_err(write_failed)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{DataFrame, DataFrameColumn};
    use crate::model::{ChartType, Encoding, FieldType, Row};
    use serde_json::json;

    fn suggestion() -> ChartSuggestion {
        ChartSuggestion {
            id: "bar:region|sales|".to_string(),
            title: "Total sales by region".to_string(),
            chart_type: ChartType::Bar,
            encoding: Encoding::xy("region", "sales"),
            rationale: Some("region has 4 categories".to_string()),
            new_fields: vec!["region".to_string()],
            uses_existing_fields_only: false,
            x_transform: None,
            y_transform: None,
            score: 6.0,
        }
    }

    fn preview() -> PreviewResult {
        let rows: Vec<Row> = vec![
            json!({"region": "North", "total": 250}),
            json!({"region": "South", "total": 50}),
            json!({"region": null, "total": 5}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
        PreviewResult {
            data_frame: DataFrame {
                columns: vec![
                    DataFrameColumn {
                        name: "region".to_string(),
                        column_type: FieldType::String,
                    },
                    DataFrameColumn {
                        name: "total".to_string(),
                        column_type: FieldType::Number,
                    },
                ],
                rows,
            },
            row_count: 7,
            sample_size: 3,
        }
    }

    #[test]
    fn test_json_formatter_drops_hidden_fields() {
        let out = JsonFormatter::new()
            .with_pretty(false)
            .format_suggestions(&[suggestion()])
            .unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["chartType"], "bar");
        assert!(parsed[0].get("score").is_none());
        assert!(parsed[0].get("rationale").is_some());
    }

    #[test]
    fn test_json_preview_row_limit() {
        let out = JsonFormatter::with_config(FormatterConfig::default().with_max_rows(Some(1)))
            .format_preview(&preview())
            .unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["dataFrame"]["rows"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["rowCount"], 7);
    }

    #[test]
    fn test_human_formatter() {
        let formatter = HumanFormatter::with_config(FormatterConfig::detailed().with_colors(false));
        let out = formatter.format_suggestions(&[suggestion()]).unwrap();
        assert!(out.contains(" 1. Total sales by region [bar]"));
        assert!(out.contains("adds: region"));
        assert!(out.contains("score: 6.00"));

        let empty = formatter.format_suggestions(&[]).unwrap();
        assert_eq!(empty.trim(), "No chart suggestions.");

        let table = formatter.format_preview(&preview()).unwrap();
        assert!(table.starts_with("region | total"));
        assert!(table.contains("North  | 250"));
        assert!(table.contains("(3 of 7 rows)"));
    }

    #[test]
    fn test_markdown_formatter() {
        let formatter = MarkdownFormatter::new().with_heading_level(3);
        let out = formatter.format_suggestions(&[suggestion()]).unwrap();
        assert!(out.starts_with("### Chart Suggestions"));
        assert!(out.contains("| 1 | Total sales by region | bar | region | sales |  |"));
        assert!(out.contains("1. **Total sales by region**: region has 4 categories"));

        let table = formatter.format_preview(&preview()).unwrap();
        assert!(table.contains("| region | total |"));
        assert!(table.contains("|  | 5 |"));
        assert!(table.contains("_Showing 3 of 7 rows._"));
    }
}
