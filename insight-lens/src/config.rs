//! Policy knobs of the chart suggestion engine.
//!
//! Every field has a default, so a partial JSON document is a valid
//! configuration:
//!
//! ```rust
//! use insight_lens::config::SuggestionConfig;
//!
//! let config = SuggestionConfig::from_json_str(r#"{ "seed": 42, "top_k": 3 }"#).unwrap();
//! assert_eq!(config.seed, 42);
//! assert_eq!(config.max_suggestions, 8);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};
use crate::model::ChartType;

/// Color columns whose most frequent value covers more rows than this are excluded.
pub const MAX_DOMINANT_COLOR_RATIO: f64 = 0.7;

/// Above this many rows scatter plots are suggested as binned heatmaps.
pub const SCATTER_POINT_CEILING: u64 = 5_000;

/// Number of bins used by histogram and density suggestions.
pub const DEFAULT_MAX_BINS: u32 = 20;

/// Configuration for [`SuggestionEngine`](crate::suggestions::SuggestionEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Seed of the LCG used for shuffling and tie-breaking.
    pub seed: i64,
    /// Upper bound on the ranked result.
    pub max_suggestions: usize,
    /// Suggestions accepted per chart type.
    pub max_per_chart_type: usize,
    /// Size of the pool the weighted draw picks from.
    pub top_k: usize,
    /// Chart types generated by [`suggest`](crate::suggestions::SuggestionEngine::suggest), in order.
    pub chart_types: Vec<ChartType>,
    pub scatter_point_ceiling: u64,
    pub max_dominant_color_ratio: f64,
    pub max_bins: u32,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_suggestions: 8,
            max_per_chart_type: 2,
            top_k: 5,
            chart_types: ChartType::DEFAULT_SET.to_vec(),
            scatter_point_ceiling: SCATTER_POINT_CEILING,
            max_dominant_color_ratio: MAX_DOMINANT_COLOR_RATIO,
            max_bins: DEFAULT_MAX_BINS,
        }
    }
}

impl SuggestionConfig {
    /// Wider exploration: more chart types and more picks per type.
    pub fn exploratory() -> Self {
        Self {
            max_suggestions: 16,
            max_per_chart_type: 4,
            top_k: 8,
            chart_types: vec![
                ChartType::Bar,
                ChartType::Line,
                ChartType::Area,
                ChartType::Scatter,
                ChartType::GroupedBar,
                ChartType::Histogram,
            ],
            ..Self::default()
        }
    }

    /// A short list of the strongest candidates.
    pub fn focused() -> Self {
        Self {
            max_suggestions: 4,
            max_per_chart_type: 1,
            top_k: 2,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    pub fn with_max_per_chart_type(mut self, max: usize) -> Self {
        self.max_per_chart_type = max;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_chart_types(mut self, chart_types: impl IntoIterator<Item = ChartType>) -> Self {
        self.chart_types = chart_types.into_iter().collect();
        self
    }

    pub fn with_scatter_point_ceiling(mut self, ceiling: u64) -> Self {
        self.scatter_point_ceiling = ceiling;
        self
    }

    pub fn with_max_dominant_color_ratio(mut self, ratio: f64) -> Self {
        self.max_dominant_color_ratio = ratio;
        self
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every bound is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_suggestions == 0 {
            return Err(InsightError::invalid_config(
                "max_suggestions must be greater than 0",
            ));
        }
        if self.max_per_chart_type == 0 {
            return Err(InsightError::invalid_config(
                "max_per_chart_type must be greater than 0",
            ));
        }
        if self.top_k == 0 {
            return Err(InsightError::invalid_config("top_k must be greater than 0"));
        }
        if self.chart_types.is_empty() {
            return Err(InsightError::invalid_config(
                "at least one chart type is required",
            ));
        }
        if !(0.0..=1.0).contains(&self.max_dominant_color_ratio) {
            return Err(InsightError::invalid_config(format!(
                "max_dominant_color_ratio must be within [0, 1], got {}",
                self.max_dominant_color_ratio
            )));
        }
        if self.max_bins < 2 {
            return Err(InsightError::invalid_config("max_bins must be at least 2"));
        }
        Ok(())
    }
}
