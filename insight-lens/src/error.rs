//! Error types for the insight-lens library.
//!
//! The aggregation, merging and suggestion pipelines degrade silently and never
//! return errors; `InsightError` covers the fallible edges around them, namely
//! configuration loading and parsing of user supplied identifiers.

use thiserror::Error;

/// The main error type for the insight-lens library.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Invalid configuration or parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A chart type name that does not map to a known chart type.
    #[error("Unknown chart type '{0}'")]
    UnknownChartType(String),

    /// An analytical tag name that does not map to a known tag.
    #[error("Unknown analytical tag '{0}'")]
    UnknownTag(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, InsightError>`.
pub type Result<T> = std::result::Result<T, InsightError>;

impl InsightError {
    /// Creates an invalid configuration error with the given message.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<serde_json::Error> for InsightError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
