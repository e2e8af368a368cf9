//! Merging of per-table column analyses for joined insights.
//!
//! Joined-table columns arrive pre-aliased to be globally unique, so a repeated
//! column name means the same physical column was analysed twice. The first
//! occurrence wins and later ones are dropped.
//!
//! # Example
//!
//! ```rust
//! use insight_lens::merge::merge_analyses;
//! use insight_lens::model::{ColumnAnalysis, DataFrameAnalysis};
//!
//! let orders = DataFrameAnalysis::new(
//!     vec![ColumnAnalysis::numerical("sales", 90, 1.0, 900.0)],
//!     100,
//!     "f1",
//! );
//! let customers = DataFrameAnalysis::new(
//!     vec![ColumnAnalysis::categorical("segment", 3)],
//!     40,
//!     "f9",
//! );
//!
//! let merged = merge_analyses([&orders, &customers]);
//! assert_eq!(merged.names(), vec!["sales", "segment"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, instrument};

use crate::model::{ColumnAnalysis, DataFrameAnalysis};

/// Ordered, de-duplicated column list produced by [`merge_analyses`].
///
/// A single input table is returned as a borrow of its own column slice, so a
/// no-op merge never copies.
#[derive(Debug, Clone, PartialEq)]
pub enum MergedColumns<'a> {
    /// The column slice of the only input analysis.
    Borrowed(&'a [ColumnAnalysis]),
    /// Columns gathered across several analyses.
    Merged(Vec<&'a ColumnAnalysis>),
}

impl<'a> MergedColumns<'a> {
    pub fn len(&self) -> usize {
        match self {
            MergedColumns::Borrowed(cols) => cols.len(),
            MergedColumns::Merged(cols) => cols.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&'a ColumnAnalysis> {
        match self {
            MergedColumns::Borrowed(cols) => cols.get(index),
            MergedColumns::Merged(cols) => cols.get(index).copied(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a ColumnAnalysis> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// The underlying slice when the merge was a no-op.
    pub fn as_slice(&self) -> Option<&'a [ColumnAnalysis]> {
        match self {
            MergedColumns::Borrowed(cols) => Some(cols),
            MergedColumns::Merged(_) => None,
        }
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.iter().map(|c| c.column_name.as_str()).collect()
    }

    pub fn to_vec(&self) -> Vec<&'a ColumnAnalysis> {
        self.iter().collect()
    }

    pub fn into_owned(self) -> Vec<ColumnAnalysis> {
        self.iter().cloned().collect()
    }
}

/// Combines column analyses of a base table and its joined tables.
///
/// Tables are visited in input order; column order follows first appearance.
#[instrument(skip(analyses))]
pub fn merge_analyses<'a, I>(analyses: I) -> MergedColumns<'a>
where
    I: IntoIterator<Item = &'a DataFrameAnalysis>,
{
    let analyses: Vec<&'a DataFrameAnalysis> = analyses.into_iter().collect();

    match analyses.as_slice() {
        [] => MergedColumns::Merged(Vec::new()),
        [single] => MergedColumns::Borrowed(single.columns.as_slice()),
        _ => {
            let capacity = analyses.iter().map(|a| a.columns.len()).sum();
            let mut seen: HashSet<&str> = HashSet::with_capacity(capacity);
            let mut merged = Vec::with_capacity(capacity);

            for (table_index, analysis) in analyses.iter().enumerate() {
                for column in &analysis.columns {
                    if seen.insert(column.column_name.as_str()) {
                        merged.push(column);
                    } else {
                        debug!(
                            column = column.column_name,
                            table_index, "Dropping duplicate column from merged analysis"
                        );
                    }
                }
            }

            debug!(
                tables = analyses.len(),
                columns = merged.len(),
                "Merged column analyses"
            );
            MergedColumns::Merged(merged)
        }
    }
}

/// A table's cached analysis, if any, paired with the table id.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisEntry<'a> {
    pub id: &'a str,
    pub analysis: Option<&'a DataFrameAnalysis>,
}

impl<'a> AnalysisEntry<'a> {
    pub fn new(id: &'a str, analysis: Option<&'a DataFrameAnalysis>) -> Self {
        Self { id, analysis }
    }
}

/// Why an analysis entry failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Missing,
    HashMismatch,
    Empty,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::Missing => "missing",
            InvalidReason::HashMismatch => "hash_mismatch",
            InvalidReason::Empty => "empty",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks one entry. An id absent from `expected_hashes` has no freshness requirement.
pub fn validate_entry(
    entry: &AnalysisEntry<'_>,
    expected_hashes: &HashMap<String, String>,
) -> Result<(), InvalidReason> {
    let analysis = entry.analysis.ok_or(InvalidReason::Missing)?;

    if let Some(expected) = expected_hashes.get(entry.id) {
        if *expected != analysis.field_hash {
            return Err(InvalidReason::HashMismatch);
        }
    }

    if analysis.columns.is_empty() {
        return Err(InvalidReason::Empty);
    }

    Ok(())
}

/// Returns the first failing table id and reason, if any.
pub fn first_invalid<'a>(
    entries: &[AnalysisEntry<'a>],
    expected_hashes: &HashMap<String, String>,
) -> Option<(&'a str, InvalidReason)> {
    entries.iter().find_map(|entry| {
        validate_entry(entry, expected_hashes)
            .err()
            .map(|reason| (entry.id, reason))
    })
}

/// True when every entry is present, fresh and non-empty.
///
/// Fails closed and stops at the first failing entry.
pub fn are_analyses_valid(
    entries: &[AnalysisEntry<'_>],
    expected_hashes: &HashMap<String, String>,
) -> bool {
    match first_invalid(entries, expected_hashes) {
        Some((table, reason)) => {
            debug!(table, reason = reason.as_str(), "Analysis failed validation");
            false
        }
        None => true,
    }
}
