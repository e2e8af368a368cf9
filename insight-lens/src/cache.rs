//! Explicit analysis cache keyed by table id and field hash.
//!
//! The merger and the suggestion engine are cache-oblivious; callers own an
//! `AnalysisCache`, look analyses up with the field hash they expect and pass
//! whatever snapshot they get to the core. An entry is fresh exactly when its
//! stored field hash equals the expected one.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{are_analyses_valid, AnalysisEntry};
use crate::model::DataFrameAnalysis;

/// Caches one analysis per table.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: HashMap<String, DataFrameAnalysis>,
    max_entries: usize,
    /// Insertion counter used to evict the oldest entry at capacity.
    insert_seq: u64,
    inserted_at: HashMap<String, u64>,
}

impl AnalysisCache {
    /// Creates a new analysis cache.
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Creates a cache holding at most `max_entries` tables.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
            insert_seq: 0,
            inserted_at: HashMap::new(),
        }
    }

    /// Stores the analysis for a table, replacing any previous one.
    pub fn insert(&mut self, table_id: impl Into<String>, analysis: DataFrameAnalysis) {
        let table_id = table_id.into();
        if !self.entries.contains_key(&table_id) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.insert_seq += 1;
        self.inserted_at.insert(table_id.clone(), self.insert_seq);
        self.entries.insert(table_id, analysis);
    }

    /// Returns the analysis regardless of freshness.
    pub fn get(&self, table_id: &str) -> Option<&DataFrameAnalysis> {
        self.entries.get(table_id)
    }

    /// Returns the analysis only if it was computed for `expected_hash`.
    pub fn get_fresh(&self, table_id: &str, expected_hash: &str) -> Option<&DataFrameAnalysis> {
        self.entries.get(table_id).filter(|analysis| {
            let fresh = analysis.field_hash == expected_hash;
            if !fresh {
                debug!(
                    table = table_id,
                    cached = analysis.field_hash,
                    expected = expected_hash,
                    "Cached analysis is stale"
                );
            }
            fresh
        })
    }

    /// Drops the analysis of one table.
    pub fn invalidate(&mut self, table_id: &str) -> Option<DataFrameAnalysis> {
        self.inserted_at.remove(table_id);
        self.entries.remove(table_id)
    }

    /// Drops every entry whose hash no longer matches; ids without an expectation are kept.
    pub fn remove_stale(&mut self, expected_hashes: &HashMap<String, String>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, analysis| {
            expected_hashes
                .get(id)
                .map_or(true, |expected| *expected == analysis.field_hash)
        });
        let inserted_at = &mut self.inserted_at;
        let entries = &self.entries;
        inserted_at.retain(|id, _| entries.contains_key(id));
        before - self.entries.len()
    }

    /// Clears the entire cache.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.inserted_at.clear();
    }

    /// Gets the current size of the cache.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// Validation entries for the given tables, in the given order.
    pub fn entries_for<'a>(&'a self, table_ids: &[&'a str]) -> Vec<AnalysisEntry<'a>> {
        table_ids
            .iter()
            .map(|id| AnalysisEntry::new(*id, self.entries.get(*id)))
            .collect()
    }

    /// True when every listed table has a fresh, non-empty analysis.
    pub fn is_valid_for(&self, table_ids: &[&str], expected_hashes: &HashMap<String, String>) -> bool {
        are_analyses_valid(&self.entries_for(table_ids), expected_hashes)
    }

    /// Evicts the oldest entry.
    fn evict_oldest(&mut self) {
        if let Some(oldest) = self
            .inserted_at
            .iter()
            .min_by_key(|(_, seq)| **seq)
            .map(|(id, _)| id.clone())
        {
            debug!(table = oldest, "Evicting oldest cached analysis");
            self.invalidate(&oldest);
        }
    }

    /// Gets cache statistics against the expected hashes.
    pub fn stats(&self, expected_hashes: &HashMap<String, String>) -> CacheStats {
        let total_entries = self.entries.len();
        let stale_entries = self
            .entries
            .iter()
            .filter(|(id, analysis)| {
                expected_hashes
                    .get(*id)
                    .is_some_and(|expected| *expected != analysis.field_hash)
            })
            .count();

        CacheStats {
            total_entries,
            stale_entries,
            fresh_entries: total_entries - stale_entries,
        }
    }
}

/// Statistics about the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of entries
    pub total_entries: usize,
    /// Entries whose field hash differs from the expected one
    pub stale_entries: usize,
    /// Entries that are fresh or carry no expectation
    pub fresh_entries: usize,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnAnalysis;

    fn analysis(hash: &str) -> DataFrameAnalysis {
        DataFrameAnalysis::new(vec![ColumnAnalysis::categorical("region", 4)], 10, hash)
    }

    fn expected(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_cache_basic_operations() {
        let mut cache = AnalysisCache::new();
        cache.insert("orders", analysis("a,b"));

        assert!(cache.get("orders").is_some());
        assert!(cache.get_fresh("orders", "a,b").is_some());
        assert!(cache.get_fresh("orders", "a,b,c").is_none());
        assert!(cache.get("missing").is_none());
    }

    #[test]
    fn test_cache_eviction() {
        let mut cache = AnalysisCache::with_capacity(2);
        cache.insert("t1", analysis("1"));
        cache.insert("t2", analysis("2"));
        cache.insert("t3", analysis("3"));

        assert_eq!(cache.size(), 2);
        assert!(cache.get("t1").is_none());
        assert!(cache.get("t3").is_some());
    }

    #[test]
    fn test_reinsert_does_not_evict() {
        let mut cache = AnalysisCache::with_capacity(2);
        cache.insert("t1", analysis("1"));
        cache.insert("t2", analysis("2"));
        cache.insert("t1", analysis("1b"));

        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("t1").map(|a| a.field_hash.as_str()), Some("1b"));
    }

    #[test]
    fn test_remove_stale() {
        let mut cache = AnalysisCache::new();
        cache.insert("t1", analysis("old"));
        cache.insert("t2", analysis("same"));
        cache.insert("t3", analysis("untracked"));

        let removed = cache.remove_stale(&expected(&[("t1", "new"), ("t2", "same")]));
        assert_eq!(removed, 1);
        assert!(cache.get("t1").is_none());
        assert!(cache.get("t3").is_some());
    }

    #[test]
    fn test_validity_through_entries() {
        let mut cache = AnalysisCache::new();
        cache.insert("orders", analysis("h1"));
        cache.insert("customers", analysis("h2"));

        let hashes = expected(&[("orders", "h1"), ("customers", "h2")]);
        assert!(cache.is_valid_for(&["orders", "customers"], &hashes));
        assert!(!cache.is_valid_for(&["orders", "products"], &hashes));

        let hashes = expected(&[("orders", "h1"), ("customers", "changed")]);
        assert!(!cache.is_valid_for(&["orders", "customers"], &hashes));
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = AnalysisCache::new();
        cache.insert("t1", analysis("h1"));
        cache.insert("t2", analysis("h2"));

        let stats = cache.stats(&expected(&[("t2", "other")]));
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.stale_entries, 1);
        assert_eq!(stats.fresh_entries, 1);
    }
}
