//! Final ordering of accepted suggestions.

use std::cmp::Reverse;

use crate::model::ChartSuggestion;

/// Ranking inputs that are not stored on the suggestion itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub suggestion: ChartSuggestion,
    pub tables_touched: usize,
}

/// Sort key, compared lexicographically. Smaller ranks first.
type RankKey = (usize, bool, Reverse<usize>, u8, bool);

fn rank_key(entry: &Ranked, total_tables: usize) -> RankKey {
    let full_coverage = total_tables > 0 && entry.tables_touched >= total_tables;
    (
        entry.suggestion.new_fields.len(),
        !full_coverage,
        Reverse(entry.tables_touched),
        entry.suggestion.chart_type.priority(),
        entry.suggestion.encoding.has_color(),
    )
}

/// Orders suggestions by: fewer new fields, then table coverage (full
/// coverage first, then more tables), then chart type priority, then no
/// color channel. The sort is stable, so equal keys keep selection order.
pub fn rank(mut entries: Vec<Ranked>, total_tables: usize) -> Vec<ChartSuggestion> {
    entries.sort_by_key(|entry| rank_key(entry, total_tables));
    entries.into_iter().map(|e| e.suggestion).collect()
}
