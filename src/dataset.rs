use std::collections::{BTreeMap, BTreeSet};

use crate::match_record::MatchRecord;
use crate::sheet_parse::StatCoverage;

/// Played matches grouped by competition code, each sheet sorted by date.
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    sheets: BTreeMap<String, Vec<MatchRecord>>,
    /// Only sheets read from a file are listed; the rest carry every stat.
    coverage: BTreeMap<String, StatCoverage>,
}

impl HistoricalDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups records by their own competition code.
    pub fn from_records(records: impl IntoIterator<Item = MatchRecord>) -> Self {
        let mut out = Self::new();
        for m in records {
            out.sheets.entry(m.competition.clone()).or_default().push(m);
        }
        for rows in out.sheets.values_mut() {
            sort_chronologically(rows);
        }
        out
    }

    /// Replaces the sheet stored under `code`.
    pub fn insert_sheet(&mut self, code: &str, mut rows: Vec<MatchRecord>) {
        sort_chronologically(&mut rows);
        self.sheets.insert(code.to_string(), rows);
        self.coverage.remove(code);
    }

    /// Like `insert_sheet`, remembering which stat columns the file had.
    pub fn insert_parsed_sheet(&mut self, code: &str, rows: Vec<MatchRecord>, stats: StatCoverage) {
        self.insert_sheet(code, rows);
        self.coverage.insert(code.to_string(), stats);
    }

    pub fn stat_coverage(&self, code: &str) -> StatCoverage {
        self.coverage.get(code).copied().unwrap_or(StatCoverage::ALL)
    }

    pub fn competition(&self, code: &str) -> Option<&[MatchRecord]> {
        self.sheets.get(code).map(|rows| rows.as_slice())
    }

    pub fn has_competition(&self, code: &str) -> bool {
        self.sheets.contains_key(code)
    }

    pub fn competitions(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(|k| k.as_str())
    }

    pub fn total_matches(&self) -> usize {
        self.sheets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Every team that appears on either side of a sheet, alphabetically.
    pub fn teams(&self, code: &str) -> Vec<String> {
        self.competition(code)
            .map(teams_in)
            .unwrap_or_default()
    }
}

pub fn teams_in(history: &[MatchRecord]) -> Vec<String> {
    let mut set = BTreeSet::new();
    for m in history {
        set.insert(m.home_team.as_str());
        set.insert(m.away_team.as_str());
    }
    set.into_iter().map(|s| s.to_string()).collect()
}

/// Stable sort so same-day rows keep sheet order.
fn sort_chronologically(rows: &mut [MatchRecord]) {
    rows.sort_by_key(|m| m.date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_record::tests::record;

    #[test]
    fn groups_and_sorts_by_date() {
        let mut late = record("2025-09-01", "A", "B", (1, 0), (0, 0));
        late.competition = "D1".to_string();
        let mut early = record("2025-08-20", "C", "A", (2, 2), (1, 1));
        early.competition = "D1".to_string();
        let other = record("2025-08-21", "X", "Y", (0, 0), (0, 0));

        let ds = HistoricalDataset::from_records(vec![late, early, other]);
        let d1 = ds.competition("D1").unwrap();
        assert_eq!(d1[0].home_team, "C");
        assert_eq!(ds.teams("D1"), vec!["A", "B", "C"]);
        assert_eq!(ds.total_matches(), 3);
        assert!(ds.competition("SP1").is_none());
        assert_eq!(ds.stat_coverage("D1"), StatCoverage::ALL);
    }

    #[test]
    fn parsed_sheet_keeps_coverage_until_replaced() {
        let mut ds = HistoricalDataset::new();
        let rows = vec![record("2025-08-02", "A", "B", (1, 0), (0, 0))];
        ds.insert_parsed_sheet("E0", rows.clone(), StatCoverage::default());
        assert_eq!(ds.stat_coverage("E0"), StatCoverage::default());
        ds.insert_sheet("E0", rows);
        assert_eq!(ds.stat_coverage("E0"), StatCoverage::ALL);
    }
}
