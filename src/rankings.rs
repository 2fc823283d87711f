use serde::{Deserialize, Serialize};

use crate::dataset::teams_in;
use crate::markets::Market;
use crate::match_record::{MatchRecord, Perspective};
use crate::team_form::{pct, recent_window};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Trailing matches counted per team.
    pub window: usize,
    pub min_matches: usize,
    /// Per-match outcomes kept for display.
    pub recent: usize,
    pub top: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            window: 10,
            min_matches: 5,
            recent: 5,
            top: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub team: String,
    pub hits: usize,
    pub matches_analyzed: usize,
    pub pct: f64,
    /// Hit/miss for the most recent matches, oldest first.
    pub recent: Vec<bool>,
}

impl RankingRow {
    pub fn recent_marks(&self) -> String {
        self.recent.iter().map(|hit| if *hit { 'Y' } else { 'N' }).collect()
    }
}

/// Leaderboard of one market over a competition: highest hit rate first, ties
/// broken by matches analyzed, then by name.
pub fn rank_market(
    history: &[MatchRecord],
    market: Market,
    cfg: &RankingConfig,
) -> Vec<RankingRow> {
    let mut rows: Vec<RankingRow> = teams_in(history)
        .into_iter()
        .filter_map(|team| team_row(history, team, market, cfg))
        .collect();

    rows.sort_by(|a, b| {
        b.pct
            .total_cmp(&a.pct)
            .then_with(|| b.matches_analyzed.cmp(&a.matches_analyzed))
            .then_with(|| a.team.cmp(&b.team))
    });
    rows.truncate(cfg.top);
    rows
}

fn team_row(
    history: &[MatchRecord],
    team: String,
    market: Market,
    cfg: &RankingConfig,
) -> Option<RankingRow> {
    let views = recent_window(history, &team, Perspective::Either, cfg.window.max(1));
    if views.is_empty() || views.len() < cfg.min_matches {
        return None;
    }
    let outcomes: Vec<bool> = views.iter().map(|v| market.hit(v)).collect();
    let hits = outcomes.iter().filter(|h| **h).count();
    let keep_from = outcomes.len().saturating_sub(cfg.recent);
    Some(RankingRow {
        hits,
        matches_analyzed: outcomes.len(),
        pct: pct(hits, outcomes.len()),
        recent: outcomes[keep_from..].to_vec(),
        team,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_record::tests::record;

    #[test]
    fn thin_teams_are_left_out() {
        let h = vec![
            record("2025-08-02", "A", "B", (2, 1), (1, 0)),
            record("2025-08-09", "B", "A", (0, 0), (0, 0)),
        ];
        assert!(rank_market(&h, Market::BothTeamsScored, &RankingConfig::default()).is_empty());
    }

    #[test]
    fn recent_marks_render() {
        let row = RankingRow {
            team: "A".into(),
            hits: 2,
            matches_analyzed: 3,
            pct: 66.7,
            recent: vec![true, false, true],
        };
        assert_eq!(row.recent_marks(), "YNY");
    }
}
