use serde::{Deserialize, Serialize};

use crate::leagues::league_label;
use crate::match_record::{MatchRecord, MatchResult, SideLine};
use crate::sheet_parse::StatCoverage;
use crate::team_form::{pct, round1};

/// Descriptive totals for one competition sheet. Percentages carry one
/// decimal, per-game averages two for goals and one for the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueReport {
    pub competition: String,
    pub label: String,
    pub matches: usize,
    pub home_win_pct: f64,
    pub draw_pct: f64,
    pub away_win_pct: f64,
    pub ht_goals_per_game: f64,
    pub ft_goals_per_game: f64,
    /// `None` when the sheet has no goals at all.
    pub first_half_goal_share: Option<f64>,
    pub second_half_goal_share: Option<f64>,
    pub over_05_ht_pct: f64,
    pub over_15_ht_pct: f64,
    /// FT over 0.5, 1.5, 2.5, 3.5 and 4.5.
    pub over_ft_pct: [f64; 5],
    pub btts_pct: f64,
    pub goalless_pct: f64,
    /// Per-game stats are `None` when the sheet lacks the columns.
    pub corners_per_game: Option<f64>,
    pub yellow_cards_per_game: Option<f64>,
    pub shots_per_game: Option<f64>,
    pub shots_on_target_per_game: Option<f64>,
    pub fouls_per_game: Option<f64>,
}

pub const FT_REPORT_LINES: [f64; 5] = [0.5, 1.5, 2.5, 3.5, 4.5];

pub fn build_league_report(
    code: &str,
    history: &[MatchRecord],
    stats: StatCoverage,
) -> Option<LeagueReport> {
    if history.is_empty() {
        return None;
    }
    let n = history.len();
    let count = |f: &dyn Fn(&MatchRecord) -> bool| history.iter().filter(|m| f(m)).count();
    let per_game = |present: bool, f: fn(&SideLine) -> u16| {
        if !present {
            return None;
        }
        let total: u64 = history
            .iter()
            .map(|m| u64::from(f(&m.home)) + u64::from(f(&m.away)))
            .sum();
        Some(round1(total as f64 / n as f64))
    };

    let ht_goals: u64 = history.iter().map(|m| u64::from(m.ht_total_goals())).sum();
    let ft_goals: u64 = history.iter().map(|m| u64::from(m.total_goals())).sum();
    let (first_half_goal_share, second_half_goal_share) = if ft_goals > 0 {
        let first = ht_goals as f64 / ft_goals as f64 * 100.0;
        (Some(round1(first)), Some(round1(100.0 - first)))
    } else {
        (None, None)
    };

    Some(LeagueReport {
        competition: code.to_string(),
        label: league_label(code),
        matches: n,
        home_win_pct: pct(count(&|m| m.result == MatchResult::Home), n),
        draw_pct: pct(count(&|m| m.result == MatchResult::Draw), n),
        away_win_pct: pct(count(&|m| m.result == MatchResult::Away), n),
        ht_goals_per_game: round2(ht_goals as f64 / n as f64),
        ft_goals_per_game: round2(ft_goals as f64 / n as f64),
        first_half_goal_share,
        second_half_goal_share,
        over_05_ht_pct: pct(count(&|m| m.ht_total_goals() >= 1), n),
        over_15_ht_pct: pct(count(&|m| m.ht_total_goals() >= 2), n),
        over_ft_pct: FT_REPORT_LINES.map(|line| {
            let min_goals = line.ceil() as u16;
            pct(count(&|m| m.total_goals() >= min_goals), n)
        }),
        btts_pct: pct(count(&|m| m.both_teams_scored()), n),
        goalless_pct: pct(count(&|m| m.total_goals() == 0), n),
        corners_per_game: per_game(stats.corners, |l| l.corners),
        yellow_cards_per_game: per_game(stats.yellow_cards, |l| l.yellow_cards),
        shots_per_game: per_game(stats.shots, |l| l.shots),
        shots_on_target_per_game: per_game(stats.shots_on_target, |l| l.shots_on_target),
        fouls_per_game: per_game(stats.fouls, |l| l.fouls),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_record::tests::record;

    #[test]
    fn report_over_small_sheet() {
        let mut h = vec![
            record("2025-08-02", "A", "B", (2, 1), (1, 0)),
            record("2025-08-02", "C", "D", (0, 0), (0, 0)),
            record("2025-08-09", "B", "C", (1, 3), (0, 2)),
            record("2025-08-09", "D", "A", (1, 1), (1, 0)),
        ];
        h[0].home.corners = 6;
        h[0].away.corners = 4;

        let r = build_league_report("E0", &h, StatCoverage::ALL).unwrap();
        assert_eq!(r.matches, 4);
        assert_eq!(r.home_win_pct, 25.0);
        assert_eq!(r.draw_pct, 50.0);
        assert_eq!(r.away_win_pct, 25.0);
        assert_eq!(r.ft_goals_per_game, 2.25);
        assert_eq!(r.first_half_goal_share, Some(44.4));
        assert_eq!(r.second_half_goal_share, Some(55.6));
        assert_eq!(r.over_ft_pct[2], 50.0);
        assert_eq!(r.btts_pct, 75.0);
        assert_eq!(r.goalless_pct, 25.0);
        assert_eq!(r.corners_per_game, Some(2.5));
        assert_eq!(r.fouls_per_game, Some(0.0));
        assert_eq!(r.label, "Premier League (England)");
    }

    #[test]
    fn goalless_sheet_has_no_half_split() {
        let h = vec![record("2025-08-02", "A", "B", (0, 0), (0, 0))];
        let r = build_league_report("ZZ", &h, StatCoverage::ALL).unwrap();
        assert_eq!(r.first_half_goal_share, None);
        assert!(build_league_report("ZZ", &[], StatCoverage::ALL).is_none());
    }

    #[test]
    fn goals_only_sheet_has_no_stat_averages() {
        let raw = "Div,Date,HomeTeam,AwayTeam,FTHG,FTAG,FTR,HTHG,HTAG\n\
                   E0,16/08/2025,Arsenal,Chelsea,2,1,H,1,0\n\
                   E0,23/08/2025,Chelsea,Arsenal,0,0,D,0,0\n";
        let parsed = crate::sheet_parse::parse_history_str(raw, "E0").unwrap();
        let r = build_league_report("E0", &parsed.rows, parsed.stats).unwrap();
        assert_eq!(r.ft_goals_per_game, 1.5);
        assert_eq!(r.corners_per_game, None);
        assert_eq!(r.yellow_cards_per_game, None);
        assert_eq!(r.shots_per_game, None);
        assert_eq!(r.shots_on_target_per_game, None);
        assert_eq!(r.fouls_per_game, None);
    }
}
