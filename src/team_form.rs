use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::match_record::{MatchRecord, Perspective, SideLine, TeamMatchView, TeamResult};
use crate::weighting::{self, Weighting};

pub const DEFAULT_FORM_WINDOW: usize = 10;
pub const DEFAULT_MIN_MATCHES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormConfig {
    pub window: usize,
    /// Teams with fewer matches in the window get no snapshot.
    pub min_matches: usize,
    pub weighting: Weighting,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_FORM_WINDOW,
            min_matches: DEFAULT_MIN_MATCHES,
            weighting: Weighting::default(),
        }
    }
}

/// A per-match average split into the team's own value and what it allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatPair {
    pub team: f64,
    pub opponent: f64,
}

impl StatPair {
    pub fn total(&self) -> f64 {
        self.team + self.opponent
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FormRecord {
    pub played: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    /// `(3W + D) / 3N` as a percentage.
    pub points_pct: f64,
}

impl FormRecord {
    fn from_views(views: &[TeamMatchView<'_>]) -> Self {
        let mut out = FormRecord {
            played: views.len(),
            ..FormRecord::default()
        };
        for v in views {
            match v.team_result() {
                TeamResult::Win => out.wins += 1,
                TeamResult::Draw => out.draws += 1,
                TeamResult::Loss => out.losses += 1,
            }
        }
        if out.played > 0 {
            out.points_pct = round1(
                (3 * out.wins + out.draws) as f64 / (3 * out.played) as f64 * 100.0,
            );
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamFormSnapshot {
    pub team: String,
    pub perspective: Perspective,
    pub sample_size: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub goals: StatPair,
    pub ht_goals: StatPair,
    pub shots: StatPair,
    pub shots_on_target: StatPair,
    pub corners: StatPair,
    pub cards: StatPair,
    pub fouls: StatPair,
    /// Unweighted mean of total goals per match.
    pub avg_total_goals: f64,
    pub consistency: f64,
    pub over_05_ht_pct: f64,
    pub over_05_ft_pct: f64,
    pub over_15_ft_pct: f64,
    pub over_25_ft_pct: f64,
    pub over_35_ft_pct: f64,
    pub btts_pct: f64,
    pub record: FormRecord,
}

/// All of `team`'s matches admitted by `perspective`, oldest first.
pub fn team_matches<'a>(
    history: &'a [MatchRecord],
    team: &str,
    perspective: Perspective,
) -> Vec<TeamMatchView<'a>> {
    let mut views: Vec<TeamMatchView<'a>> = history
        .iter()
        .filter_map(|m| m.view_for(team))
        .filter(|v| perspective.admits(v.side))
        .collect();
    views.sort_by_key(|v| v.date());
    views
}

/// The trailing `window` matches (all of them when fewer exist).
pub fn recent_window<'a>(
    history: &'a [MatchRecord],
    team: &str,
    perspective: Perspective,
    window: usize,
) -> Vec<TeamMatchView<'a>> {
    let mut views = team_matches(history, team, perspective);
    let skip = views.len().saturating_sub(window);
    views.drain(..skip);
    views
}

pub fn aggregate_team_form(
    history: &[MatchRecord],
    team: &str,
    perspective: Perspective,
    cfg: &FormConfig,
) -> Option<TeamFormSnapshot> {
    let views = recent_window(history, team, perspective, cfg.window.max(1));
    if views.is_empty() || views.len() < cfg.min_matches {
        return None;
    }

    let dates: Vec<NaiveDate> = views.iter().map(|v| v.date()).collect();
    let weights = cfg.weighting.weights(&dates);
    let pair = |pick: fn(&SideLine) -> f64| -> Option<StatPair> {
        let own: Vec<f64> = views.iter().map(|v| pick(&v.own)).collect();
        let opp: Vec<f64> = views.iter().map(|v| pick(&v.opp)).collect();
        Some(StatPair {
            team: weighting::weighted_mean(&own, &weights)?,
            opponent: weighting::weighted_mean(&opp, &weights)?,
        })
    };

    let goals = pair(|l| f64::from(l.goals))?;
    let ht_goals = pair(|l| f64::from(l.ht_goals))?;
    let shots = pair(|l| f64::from(l.shots))?;
    let shots_on_target = pair(|l| f64::from(l.shots_on_target))?;
    let corners = pair(|l| f64::from(l.corners))?;
    let cards = pair(|l| f64::from(l.cards()))?;
    let fouls = pair(|l| f64::from(l.fouls))?;

    let scored: Vec<f64> = views.iter().map(|v| f64::from(v.own.goals)).collect();
    let totals: Vec<f64> = views.iter().map(|v| f64::from(v.total_goals())).collect();

    let n = views.len();

    Some(TeamFormSnapshot {
        team: team.to_string(),
        perspective,
        sample_size: n,
        first_date: dates[0],
        last_date: dates[n - 1],
        goals,
        ht_goals,
        shots,
        shots_on_target,
        corners,
        cards,
        fouls,
        avg_total_goals: weighting::mean(&totals)?,
        consistency: weighting::consistency(&scored),
        over_05_ht_pct: hit_rate(&views, |v| v.ht_total_goals() >= 1),
        over_05_ft_pct: hit_rate(&views, |v| v.total_goals() >= 1),
        over_15_ft_pct: hit_rate(&views, |v| v.total_goals() >= 2),
        over_25_ft_pct: hit_rate(&views, |v| v.total_goals() >= 3),
        over_35_ft_pct: hit_rate(&views, |v| v.total_goals() >= 4),
        btts_pct: hit_rate(&views, |v| v.both_teams_scored()),
        record: FormRecord::from_views(&views),
    })
}

fn hit_rate(views: &[TeamMatchView<'_>], f: impl Fn(&TeamMatchView<'_>) -> bool) -> f64 {
    pct(views.iter().filter(|v| f(*v)).count(), views.len())
}

/// Whole-sheet W/D/L for a team, regardless of window.
pub fn season_record(history: &[MatchRecord], team: &str) -> Option<FormRecord> {
    let views = team_matches(history, team, Perspective::Either);
    if views.is_empty() {
        return None;
    }
    Some(FormRecord::from_views(&views))
}

/// `count / n` as a percentage with one decimal.
pub fn pct(count: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    round1(count as f64 / n as f64 * 100.0)
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_record::tests::record;

    fn sample() -> Vec<MatchRecord> {
        vec![
            record("2025-08-16", "Arsenal", "Chelsea", (2, 1), (1, 0)),
            record("2025-08-23", "Leeds", "Arsenal", (0, 0), (0, 0)),
            record("2025-08-30", "Arsenal", "Spurs", (3, 1), (0, 1)),
            record("2025-09-13", "Everton", "Arsenal", (1, 4), (1, 2)),
            record("2025-09-20", "Arsenal", "Fulham", (1, 1), (1, 0)),
            record("2025-09-27", "Chelsea", "Spurs", (2, 2), (1, 1)),
        ]
    }

    #[test]
    fn either_perspective_pools_both_venues() {
        let cfg = FormConfig {
            weighting: Weighting::Uniform,
            ..FormConfig::default()
        };
        let s = aggregate_team_form(&sample(), "Arsenal", Perspective::Either, &cfg).unwrap();
        assert_eq!(s.sample_size, 5);
        assert!((s.goals.team - 2.0).abs() < 1e-9);
        assert!((s.goals.opponent - 0.8).abs() < 1e-9);
        assert_eq!(s.record.wins, 3);
        assert_eq!(s.record.draws, 2);
        assert_eq!(s.over_25_ft_pct, 60.0);
        assert_eq!(s.btts_pct, 80.0);
    }

    #[test]
    fn venue_perspective_and_minimum() {
        let cfg = FormConfig {
            min_matches: 1,
            ..FormConfig::default()
        };
        let home = aggregate_team_form(&sample(), "Arsenal", Perspective::Home, &cfg).unwrap();
        assert_eq!(home.sample_size, 3);
        // Default minimum of five excludes a three-match home sample.
        assert!(
            aggregate_team_form(&sample(), "Arsenal", Perspective::Home, &FormConfig::default())
                .is_none()
        );
    }

    #[test]
    fn window_keeps_most_recent_and_recency_favours_it() {
        let cfg = FormConfig {
            window: 2,
            min_matches: 1,
            weighting: Weighting::default(),
        };
        let s = aggregate_team_form(&sample(), "Arsenal", Perspective::Either, &cfg).unwrap();
        assert_eq!(s.sample_size, 2);
        assert_eq!(s.first_date, NaiveDate::from_ymd_opt(2025, 9, 13).unwrap());
        // 4 goals a week before 1 goal; the newest match weighs 1.0.
        let older = 1.8f64.powf(-7.0 / 30.0);
        let expected = (4.0 * older + 1.0) / (older + 1.0);
        assert!((s.goals.team - expected).abs() < 1e-12);
        assert!(s.goals.team < 2.5);
        assert!((s.goals.opponent - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unknown_team_yields_none() {
        let cfg = FormConfig {
            min_matches: 0,
            ..FormConfig::default()
        };
        assert!(aggregate_team_form(&sample(), "Wolves", Perspective::Either, &cfg).is_none());
        assert!(season_record(&sample(), "Wolves").is_none());
        assert_eq!(pct(0, 0), 0.0);
    }
}
