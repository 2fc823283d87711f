use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::markets::Market;
use crate::match_record::{MatchRecord, Perspective, TeamMatchView, TeamResult};
use crate::scoreline::FixtureProbabilityBundle;
use crate::team_form::recent_window;
use crate::weighting::ConfidenceLabel;

pub const DEFAULT_STREAK_WINDOW: usize = 5;
/// Hits out of the last five that raise a goals alert.
const ALERT_MIN_HITS: usize = 4;

/// For every market, whether all of the team's last `window` matches hit it.
/// A team with fewer than `window` matches has no streaks at all.
pub fn detect_streaks(
    history: &[MatchRecord],
    team: &str,
    window: usize,
) -> BTreeMap<Market, bool> {
    let views = recent_window(history, team, Perspective::Either, window);
    let complete = window > 0 && views.len() >= window;
    Market::ALL
        .into_iter()
        .map(|m| (m, complete && views.iter().all(|v| m.hit(v))))
        .collect()
}

pub fn has_streak(history: &[MatchRecord], team: &str, market: Market, window: usize) -> bool {
    let views = recent_window(history, team, Perspective::Either, window);
    window > 0 && views.len() >= window && views.iter().all(|v| market.hit(v))
}

/// Values behind a criterion over the last `window` matches, oldest first,
/// joined with `-` (e.g. `12-10-14-11-13`).
pub fn recent_sequence(
    history: &[MatchRecord],
    team: &str,
    market: Market,
    window: usize,
) -> Option<String> {
    let views = recent_window(history, team, Perspective::Either, window);
    if views.is_empty() {
        return None;
    }
    Some(render_sequence(&views, market))
}

fn render_sequence(views: &[TeamMatchView<'_>], market: Market) -> String {
    views
        .iter()
        .map(|v| market.display_value(v))
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    HtGoals,
    Over25,
    BothTeamsScored,
    WinStreak,
    LosingStreak,
    Unbeaten,
    Winless,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormAlert {
    pub kind: AlertKind,
    pub hits: usize,
    pub window: usize,
}

impl FormAlert {
    pub fn describe(&self) -> String {
        let (hits, window) = (self.hits, self.window);
        match self.kind {
            AlertKind::HtGoals => format!("HT over 0.5 in {hits} of the last {window}"),
            AlertKind::Over25 => format!("Over 2.5 in {hits} of the last {window}"),
            AlertKind::BothTeamsScored => format!("BTTS in {hits} of the last {window}"),
            AlertKind::WinStreak => format!("{hits} wins in a row"),
            AlertKind::LosingStreak => format!("{hits} defeats in a row"),
            AlertKind::Unbeaten => format!("Unbeaten in the last {window}"),
            AlertKind::Winless => format!("No win in the last {window}"),
        }
    }
}

/// Goal-trend and result-run alerts over the last five matches. Empty when
/// the team has played fewer than five.
pub fn form_alerts(history: &[MatchRecord], team: &str) -> Vec<FormAlert> {
    let window = DEFAULT_STREAK_WINDOW;
    let views = recent_window(history, team, Perspective::Either, window);
    if views.len() < window {
        return Vec::new();
    }

    let mut out = Vec::new();
    let count = |f: &dyn Fn(&TeamMatchView<'_>) -> bool| views.iter().filter(|v| f(v)).count();
    let mut push = |kind, hits| out.push(FormAlert { kind, hits, window });

    let ht = count(&|v| v.ht_total_goals() >= 1);
    if ht >= ALERT_MIN_HITS {
        push(AlertKind::HtGoals, ht);
    }
    let over = count(&|v| v.total_goals() >= 3);
    if over >= ALERT_MIN_HITS {
        push(AlertKind::Over25, over);
    }
    let btts = count(&|v| v.both_teams_scored());
    if btts >= ALERT_MIN_HITS {
        push(AlertKind::BothTeamsScored, btts);
    }

    let wins = count(&|v| v.team_result() == TeamResult::Win);
    let losses = count(&|v| v.team_result() == TeamResult::Loss);
    if wins == window {
        push(AlertKind::WinStreak, wins);
    } else if losses == window {
        push(AlertKind::LosingStreak, losses);
    }
    if losses == 0 && wins < window {
        push(AlertKind::Unbeaten, window - losses);
    }
    if wins == 0 && losses < window {
        push(AlertKind::Winless, window);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FixtureTip {
    /// Both sides carry the same complete streak.
    SharedStreak {
        market: Market,
        home_sequence: String,
        away_sequence: String,
    },
    /// A model probability at or above the tip threshold.
    Model { pick: String, probability: f64 },
}

impl FixtureTip {
    pub fn describe(&self) -> String {
        match self {
            FixtureTip::SharedStreak {
                market,
                home_sequence,
                away_sequence,
            } => format!("{market}: both sides 5/5 ({home_sequence} | {away_sequence})"),
            FixtureTip::Model { pick, probability } => format!("{pick} ({probability:.1}%)"),
        }
    }
}

pub fn shared_streak_tips(
    history: &[MatchRecord],
    home_team: &str,
    away_team: &str,
    window: usize,
) -> Vec<FixtureTip> {
    let home = detect_streaks(history, home_team, window);
    let away = detect_streaks(history, away_team, window);
    Market::ALL
        .into_iter()
        .filter(|m| home.get(m).copied().unwrap_or(false) && away.get(m).copied().unwrap_or(false))
        .map(|market| FixtureTip::SharedStreak {
            market,
            home_sequence: recent_sequence(history, home_team, market, window).unwrap_or_default(),
            away_sequence: recent_sequence(history, away_team, market, window).unwrap_or_default(),
        })
        .collect()
}

/// Picks whose model probability reaches `threshold` (percent). Nothing is
/// suggested from a Low-confidence bundle.
pub fn model_tips(bundle: &FixtureProbabilityBundle, threshold: f64) -> Vec<FixtureTip> {
    if bundle.confidence.label < ConfidenceLabel::Medium {
        return Vec::new();
    }
    let mut candidates = vec![
        (format!("{} win", bundle.home_team), bundle.p_home_win),
        (format!("{} win", bundle.away_team), bundle.p_away_win),
        ("HT over 0.5".to_string(), bundle.ht_over_05.over),
        ("Both teams score".to_string(), bundle.btts),
    ];
    for line in &bundle.ft_lines {
        if line.line >= 1.5 {
            candidates.push((format!("Over {:.1}", line.line), line.over));
        }
        if line.line >= 2.5 {
            candidates.push((format!("Under {:.1}", line.line), line.under));
        }
    }
    candidates
        .into_iter()
        .filter(|(_, p)| *p >= threshold)
        .map(|(pick, probability)| FixtureTip::Model { pick, probability })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_record::tests::record;

    fn five_high_scoring() -> Vec<MatchRecord> {
        vec![
            record("2025-08-02", "A", "B", (2, 1), (1, 0)),
            record("2025-08-09", "C", "A", (1, 3), (0, 1)),
            record("2025-08-16", "A", "D", (2, 2), (1, 1)),
            record("2025-08-23", "E", "A", (1, 2), (1, 0)),
            record("2025-08-30", "A", "F", (4, 1), (2, 0)),
        ]
    }

    #[test]
    fn short_history_never_streaks() {
        let mut h = five_high_scoring();
        h.pop();
        let s = detect_streaks(&h, "A", 5);
        assert!(s.values().all(|hit| !hit));
        assert!(form_alerts(&h, "A").is_empty());
    }

    #[test]
    fn full_window_streaks_and_sequence() {
        let h = five_high_scoring();
        let s = detect_streaks(&h, "A", 5);
        assert!(s[&Market::FtGoalsOver25]);
        assert!(s[&Market::HtGoalsOver05]);
        assert!(!s[&Market::FtGoalsOver35]);
        assert!(!s[&Market::Corners9Plus]);
        assert_eq!(
            recent_sequence(&h, "A", Market::FtGoalsOver25, 5).as_deref(),
            Some("3-4-4-3-5")
        );
        assert!(recent_sequence(&h, "Z", Market::FtGoalsOver25, 5).is_none());
    }

    #[test]
    fn alerts_cover_goals_and_results() {
        let alerts = form_alerts(&five_high_scoring(), "A");
        let kinds: Vec<AlertKind> = alerts.iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&AlertKind::Over25));
        assert!(kinds.contains(&AlertKind::HtGoals));
        assert!(kinds.contains(&AlertKind::BothTeamsScored));
        assert!(kinds.contains(&AlertKind::Unbeaten));
        assert!(!kinds.contains(&AlertKind::WinStreak));
        assert!(!kinds.contains(&AlertKind::Winless));
    }

    #[test]
    fn shared_streak_needs_both_sides() {
        let mut h = five_high_scoring();
        h.extend([
            record("2025-08-03", "G", "H", (2, 1), (1, 0)),
            record("2025-08-10", "G", "C", (1, 2), (0, 1)),
            record("2025-08-17", "D", "G", (3, 3), (1, 1)),
            record("2025-08-24", "G", "E", (2, 1), (1, 0)),
            record("2025-08-31", "F", "G", (0, 3), (0, 2)),
        ]);
        let tips = shared_streak_tips(&h, "A", "G", 5);
        assert!(tips.iter().any(|t| matches!(
            t,
            FixtureTip::SharedStreak { market: Market::FtGoalsOver25, .. }
        )));
        assert!(shared_streak_tips(&h, "A", "B", 5).is_empty());
    }
}
