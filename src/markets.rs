use serde::{Deserialize, Serialize};

use crate::match_record::TeamMatchView;

/// A yes/no criterion evaluated on one played match.
///
/// Most criteria use the match total (both sides summed). The `Team*`
/// variants only count the analyzed team's own line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Market {
    HtGoalsOver05,
    FtGoalsOver15,
    FtGoalsOver25,
    FtGoalsOver35,
    BothTeamsScored,
    Shots10Plus,
    TeamShots10Plus,
    ShotsOnTarget4Plus,
    TeamShotsOnTarget4Plus,
    Corners9Plus,
    TeamCorners9Plus,
    Cards3Plus,
    TeamCards3Plus,
}

impl Market {
    pub const ALL: [Market; 13] = [
        Market::HtGoalsOver05,
        Market::FtGoalsOver15,
        Market::FtGoalsOver25,
        Market::FtGoalsOver35,
        Market::BothTeamsScored,
        Market::Shots10Plus,
        Market::TeamShots10Plus,
        Market::ShotsOnTarget4Plus,
        Market::TeamShotsOnTarget4Plus,
        Market::Corners9Plus,
        Market::TeamCorners9Plus,
        Market::Cards3Plus,
        Market::TeamCards3Plus,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Market::HtGoalsOver05 => "ht_over_05",
            Market::FtGoalsOver15 => "ft_over_15",
            Market::FtGoalsOver25 => "ft_over_25",
            Market::FtGoalsOver35 => "ft_over_35",
            Market::BothTeamsScored => "btts",
            Market::Shots10Plus => "shots_10",
            Market::TeamShots10Plus => "team_shots_10",
            Market::ShotsOnTarget4Plus => "sot_4",
            Market::TeamShotsOnTarget4Plus => "team_sot_4",
            Market::Corners9Plus => "corners_9",
            Market::TeamCorners9Plus => "team_corners_9",
            Market::Cards3Plus => "cards_3",
            Market::TeamCards3Plus => "team_cards_3",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Market::HtGoalsOver05 => "HT over 0.5 goals",
            Market::FtGoalsOver15 => "Over 1.5 goals",
            Market::FtGoalsOver25 => "Over 2.5 goals",
            Market::FtGoalsOver35 => "Over 3.5 goals",
            Market::BothTeamsScored => "Both teams scored",
            Market::Shots10Plus => "10+ shots (match)",
            Market::TeamShots10Plus => "10+ shots (team)",
            Market::ShotsOnTarget4Plus => "4+ shots on target (match)",
            Market::TeamShotsOnTarget4Plus => "4+ shots on target (team)",
            Market::Corners9Plus => "9+ corners (match)",
            Market::TeamCorners9Plus => "9+ corners (team)",
            Market::Cards3Plus => "3+ cards (match)",
            Market::TeamCards3Plus => "3+ cards (team)",
        }
    }

    pub fn from_key(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Market::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(raw))
    }

    /// The per-match quantity the criterion thresholds. BTTS has none.
    pub fn value(self, v: &TeamMatchView<'_>) -> Option<u16> {
        let (own, opp) = (&v.own, &v.opp);
        Some(match self {
            Market::HtGoalsOver05 => v.ht_total_goals(),
            Market::FtGoalsOver15 | Market::FtGoalsOver25 | Market::FtGoalsOver35 => {
                v.total_goals()
            }
            Market::BothTeamsScored => return None,
            Market::Shots10Plus => own.shots + opp.shots,
            Market::TeamShots10Plus => own.shots,
            Market::ShotsOnTarget4Plus => own.shots_on_target + opp.shots_on_target,
            Market::TeamShotsOnTarget4Plus => own.shots_on_target,
            Market::Corners9Plus => own.corners + opp.corners,
            Market::TeamCorners9Plus => own.corners,
            Market::Cards3Plus => own.cards() + opp.cards(),
            Market::TeamCards3Plus => own.cards(),
        })
    }

    fn threshold(self) -> u16 {
        match self {
            Market::HtGoalsOver05 => 1,
            Market::FtGoalsOver15 => 2,
            Market::FtGoalsOver25 => 3,
            Market::FtGoalsOver35 => 4,
            Market::BothTeamsScored => 1,
            Market::Shots10Plus | Market::TeamShots10Plus => 10,
            Market::ShotsOnTarget4Plus | Market::TeamShotsOnTarget4Plus => 4,
            Market::Corners9Plus | Market::TeamCorners9Plus => 9,
            Market::Cards3Plus | Market::TeamCards3Plus => 3,
        }
    }

    pub fn hit(self, v: &TeamMatchView<'_>) -> bool {
        match self.value(v) {
            Some(value) => value >= self.threshold(),
            None => v.both_teams_scored(),
        }
    }

    /// Short rendering of one match for sequences: the value, or the
    /// team-first score for BTTS.
    pub fn display_value(self, v: &TeamMatchView<'_>) -> String {
        match self.value(v) {
            Some(value) => value.to_string(),
            None => format!("{}:{}", v.own.goals, v.opp.goals),
        }
    }
}

impl std::fmt::Display for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_record::tests::record;

    #[test]
    fn summed_and_individual_criteria_differ() {
        let mut m = record("2025-08-16", "Arsenal", "Chelsea", (1, 1), (0, 1));
        m.home.shots = 6;
        m.away.shots = 5;
        m.home.yellow_cards = 1;
        m.away.red_cards = 1;

        let v = m.view_for("Arsenal").unwrap();
        assert!(Market::Shots10Plus.hit(&v));
        assert!(!Market::TeamShots10Plus.hit(&v));
        assert!(Market::Cards3Plus.hit(&v));
        assert!(!Market::TeamCards3Plus.hit(&v));

        let away = m.view_for("Chelsea").unwrap();
        assert_eq!(Market::TeamCards3Plus.value(&away), Some(2));
        assert!(Market::BothTeamsScored.hit(&away));
        assert_eq!(Market::BothTeamsScored.display_value(&away), "1:1");
    }

    #[test]
    fn goal_lines_are_strictly_over() {
        let m = record("2025-08-16", "A", "B", (2, 0), (0, 0));
        let v = m.view_for("A").unwrap();
        assert!(Market::FtGoalsOver15.hit(&v));
        assert!(!Market::FtGoalsOver25.hit(&v));
        assert!(!Market::HtGoalsOver05.hit(&v));
        assert!(!Market::BothTeamsScored.hit(&v));
    }

    #[test]
    fn keys_round_trip() {
        for m in Market::ALL {
            assert_eq!(Market::from_key(m.key()), Some(m));
        }
        assert_eq!(Market::from_key("nope"), None);
    }
}
