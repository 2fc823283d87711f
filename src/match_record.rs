use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// Which of a team's matches feed an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Perspective {
    Home,
    Away,
    Either,
}

impl Perspective {
    pub fn admits(self, side: Side) -> bool {
        match self {
            Perspective::Either => true,
            Perspective::Home => side == Side::Home,
            Perspective::Away => side == Side::Away,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    Home,
    Draw,
    Away,
}

impl MatchResult {
    pub fn from_goals(home_goals: u8, away_goals: u8) -> Self {
        if home_goals > away_goals {
            MatchResult::Home
        } else if home_goals < away_goals {
            MatchResult::Away
        } else {
            MatchResult::Draw
        }
    }

    /// Parses the `FTR` column code (`H`, `D`, `A`).
    pub fn from_code(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "H" => Some(MatchResult::Home),
            "D" => Some(MatchResult::Draw),
            "A" => Some(MatchResult::Away),
            _ => None,
        }
    }
}

/// Everything one side produced in a match. Stat columns missing from the
/// sheet are already zero here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLine {
    pub goals: u8,
    pub ht_goals: u8,
    pub shots: u16,
    pub shots_on_target: u16,
    pub corners: u16,
    pub yellow_cards: u16,
    pub red_cards: u16,
    pub fouls: u16,
}

impl SideLine {
    /// Booking points: a red card counts as two.
    pub fn cards(&self) -> u16 {
        self.yellow_cards + 2 * self.red_cards
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub competition: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub result: MatchResult,
    pub home: SideLine,
    pub away: SideLine,
}

impl MatchRecord {
    pub fn total_goals(&self) -> u16 {
        u16::from(self.home.goals) + u16::from(self.away.goals)
    }

    pub fn ht_total_goals(&self) -> u16 {
        u16::from(self.home.ht_goals) + u16::from(self.away.ht_goals)
    }

    pub fn both_teams_scored(&self) -> bool {
        self.home.goals > 0 && self.away.goals > 0
    }

    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home_team == team {
            Some(Side::Home)
        } else if self.away_team == team {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn line(&self, side: Side) -> &SideLine {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Re-expresses the row from `team`'s point of view, or `None` when the
    /// team did not play in it.
    pub fn view_for(&self, team: &str) -> Option<TeamMatchView<'_>> {
        let side = self.side_of(team)?;
        Some(TeamMatchView {
            record: self,
            side,
            own: *self.line(side),
            opp: *self.line(side.opposite()),
        })
    }
}

/// A match normalized to one team: `own` is the team's line, `opp` the
/// opponent's, whatever the venue.
#[derive(Debug, Clone, Copy)]
pub struct TeamMatchView<'a> {
    pub record: &'a MatchRecord,
    pub side: Side,
    pub own: SideLine,
    pub opp: SideLine,
}

impl TeamMatchView<'_> {
    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn total_goals(&self) -> u16 {
        self.record.total_goals()
    }

    pub fn ht_total_goals(&self) -> u16 {
        self.record.ht_total_goals()
    }

    pub fn both_teams_scored(&self) -> bool {
        self.record.both_teams_scored()
    }

    pub fn team_result(&self) -> TeamResult {
        match (self.record.result, self.side) {
            (MatchResult::Draw, _) => TeamResult::Draw,
            (MatchResult::Home, Side::Home) | (MatchResult::Away, Side::Away) => TeamResult::Win,
            _ => TeamResult::Loss,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamResult {
    Win,
    Draw,
    Loss,
}

/// Decimal bookmaker prices as published with the fixture list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketOdds {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
    pub over_25: Option<f64>,
    pub under_25: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub competition: String,
    pub date: Option<NaiveDate>,
    pub home_team: String,
    pub away_team: String,
    pub odds: MarketOdds,
}
