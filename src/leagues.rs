use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// Static per-competition adjustments for the scoreline model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeagueParams {
    pub code: &'static str,
    pub name: &'static str,
    pub country: &'static str,
    /// Multiplies both expected-goal intensities.
    pub goal_factor: f64,
    /// Multiplies expected corners, shots and cards.
    pub stat_intensity: f64,
}

impl LeagueParams {
    pub const fn unlisted() -> Self {
        Self {
            code: "",
            name: "",
            country: "",
            goal_factor: 1.0,
            stat_intensity: 1.0,
        }
    }
}

const fn league(
    code: &'static str,
    name: &'static str,
    country: &'static str,
    goal_factor: f64,
    stat_intensity: f64,
) -> LeagueParams {
    LeagueParams {
        code,
        name,
        country,
        goal_factor,
        stat_intensity,
    }
}

pub const LEAGUES: &[LeagueParams] = &[
    league("E0", "Premier League", "England", 1.03, 1.03),
    league("E1", "Championship", "England", 0.97, 1.00),
    league("E2", "League One", "England", 1.00, 0.98),
    league("E3", "League Two", "England", 0.96, 0.97),
    league("SC0", "Premiership", "Scotland", 1.02, 0.98),
    league("SC1", "Championship", "Scotland", 0.98, 0.96),
    league("SC2", "League One", "Scotland", 1.05, 0.95),
    league("SC3", "League Two", "Scotland", 1.04, 0.95),
    league("D1", "Bundesliga", "Germany", 1.10, 1.00),
    league("D2", "2. Bundesliga", "Germany", 1.04, 1.00),
    league("I1", "Serie A", "Italy", 0.97, 1.05),
    league("I2", "Serie B", "Italy", 0.90, 1.04),
    league("SP1", "La Liga", "Spain", 0.95, 1.06),
    league("SP2", "La Liga 2", "Spain", 0.90, 1.05),
    league("F1", "Ligue 1", "France", 1.00, 0.99),
    league("F2", "Ligue 2", "France", 0.92, 0.98),
    league("N1", "Eredivisie", "Netherlands", 1.10, 0.97),
    league("B1", "Jupiler Pro League", "Belgium", 1.05, 1.00),
    league("P1", "Primeira Liga", "Portugal", 0.97, 1.02),
    league("T1", "Super Lig", "Turkey", 1.03, 1.06),
    league("G1", "Super League", "Greece", 0.92, 1.04),
];

static BY_CODE: Lazy<HashMap<&'static str, LeagueParams>> =
    Lazy::new(|| LEAGUES.iter().map(|l| (l.code, *l)).collect());

/// Listed parameters, or neutral factors for an unknown code.
pub fn league_params(code: &str) -> LeagueParams {
    BY_CODE
        .get(code.trim())
        .copied()
        .unwrap_or_else(LeagueParams::unlisted)
}

/// `"Premier League (England)"`, or `"XX (unlisted)"` for unknown codes.
pub fn league_label(code: &str) -> String {
    match BY_CODE.get(code.trim()) {
        Some(l) => format!("{} ({})", l.name, l.country),
        None => format!("{} (unlisted)", code.trim()),
    }
}

pub fn default_codes() -> Vec<&'static str> {
    LEAGUES.iter().map(|l| l.code).collect()
}
