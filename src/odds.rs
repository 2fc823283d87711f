use serde::{Deserialize, Serialize};

use crate::match_record::MarketOdds;
use crate::scoreline::FixtureProbabilityBundle;
use crate::team_form::round1;

/// `100 / odd` rounded to one decimal; `None` for missing, non-finite or
/// non-positive prices.
pub fn implied_probability(odd: Option<f64>) -> Option<f64> {
    let odd = odd?;
    if !odd.is_finite() || odd <= 0.0 {
        return None;
    }
    Some(round1(100.0 / odd))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpliedProbabilities {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
    pub over_25: Option<f64>,
    pub under_25: Option<f64>,
}

impl ImpliedProbabilities {
    pub fn from_odds(odds: &MarketOdds) -> Self {
        Self {
            home: implied_probability(odds.home),
            draw: implied_probability(odds.draw),
            away: implied_probability(odds.away),
            over_25: implied_probability(odds.over_25),
            under_25: implied_probability(odds.under_25),
        }
    }

    /// Bookmaker margin on the 1X2 market, in percentage points.
    pub fn overround(&self) -> Option<f64> {
        Some(round1(self.home? + self.draw? + self.away? - 100.0))
    }
}

/// Model probability minus implied probability, in percentage points.
/// Positive means the model rates the outcome above the price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketEdge {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
    pub over_25: Option<f64>,
    pub under_25: Option<f64>,
}

pub fn market_edge(bundle: &FixtureProbabilityBundle, odds: &MarketOdds) -> MarketEdge {
    let implied = ImpliedProbabilities::from_odds(odds);
    let edge = |model: f64, market: Option<f64>| market.map(|m| round1(model - m));
    let line = bundle.ft_line(2.5);
    MarketEdge {
        home: edge(bundle.p_home_win, implied.home),
        draw: edge(bundle.p_draw, implied.draw),
        away: edge(bundle.p_away_win, implied.away),
        over_25: line.and_then(|l| edge(l.over, implied.over_25)),
        under_25: line.and_then(|l| edge(l.under, implied.under_25)),
    }
}
