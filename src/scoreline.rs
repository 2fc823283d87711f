use serde::{Deserialize, Serialize};

use crate::leagues::league_params;
use crate::team_form::{StatPair, TeamFormSnapshot};
use crate::weighting::{self, Confidence};

/// Goal counts are modelled on 0..=MAX_GOALS; the last bucket holds the tail ("6+").
pub const MAX_GOALS: usize = 6;

const HOME_ADVANTAGE: f64 = 1.1;
const AWAY_FACTOR: f64 = 0.9;
const OWN_WEIGHT: f64 = 0.7;
const OPP_WEIGHT: f64 = 0.3;
const MIN_LAMBDA: f64 = 0.1;
const MIN_HT_LAMBDA: f64 = 0.05;

pub const FT_LINES: [f64; 4] = [0.5, 1.5, 2.5, 3.5];

#[derive(Debug, Clone, Copy)]
struct StatModel {
    home_factor: f64,
    away_factor: f64,
    lo: f64,
    hi: f64,
}

const CORNERS: StatModel = StatModel {
    home_factor: 1.05,
    away_factor: 0.95,
    lo: 2.0,
    hi: 15.0,
};
const SHOTS: StatModel = StatModel {
    home_factor: 1.05,
    away_factor: 0.95,
    lo: 4.0,
    hi: 30.0,
};
const SHOTS_ON_TARGET: StatModel = StatModel {
    home_factor: 1.05,
    away_factor: 0.95,
    lo: 1.0,
    hi: 12.0,
};
// Away sides pick up slightly more bookings.
const CARDS: StatModel = StatModel {
    home_factor: 0.95,
    away_factor: 1.05,
    lo: 0.5,
    hi: 8.0,
};

/// Independent Poisson goal counts for both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDistribution {
    pub home: Vec<f64>,
    pub away: Vec<f64>,
}

impl GoalDistribution {
    pub fn new(lambda_home: f64, lambda_away: f64) -> Self {
        Self {
            home: poisson_pmf(lambda_home, MAX_GOALS as u32),
            away: poisson_pmf(lambda_away, MAX_GOALS as u32),
        }
    }

    pub fn p_home_win(&self) -> f64 {
        let mut p = 0.0;
        for (i, p_i) in self.home.iter().enumerate().skip(1) {
            let below: f64 = self.away.iter().take(i).sum();
            p += p_i * below;
        }
        p
    }

    pub fn p_draw(&self) -> f64 {
        self.home
            .iter()
            .zip(&self.away)
            .map(|(h, a)| h * a)
            .sum()
    }

    pub fn p_away_win(&self) -> f64 {
        (1.0 - self.p_home_win() - self.p_draw()).max(0.0)
    }

    /// `P(total > line)` for a half-goal line such as 2.5.
    pub fn p_over(&self, line: f64) -> f64 {
        let max_total = line.floor().max(0.0) as usize;
        let mut under = 0.0;
        for (i, p_i) in self.home.iter().enumerate() {
            for (j, p_j) in self.away.iter().enumerate() {
                if i + j <= max_total {
                    under += p_i * p_j;
                }
            }
        }
        clamp(1.0 - under, 0.0, 1.0)
    }

    pub fn p_btts(&self) -> f64 {
        let h0 = self.home[0];
        let a0 = self.away[0];
        clamp(1.0 - (h0 + a0 - h0 * a0), 0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalLine {
    pub line: f64,
    pub over: f64,
    pub under: f64,
}

impl GoalLine {
    fn from_over(line: f64, p_over: f64) -> Self {
        Self {
            line,
            over: p_over * 100.0,
            under: (1.0 - p_over) * 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedStat {
    pub home: f64,
    pub away: f64,
    pub total: f64,
}

/// Model output for one fixture. Probabilities are percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureProbabilityBundle {
    pub competition: String,
    pub home_team: String,
    pub away_team: String,
    pub p_home_win: f64,
    pub p_draw: f64,
    pub p_away_win: f64,
    pub xg_home: f64,
    pub xg_away: f64,
    pub xg_total: f64,
    pub xg_ht_home: f64,
    pub xg_ht_away: f64,
    pub ft_lines: [GoalLine; 4],
    pub ht_over_05: GoalLine,
    pub btts: f64,
    pub corners: ExpectedStat,
    pub shots: ExpectedStat,
    pub shots_on_target: ExpectedStat,
    pub cards: ExpectedStat,
    pub confidence: Confidence,
    pub sample_size: usize,
}

impl FixtureProbabilityBundle {
    pub fn ft_line(&self, line: f64) -> Option<&GoalLine> {
        self.ft_lines.iter().find(|l| (l.line - line).abs() < 1e-9)
    }
}

/// `(λ_home, λ_away)` for the full match.
pub fn expected_goals(
    home: &TeamFormSnapshot,
    away: &TeamFormSnapshot,
    competition: &str,
) -> (f64, f64) {
    let factor = league_params(competition).goal_factor;
    let lh = (home.goals.team * OWN_WEIGHT + away.goals.opponent * OPP_WEIGHT)
        * HOME_ADVANTAGE
        * factor;
    let la = (away.goals.team * OWN_WEIGHT + home.goals.opponent * OPP_WEIGHT)
        * AWAY_FACTOR
        * factor;
    (lh.max(MIN_LAMBDA), la.max(MIN_LAMBDA))
}

pub fn expected_ht_goals(
    home: &TeamFormSnapshot,
    away: &TeamFormSnapshot,
    competition: &str,
) -> (f64, f64) {
    let factor = league_params(competition).goal_factor;
    let lh = (home.ht_goals.team * OWN_WEIGHT + away.ht_goals.opponent * OPP_WEIGHT)
        * HOME_ADVANTAGE
        * factor;
    let la = (away.ht_goals.team * OWN_WEIGHT + home.ht_goals.opponent * OPP_WEIGHT)
        * AWAY_FACTOR
        * factor;
    (lh.max(MIN_HT_LAMBDA), la.max(MIN_HT_LAMBDA))
}

pub fn estimate(
    home: &TeamFormSnapshot,
    away: &TeamFormSnapshot,
    competition: &str,
) -> FixtureProbabilityBundle {
    let (lh, la) = expected_goals(home, away, competition);
    let (lh_ht, la_ht) = expected_ht_goals(home, away, competition);
    let ft = GoalDistribution::new(lh, la);
    let ht = GoalDistribution::new(lh_ht, la_ht);

    let (p_home, p_draw, p_away) = normalized_outcomes(&ft);
    let intensity = league_params(competition).stat_intensity;

    let n = home.sample_size + away.sample_size;
    let consistency = (home.consistency + away.consistency) / 2.0;
    let avg_goals = (home.avg_total_goals + away.avg_total_goals) / 2.0;

    FixtureProbabilityBundle {
        competition: competition.to_string(),
        home_team: home.team.clone(),
        away_team: away.team.clone(),
        p_home_win: p_home * 100.0,
        p_draw: p_draw * 100.0,
        p_away_win: p_away * 100.0,
        xg_home: lh,
        xg_away: la,
        xg_total: lh + la,
        xg_ht_home: lh_ht,
        xg_ht_away: la_ht,
        ft_lines: FT_LINES.map(|line| GoalLine::from_over(line, ft.p_over(line))),
        ht_over_05: GoalLine::from_over(0.5, ht.p_over(0.5)),
        btts: ft.p_btts() * 100.0,
        corners: expected_stat(home.corners, away.corners, CORNERS, intensity),
        shots: expected_stat(home.shots, away.shots, SHOTS, intensity),
        shots_on_target: expected_stat(
            home.shots_on_target,
            away.shots_on_target,
            SHOTS_ON_TARGET,
            intensity,
        ),
        cards: expected_stat(home.cards, away.cards, CARDS, intensity),
        confidence: weighting::confidence(n, consistency, avg_goals),
        sample_size: n,
    }
}

fn expected_stat(home: StatPair, away: StatPair, model: StatModel, intensity: f64) -> ExpectedStat {
    let (hf, af) = (model.home_factor, model.away_factor);
    let home_xs = (OWN_WEIGHT * home.team * hf + OPP_WEIGHT * away.opponent * af) * intensity;
    let away_xs = (OWN_WEIGHT * away.team * af + OPP_WEIGHT * home.opponent * hf) * intensity;
    let home = clamp(home_xs, model.lo, model.hi);
    let away = clamp(away_xs, model.lo, model.hi);
    ExpectedStat {
        home,
        away,
        total: home + away,
    }
}

fn normalized_outcomes(dist: &GoalDistribution) -> (f64, f64, f64) {
    let p_home = dist.p_home_win();
    let p_draw = dist.p_draw();
    let p_away = dist.p_away_win();
    // Guard against tiny float drift.
    let sum = p_home + p_draw + p_away;
    if sum > 0.0 {
        (p_home / sum, p_draw / sum, p_away / sum)
    } else {
        (1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)
    }
}

/// PMF on 0..=max_k with the remaining tail mass added to the last bucket.
pub fn poisson_pmf(lambda: f64, max_k: u32) -> Vec<f64> {
    let max_k = max_k as usize;
    let mut out = vec![0.0; max_k + 1];
    let lambda = lambda.max(0.0);

    out[0] = (-lambda).exp();
    for k in 1..=max_k {
        out[k] = out[k - 1] * lambda / k as f64;
    }

    let sum: f64 = out.iter().sum();
    if sum < 1.0 {
        out[max_k] += 1.0 - sum;
    }
    out
}

fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pmf_sums_to_one_with_tail_bucket() {
        let pmf = poisson_pmf(2.7, 6);
        assert_eq!(pmf.len(), 7);
        let sum: f64 = pmf.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!((pmf[0] - (-2.7f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn outcomes_sum_to_one() {
        for (lh, la) in [(0.1, 0.1), (1.4, 1.1), (3.5, 0.4), (0.6, 2.9)] {
            let d = GoalDistribution::new(lh, la);
            let (h, dr, a) = normalized_outcomes(&d);
            assert!((h + dr + a - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn stronger_home_intensity_favours_home() {
        let d = GoalDistribution::new(2.2, 0.7);
        assert!(d.p_home_win() > d.p_away_win());
    }

    #[test]
    fn over_lines_are_monotonic() {
        let d = GoalDistribution::new(1.6, 1.2);
        let overs: Vec<f64> = FT_LINES.iter().map(|l| d.p_over(*l)).collect();
        assert!(overs.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn btts_matches_closed_form() {
        let d = GoalDistribution::new(1.0, 2.0);
        let expected = (1.0 - (-1.0f64).exp()) * (1.0 - (-2.0f64).exp());
        assert!((d.p_btts() - expected).abs() < 1e-12);
    }

    #[test]
    fn expected_stat_is_clamped() {
        let busy = StatPair {
            team: 40.0,
            opponent: 40.0,
        };
        let s = expected_stat(busy, StatPair::default(), CORNERS, 1.0);
        assert_eq!(s.home, 15.0);
        assert_eq!(s.away, CORNERS.hi.min(s.away).max(2.0));
        assert!(s.away >= 2.0);
        assert_eq!(s.total, s.home + s.away);
    }
}
