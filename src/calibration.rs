use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::match_record::{MatchRecord, MatchResult, Perspective};
use crate::scoreline;
use crate::slate::side_form;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

impl Prob3 {
    pub fn uniform() -> Self {
        Self {
            home: 1.0 / 3.0,
            draw: 1.0 / 3.0,
            away: 1.0 / 3.0,
        }
    }

    /// From percentages as carried by a probability bundle.
    pub fn from_percent(home: f64, draw: f64, away: f64) -> Self {
        Self {
            home: home / 100.0,
            draw: draw / 100.0,
            away: away / 100.0,
        }
    }

    /// Most likely result; ties go to the home side, then the draw.
    pub fn favourite(&self) -> MatchResult {
        if self.home >= self.draw && self.home >= self.away {
            MatchResult::Home
        } else if self.draw >= self.away {
            MatchResult::Draw
        } else {
            MatchResult::Away
        }
    }

    fn of(&self, outcome: MatchResult) -> f64 {
        match outcome {
            MatchResult::Home => self.home,
            MatchResult::Draw => self.draw,
            MatchResult::Away => self.away,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub samples: usize,
    pub brier: f64,
    pub log_loss: f64,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBin {
    pub bucket_start: f64,
    pub bucket_end: f64,
    pub count: usize,
    pub avg_pred: f64,
    pub actual_rate: f64,
}

/// Share of each result in `outcomes`; uniform when there are none.
pub fn empirical_outcome_probs(outcomes: &[MatchResult]) -> Prob3 {
    if outcomes.is_empty() {
        return Prob3::uniform();
    }
    let n = outcomes.len() as f64;
    let share = |r: MatchResult| outcomes.iter().filter(|o| **o == r).count() as f64 / n;
    Prob3 {
        home: share(MatchResult::Home),
        draw: share(MatchResult::Draw),
        away: share(MatchResult::Away),
    }
}

pub fn evaluate_probs(predictions: &[Prob3], outcomes: &[MatchResult]) -> Metrics {
    if predictions.is_empty() || predictions.len() != outcomes.len() {
        return Metrics::default();
    }

    let n = predictions.len();
    let mut out = Metrics {
        samples: n,
        ..Metrics::default()
    };
    for (p, &outcome) in predictions.iter().zip(outcomes) {
        out.brier += [MatchResult::Home, MatchResult::Draw, MatchResult::Away]
            .into_iter()
            .map(|r| {
                let hit = if r == outcome { 1.0 } else { 0.0 };
                (p.of(r) - hit).powi(2)
            })
            .sum::<f64>();
        out.log_loss -= p.of(outcome).clamp(1e-12, 1.0).ln();
        if p.favourite() == outcome {
            out.accuracy += 1.0;
        }
    }
    out.brier /= n as f64;
    out.log_loss /= n as f64;
    out.accuracy /= n as f64;
    out
}

/// Reliability table for one outcome class.
pub fn calibration_bins(
    predictions: &[Prob3],
    outcomes: &[MatchResult],
    class: MatchResult,
    bins: usize,
) -> Vec<CalibrationBin> {
    let bins = bins.max(2);
    let mut counts = vec![0usize; bins];
    let mut pred_sum = vec![0.0_f64; bins];
    let mut actual_sum = vec![0.0_f64; bins];

    for (p, outcome) in predictions.iter().zip(outcomes) {
        let class_prob = p.of(class).clamp(0.0, 1.0);
        let idx = ((class_prob * bins as f64).floor() as usize).min(bins - 1);
        counts[idx] += 1;
        pred_sum[idx] += class_prob;
        if *outcome == class {
            actual_sum[idx] += 1.0;
        }
    }

    (0..bins)
        .map(|i| {
            let count = counts[i];
            let (avg_pred, actual_rate) = if count > 0 {
                (pred_sum[i] / count as f64, actual_sum[i] / count as f64)
            } else {
                (0.0, 0.0)
            };
            CalibrationBin {
                bucket_start: i as f64 / bins as f64,
                bucket_end: (i + 1) as f64 / bins as f64,
                count,
                avg_pred,
                actual_rate,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub competition: String,
    pub evaluated: usize,
    /// Matches without enough prior form on either side.
    pub skipped: usize,
    pub model: Metrics,
    /// Running league-wide outcome frequencies before each match.
    pub baseline: Metrics,
    pub predictions: Vec<Prob3>,
    pub outcomes: Vec<MatchResult>,
}

/// Walk-forward evaluation: every match is predicted from the matches played
/// strictly before its date.
pub fn backtest_competition(
    code: &str,
    history: &[MatchRecord],
    cfg: &ModelConfig,
) -> BacktestReport {
    let form_cfg = cfg.form_config();
    let rows: Vec<Option<(Prob3, Prob3, MatchResult)>> = (0..history.len())
        .into_par_iter()
        .map(|idx| {
            let target = &history[idx];
            let cutoff = history.partition_point(|m| m.date < target.date);
            let prior = &history[..cutoff];
            let venue = cfg.venue_specific;
            let home = side_form(prior, &target.home_team, Perspective::Home, venue, &form_cfg)?;
            let away = side_form(prior, &target.away_team, Perspective::Away, venue, &form_cfg)?;
            let bundle = scoreline::estimate(&home, &away, code);
            let model = Prob3::from_percent(bundle.p_home_win, bundle.p_draw, bundle.p_away_win);
            let prior_outcomes: Vec<MatchResult> = prior.iter().map(|m| m.result).collect();
            Some((model, empirical_outcome_probs(&prior_outcomes), target.result))
        })
        .collect();

    let mut predictions = Vec::new();
    let mut baselines = Vec::new();
    let mut outcomes = Vec::new();
    for (model, base, outcome) in rows.iter().flatten() {
        predictions.push(*model);
        baselines.push(*base);
        outcomes.push(*outcome);
    }

    BacktestReport {
        competition: code.to_string(),
        evaluated: predictions.len(),
        skipped: history.len() - predictions.len(),
        model: evaluate_probs(&predictions, &outcomes),
        baseline: evaluate_probs(&baselines, &outcomes),
        predictions,
        outcomes,
    }
}
