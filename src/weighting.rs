use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const RECENCY_BASE: f64 = 1.8;
pub const RECENCY_PERIOD_DAYS: f64 = 30.0;

const FULL_SAMPLE: f64 = 15.0;
const MIN_CONFIDENT_SAMPLE: usize = 5;
const GOALS_CAP: f64 = 3.0;
const HIGH_THRESHOLD: f64 = 0.8;
const MEDIUM_THRESHOLD: f64 = 0.65;

/// How matches inside a form window are weighted against each other.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Weighting {
    /// Plain arithmetic mean.
    Uniform,
    /// `base^(-days/period_days)` relative to the newest match in the window.
    Recency { base: f64, period_days: f64 },
}

impl Default for Weighting {
    fn default() -> Self {
        Weighting::Recency {
            base: RECENCY_BASE,
            period_days: RECENCY_PERIOD_DAYS,
        }
    }
}

impl Weighting {
    pub fn weight(&self, match_date: NaiveDate, most_recent: NaiveDate) -> f64 {
        match *self {
            Weighting::Uniform => 1.0,
            Weighting::Recency { base, period_days } => {
                let days = (most_recent - match_date).num_days().max(0) as f64;
                let period = period_days.max(1.0);
                base.max(1.0).powf(-days / period)
            }
        }
    }

    pub fn weights(&self, dates: &[NaiveDate]) -> Vec<f64> {
        let Some(latest) = dates.iter().max().copied() else {
            return Vec::new();
        };
        dates.iter().map(|d| self.weight(*d, latest)).collect()
    }
}

/// `Σ(v·w) / Σw`, or `None` for an empty or zero-weight input.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> Option<f64> {
    if values.is_empty() || values.len() != weights.len() {
        return None;
    }
    let mut num = 0.0;
    let mut den = 0.0;
    for (v, w) in values.iter().zip(weights) {
        num += v * w;
        den += w;
    }
    if den <= 0.0 { None } else { Some(num / den) }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn population_stddev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values
        .iter()
        .map(|v| {
            let d = v - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(var.sqrt())
}

/// `1 − σ / max(1, μ)` of goals scored per match, clamped to `[0, 1]`.
pub fn consistency(goals_per_match: &[f64]) -> f64 {
    let (Some(m), Some(sd)) = (mean(goals_per_match), population_stddev(goals_per_match)) else {
        return 0.0;
    };
    (1.0 - sd / m.max(1.0)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl ConfidenceLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLabel::Low => "Low",
            ConfidenceLabel::Medium => "Medium",
            ConfidenceLabel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence {
    pub label: ConfidenceLabel,
    pub score: f64,
}

pub fn confidence(n_matches: usize, consistency: f64, avg_goals: f64) -> Confidence {
    let sample = (n_matches as f64 / FULL_SAMPLE).min(1.0);
    let consistency = if consistency.is_finite() {
        consistency.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let goals = if avg_goals.is_finite() {
        avg_goals.clamp(0.0, GOALS_CAP)
    } else {
        0.0
    };
    let score =
        (sample * (0.6 + 0.4 * consistency) * (0.7 + 0.3 * goals / GOALS_CAP)).clamp(0.0, 1.0);

    let label = if n_matches < MIN_CONFIDENT_SAMPLE {
        ConfidenceLabel::Low
    } else if score >= HIGH_THRESHOLD {
        ConfidenceLabel::High
    } else if score >= MEDIUM_THRESHOLD {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    };
    Confidence { label, score }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn newest_match_weighs_one_and_older_decay() {
        let w = Weighting::default();
        let latest = d("2025-10-01");
        assert_eq!(w.weight(latest, latest), 1.0);
        let month_old = w.weight(d("2025-09-01"), latest);
        assert!((month_old - 1.0 / 1.8).abs() < 1e-9);
        assert!(w.weight(d("2025-08-01"), latest) < month_old);
    }

    #[test]
    fn uniform_weighting_is_plain_mean() {
        let dates = [d("2025-08-01"), d("2025-10-01")];
        let ws = Weighting::Uniform.weights(&dates);
        assert_eq!(weighted_mean(&[1.0, 3.0], &ws), Some(2.0));
        assert_eq!(weighted_mean(&[], &[]), None);
    }

    #[test]
    fn consistency_is_clamped() {
        assert_eq!(consistency(&[2.0, 2.0, 2.0]), 1.0);
        // Very spread low-scoring sample would go negative unclamped.
        assert_eq!(consistency(&[0.0, 0.0, 0.0, 6.0]), 0.0);
        assert_eq!(consistency(&[]), 0.0);
    }

    #[test]
    fn small_samples_are_always_low() {
        let c = confidence(4, 1.0, 3.0);
        assert_eq!(c.label, ConfidenceLabel::Low);
        let c = confidence(30, 1.0, 3.0);
        assert_eq!(c.label, ConfidenceLabel::High);
        assert!((c.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn score_stays_in_unit_interval() {
        for n in [0, 1, 5, 15, 100] {
            for cons in [-3.0, 0.0, 0.5, 1.0, 4.0, f64::NAN] {
                for goals in [0.0, 1.5, 3.0, 9.0] {
                    let c = confidence(n, cons, goals);
                    assert!((0.0..=1.0).contains(&c.score));
                    if c.label == ConfidenceLabel::High {
                        assert!(c.score >= 0.8);
                    }
                }
            }
        }
    }
}
