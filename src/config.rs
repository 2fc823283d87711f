use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::leagues;
use crate::rankings::RankingConfig;
use crate::streaks::DEFAULT_STREAK_WINDOW;
use crate::team_form::{DEFAULT_FORM_WINDOW, DEFAULT_MIN_MATCHES, FormConfig};
use crate::weighting::{RECENCY_BASE, RECENCY_PERIOD_DAYS, Weighting};

pub const DEFAULT_BASE_URL: &str = "https://www.football-data.co.uk";
pub const DEFAULT_SEASON: &str = "2526";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_TIP_THRESHOLD: f64 = 70.0;

/// Tunables of the estimation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub form_window: usize,
    pub min_matches: usize,
    pub streak_window: usize,
    pub ranking_window: usize,
    pub ranking_top: usize,
    /// `None` switches to plain arithmetic means.
    pub recency: Option<(f64, f64)>,
    /// Home team judged on home games, away team on away games.
    pub venue_specific: bool,
    pub tip_threshold: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            form_window: DEFAULT_FORM_WINDOW,
            min_matches: DEFAULT_MIN_MATCHES,
            streak_window: DEFAULT_STREAK_WINDOW,
            ranking_window: 10,
            ranking_top: 10,
            recency: Some((RECENCY_BASE, RECENCY_PERIOD_DAYS)),
            venue_specific: true,
            tip_threshold: DEFAULT_TIP_THRESHOLD,
        }
    }
}

impl ModelConfig {
    /// Defaults overridden by `FUTALGO_*` variables; unparsable values are ignored.
    pub fn from_env() -> Self {
        let d = Self::default();
        let recency = if env_bool("FUTALGO_UNIFORM_WEIGHTS").unwrap_or(false) {
            None
        } else {
            let (base, period) = d.recency.unwrap_or((RECENCY_BASE, RECENCY_PERIOD_DAYS));
            Some((
                env_parse::<f64>("FUTALGO_RECENCY_BASE")
                    .unwrap_or(base)
                    .clamp(1.0, 10.0),
                env_parse::<f64>("FUTALGO_RECENCY_DAYS")
                    .unwrap_or(period)
                    .clamp(1.0, 365.0),
            ))
        };
        Self {
            form_window: env_parse("FUTALGO_FORM_WINDOW")
                .unwrap_or(d.form_window)
                .clamp(1, 50),
            min_matches: env_parse("FUTALGO_MIN_MATCHES")
                .unwrap_or(d.min_matches)
                .min(50),
            streak_window: env_parse("FUTALGO_STREAK_WINDOW")
                .unwrap_or(d.streak_window)
                .clamp(1, 20),
            ranking_window: env_parse("FUTALGO_RANKING_WINDOW")
                .unwrap_or(d.ranking_window)
                .clamp(1, 50),
            ranking_top: env_parse("FUTALGO_RANKING_TOP")
                .unwrap_or(d.ranking_top)
                .max(1),
            recency,
            venue_specific: env_bool("FUTALGO_VENUE_FORM").unwrap_or(d.venue_specific),
            tip_threshold: env_parse::<f64>("FUTALGO_TIP_THRESHOLD")
                .unwrap_or(d.tip_threshold)
                .clamp(50.0, 100.0),
        }
    }

    pub fn weighting(&self) -> Weighting {
        match self.recency {
            Some((base, period_days)) => Weighting::Recency { base, period_days },
            None => Weighting::Uniform,
        }
    }

    pub fn form_config(&self) -> FormConfig {
        FormConfig {
            window: self.form_window,
            min_matches: self.min_matches,
            weighting: self.weighting(),
        }
    }

    pub fn ranking_config(&self) -> RankingConfig {
        RankingConfig {
            window: self.ranking_window,
            min_matches: self.min_matches,
            recent: self.streak_window,
            top: self.ranking_top,
        }
    }
}

/// Where the sheets come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub season: String,
    pub codes: Vec<String>,
    pub data_dir: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            season: DEFAULT_SEASON.to_string(),
            codes: leagues::default_codes()
                .into_iter()
                .map(str::to_string)
                .collect(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl SourceConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            base_url: opt_env("FUTALGO_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(d.base_url),
            season: opt_env("FUTALGO_SEASON").unwrap_or(d.season),
            codes: opt_env("FUTALGO_LEAGUES")
                .map(|raw| parse_codes(&raw))
                .filter(|codes| !codes.is_empty())
                .unwrap_or(d.codes),
            data_dir: opt_env("FUTALGO_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(d.data_dir),
        }
    }
}

/// Loads `.env.local` then `.env`; missing files are fine.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// Splits `E0,D1 SP1;I1` into upper-case codes without duplicates.
pub fn parse_codes(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.split([',', ';', ' ']) {
        let code = part.trim().to_ascii_uppercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}

/// Value of `--flag=value` or `--flag value`.
pub fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    opt_env(key).and_then(|val| val.trim().parse::<T>().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    match opt_env(key)?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_values_in_both_forms() {
        let a = args(&["--dir=data/", "--market", "btts", "--xlsx"]);
        assert_eq!(arg_value(&a, "--dir").as_deref(), Some("data/"));
        assert_eq!(arg_value(&a, "--market").as_deref(), Some("btts"));
        assert_eq!(arg_value(&a, "--xlsx"), None);
        assert!(has_flag(&a, "--xlsx"));
    }

    #[test]
    fn codes_are_normalized_and_deduped() {
        assert_eq!(parse_codes("e0, D1;e0  sp1"), vec!["E0", "D1", "SP1"]);
    }

    #[test]
    fn defaults_feed_form_and_rankings() {
        let cfg = ModelConfig::default();
        let form = cfg.form_config();
        assert_eq!(form.window, 10);
        assert_eq!(form.min_matches, 5);
        assert_eq!(form.weighting, Weighting::default());
        let rank = cfg.ranking_config();
        assert_eq!((rank.window, rank.min_matches, rank.recent, rank.top), (10, 5, 5, 10));
        assert_eq!(SourceConfig::default().codes.len(), leagues::LEAGUES.len());
    }
}
