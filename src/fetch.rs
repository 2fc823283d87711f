use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::dataset::HistoricalDataset;
use crate::http_client::get_text;
use crate::match_record::Fixture;
use crate::sheet_parse::{parse_fixtures_str, parse_history_str};

pub const FIXTURES_FILE: &str = "fixtures.csv";

/// Everything one load produced, including what went wrong along the way.
#[derive(Debug, Default)]
pub struct LoadedData {
    pub dataset: HistoricalDataset,
    pub fixtures: Vec<Fixture>,
    pub rejected_rows: usize,
    pub errors: Vec<String>,
}

pub fn history_url(cfg: &SourceConfig, code: &str) -> String {
    format!(
        "{}/mmz4281/{}/{}.csv",
        cfg.base_url.trim_end_matches('/'),
        cfg.season,
        code
    )
}

pub fn fixtures_url(cfg: &SourceConfig) -> String {
    format!("{}/{}", cfg.base_url.trim_end_matches('/'), FIXTURES_FILE)
}

/// Downloads every configured sheet plus the fixture list. A sheet that fails
/// is logged and recorded in `errors`; the rest still load. When `save_to` is
/// set the raw files are written there so `load_dir` can replay them.
pub fn fetch_all(cfg: &SourceConfig, save_to: Option<&Path>) -> Result<LoadedData> {
    if let Some(dir) = save_to {
        fs::create_dir_all(dir).with_context(|| format!("failed creating {}", dir.display()))?;
    }
    let mut out = LoadedData::default();

    for code in &cfg.codes {
        let url = history_url(cfg, code);
        match get_text(&url) {
            Ok(raw) => {
                if let Some(dir) = save_to {
                    save_raw(&dir.join(format!("{code}.csv")), &raw)?;
                }
                add_history(&mut out, code, &raw);
            }
            Err(err) => {
                warn!(%code, error = %err, "history download failed");
                out.errors.push(format!("{code}: {err:#}"));
            }
        }
    }

    let url = fixtures_url(cfg);
    match get_text(&url) {
        Ok(raw) => {
            if let Some(dir) = save_to {
                save_raw(&dir.join(FIXTURES_FILE), &raw)?;
            }
            add_fixtures(&mut out, &raw);
        }
        Err(err) => {
            warn!(error = %err, "fixtures download failed");
            out.errors.push(format!("fixtures: {err:#}"));
        }
    }

    log_summary(&out);
    Ok(out)
}

/// Loads `<CODE>.csv` sheets and `fixtures.csv` from a directory. With
/// `codes` set, other sheets are ignored.
pub fn load_dir(dir: &Path, codes: Option<&[String]>) -> Result<LoadedData> {
    let mut out = LoadedData::default();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed listing {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if stem.eq_ignore_ascii_case("fixtures") {
            let raw = read_lossy(&path)?;
            add_fixtures(&mut out, &raw);
            continue;
        }
        let code = stem.to_ascii_uppercase();
        if let Some(wanted) = codes
            && !wanted.iter().any(|c| c == &code)
        {
            continue;
        }
        let raw = read_lossy(&path)?;
        add_history(&mut out, &code, &raw);
    }

    log_summary(&out);
    Ok(out)
}

fn add_history(out: &mut LoadedData, code: &str, raw: &str) {
    match parse_history_str(raw, code) {
        Ok(parsed) => {
            out.rejected_rows += parsed.rejected.len();
            out.dataset.insert_parsed_sheet(code, parsed.rows, parsed.stats);
        }
        Err(err) => {
            warn!(%code, error = %err, "history sheet unreadable");
            out.errors.push(format!("{code}: {err:#}"));
        }
    }
}

fn add_fixtures(out: &mut LoadedData, raw: &str) {
    match parse_fixtures_str(raw) {
        Ok(parsed) => {
            out.rejected_rows += parsed.rejected.len();
            out.fixtures.extend(parsed.rows);
        }
        Err(err) => {
            warn!(error = %err, "fixtures sheet unreadable");
            out.errors.push(format!("fixtures: {err:#}"));
        }
    }
}

fn log_summary(out: &LoadedData) {
    info!(
        competitions = out.dataset.competitions().count(),
        matches = out.dataset.total_matches(),
        fixtures = out.fixtures.len(),
        rejected = out.rejected_rows,
        errors = out.errors.len(),
        "data loaded"
    );
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn save_raw(path: &Path, raw: &str) -> Result<()> {
    fs::write(path, raw).with_context(|| format!("failed writing {}", path.display()))
}
