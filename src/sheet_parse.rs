//! Typed conversion of football-data.co.uk sheets.
//!
//! Column access happens only here: every other module works with
//! [`MatchRecord`] / [`Fixture`]. Optional stat columns that are absent or
//! empty become zero; anything present but unparseable rejects the row.

use std::collections::HashMap;
use std::io::Read;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::match_record::{Fixture, MarketOdds, MatchRecord, MatchResult, SideLine};

// `%y` first: `%Y` also takes a two-digit year and would read `25` as 0025.
const DATE_FORMATS: &[&str] = &["%d/%m/%y", "%d/%m/%Y", "%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing value for column {0}")]
    Missing(&'static str),
    #[error("invalid number in column {column}: {value:?}")]
    InvalidNumber { column: &'static str, value: String },
    #[error("invalid date {0:?}")]
    InvalidDate(String),
    #[error("invalid result code {0:?}")]
    InvalidResult(String),
    #[error("half-time goals {ht} exceed full-time goals {ft} for the {side} side")]
    HalfTimeExceedsFullTime { side: &'static str, ht: u8, ft: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: u64,
    pub error: RowError,
}

/// Optional stat pairs present in a history sheet header. A stat counts only
/// when both the home and the away column exist; otherwise its zeros are
/// fill-in, not measurements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatCoverage {
    pub shots: bool,
    pub shots_on_target: bool,
    pub corners: bool,
    pub yellow_cards: bool,
    pub fouls: bool,
}

impl StatCoverage {
    pub const ALL: Self = Self {
        shots: true,
        shots_on_target: true,
        corners: true,
        yellow_cards: true,
        fouls: true,
    };

    fn from_columns(columns: &Columns) -> Self {
        let pair = |home: &str, away: &str| columns.has(home) && columns.has(away);
        Self {
            shots: pair("HS", "AS"),
            shots_on_target: pair("HST", "AST"),
            corners: pair("HC", "AC"),
            yellow_cards: pair("HY", "AY"),
            fouls: pair("HF", "AF"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetParse<T> {
    pub rows: Vec<T>,
    pub rejected: Vec<RejectedRow>,
    /// Stat columns found in the header; all false for a fixtures sheet.
    pub stats: StatCoverage,
}

impl<T> SheetParse<T> {
    fn new() -> Self {
        Self {
            rows: Vec::new(),
            rejected: Vec::new(),
            stats: StatCoverage::default(),
        }
    }
}

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), idx))
            .collect();
        Self { index }
    }

    fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

struct Row<'a> {
    columns: &'a Columns,
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    fn cell(&self, name: &str) -> Option<&'a str> {
        let idx = *self.columns.index.get(name)?;
        let raw = self.record.get(idx)?.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            None
        } else {
            Some(raw)
        }
    }

    fn text(&self, name: &'static str) -> Result<String, RowError> {
        self.cell(name)
            .map(|s| s.to_string())
            .ok_or(RowError::Missing(name))
    }

    fn goals(&self, name: &'static str) -> Result<u8, RowError> {
        let raw = self.cell(name).ok_or(RowError::Missing(name))?;
        let n = parse_count(raw).ok_or_else(|| invalid(name, raw))?;
        u8::try_from(n).map_err(|_| invalid(name, raw))
    }

    /// Optional stat column: absent or empty is zero.
    fn count(&self, name: &'static str) -> Result<u16, RowError> {
        match self.cell(name) {
            None => Ok(0),
            Some(raw) => parse_count(raw).ok_or_else(|| invalid(name, raw)),
        }
    }

    fn odds(&self, name: &str) -> Option<f64> {
        self.cell(name)
            .and_then(|raw| raw.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
    }
}

fn invalid(column: &'static str, raw: &str) -> RowError {
    RowError::InvalidNumber {
        column,
        value: raw.to_string(),
    }
}

/// Accepts `12` as well as `12.0` (sheets exported from spreadsheets).
fn parse_count(raw: &str) -> Option<u16> {
    if let Ok(n) = raw.parse::<u16>() {
        return Some(n);
    }
    let v = raw.parse::<f64>().ok()?;
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > f64::from(u16::MAX) {
        return None;
    }
    Some(v as u16)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Parses one competition sheet of played matches. `fallback_competition` is
/// used when the sheet has no `Div` column.
pub fn parse_history_csv<R: Read>(
    reader: R,
    fallback_competition: &str,
) -> Result<SheetParse<MatchRecord>> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers().context("read history sheet header")?.clone();
    let columns = Columns::from_headers(&headers);
    let mut out = SheetParse::new();
    out.stats = StatCoverage::from_columns(&columns);

    for item in rdr.records() {
        let record = item.context("read history sheet row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        // Trailing blank lines are common in exported sheets.
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let row = Row {
            columns: &columns,
            record: &record,
        };
        match match_from_row(&row, fallback_competition) {
            Ok(m) => out.rows.push(m),
            Err(error) => {
                tracing::warn!(line, %error, "rejected history row");
                out.rejected.push(RejectedRow { line, error });
            }
        }
    }
    Ok(out)
}

pub fn parse_history_str(raw: &str, fallback_competition: &str) -> Result<SheetParse<MatchRecord>> {
    parse_history_csv(raw.as_bytes(), fallback_competition)
}

fn match_from_row(row: &Row<'_>, fallback_competition: &str) -> Result<MatchRecord, RowError> {
    let competition = row
        .cell("Div")
        .unwrap_or(fallback_competition)
        .to_string();
    let raw_date = row.cell("Date").ok_or(RowError::Missing("Date"))?;
    let date = parse_date(raw_date).ok_or_else(|| RowError::InvalidDate(raw_date.to_string()))?;
    let home_team = row.text("HomeTeam")?;
    let away_team = row.text("AwayTeam")?;

    let home = SideLine {
        goals: row.goals("FTHG")?,
        ht_goals: row.goals("HTHG")?,
        shots: row.count("HS")?,
        shots_on_target: row.count("HST")?,
        corners: row.count("HC")?,
        yellow_cards: row.count("HY")?,
        red_cards: row.count("HR")?,
        fouls: row.count("HF")?,
    };
    let away = SideLine {
        goals: row.goals("FTAG")?,
        ht_goals: row.goals("HTAG")?,
        shots: row.count("AS")?,
        shots_on_target: row.count("AST")?,
        corners: row.count("AC")?,
        yellow_cards: row.count("AY")?,
        red_cards: row.count("AR")?,
        fouls: row.count("AF")?,
    };
    if home.ht_goals > home.goals {
        return Err(RowError::HalfTimeExceedsFullTime {
            side: "home",
            ht: home.ht_goals,
            ft: home.goals,
        });
    }
    if away.ht_goals > away.goals {
        return Err(RowError::HalfTimeExceedsFullTime {
            side: "away",
            ht: away.ht_goals,
            ft: away.goals,
        });
    }

    let result = match row.cell("FTR") {
        Some(code) => {
            MatchResult::from_code(code).ok_or_else(|| RowError::InvalidResult(code.to_string()))?
        }
        None => MatchResult::from_goals(home.goals, away.goals),
    };

    Ok(MatchRecord {
        competition,
        date,
        home_team,
        away_team,
        result,
        home,
        away,
    })
}

/// Parses the upcoming fixtures sheet. Rows without a competition code or
/// team names are rejected; an unreadable date is kept as `None`.
pub fn parse_fixtures_csv<R: Read>(reader: R) -> Result<SheetParse<Fixture>> {
    let mut rdr = csv_reader(reader);
    let headers = rdr.headers().context("read fixtures sheet header")?.clone();
    let columns = Columns::from_headers(&headers);
    if !columns.has("Div") {
        tracing::warn!("fixtures sheet has no Div column; every row will be rejected");
    }
    let mut out = SheetParse::new();

    for item in rdr.records() {
        let record = item.context("read fixtures sheet row")?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let row = Row {
            columns: &columns,
            record: &record,
        };
        match fixture_from_row(&row) {
            Ok(f) => out.rows.push(f),
            Err(error) => {
                tracing::warn!(line, %error, "rejected fixture row");
                out.rejected.push(RejectedRow { line, error });
            }
        }
    }
    Ok(out)
}

pub fn parse_fixtures_str(raw: &str) -> Result<SheetParse<Fixture>> {
    parse_fixtures_csv(raw.as_bytes())
}

fn fixture_from_row(row: &Row<'_>) -> Result<Fixture, RowError> {
    Ok(Fixture {
        competition: row.text("Div")?,
        date: row.cell("Date").and_then(parse_date),
        home_team: row.text("HomeTeam")?,
        away_team: row.text("AwayTeam")?,
        odds: MarketOdds {
            home: row.odds("B365H").or_else(|| row.odds("AvgH")),
            draw: row.odds("B365D").or_else(|| row.odds("AvgD")),
            away: row.odds("B365A").or_else(|| row.odds("AvgA")),
            over_25: row.odds("B365>2.5").or_else(|| row.odds("Avg>2.5")),
            under_25: row.odds("B365<2.5").or_else(|| row.odds("Avg<2.5")),
        },
    })
}
