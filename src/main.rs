use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use futalgo::config::{self, ModelConfig, SourceConfig, arg_value, has_flag};
use futalgo::dataset::HistoricalDataset;
use futalgo::export;
use futalgo::fetch::{self, LoadedData};
use futalgo::league_report::{LeagueReport, build_league_report};
use futalgo::logging;
use futalgo::markets::Market;
use futalgo::match_record::Fixture;
use futalgo::slate::{self, CompetitionRanking, FixtureAnalysis, SlateReport};
use futalgo::synthetic;

const USAGE: &str = "usage: futalgo [--dir PATH | --fetch | --synthetic[=SEED]] [--leagues E0,D1] \
[--market KEY] [--csv PATH] [--xlsx PATH] [--json]";

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        println!("markets:");
        for m in Market::ALL {
            println!("  {:<16} {}", m.key(), m.label());
        }
        return Ok(());
    }

    let model = ModelConfig::from_env();
    let mut source = SourceConfig::from_env();
    if let Some(raw) = arg_value(&args, "--leagues") {
        source.codes = config::parse_codes(&raw);
    }
    let market = match arg_value(&args, "--market") {
        Some(key) => Market::from_key(&key)
            .ok_or_else(|| anyhow!("unknown market {key:?}; see --help"))?,
        None => Market::FtGoalsOver25,
    };

    let data = load(&args, &source)?;
    for err in &data.errors {
        warn!("{err}");
    }
    if data.dataset.is_empty() {
        return Err(anyhow!("no historical sheets loaded"));
    }

    let report = slate::analyze_fixtures(&data.dataset, &data.fixtures, &model);
    let rankings = slate::competition_rankings(&data.dataset, &data.fixtures, market, &model);
    let leagues = league_reports(&data.dataset, &data.fixtures);
    info!(
        analyzed = report.analyses.len(),
        skipped = report.skipped.len(),
        "slate evaluated"
    );

    if has_flag(&args, "--json") {
        let json = serde_json::to_string_pretty(&report).context("serialize slate")?;
        println!("{json}");
    } else {
        print_slate(&report);
        print_rankings(&rankings);
        print_leagues(&leagues);
    }

    if let Some(path) = arg_value(&args, "--csv") {
        let path = PathBuf::from(path);
        export::write_csv(&path, &export::fixture_rows(&report))?;
        println!("CSV written to {}", path.display());
    }
    if let Some(path) = arg_value(&args, "--xlsx") {
        let path = PathBuf::from(path);
        let summary = export::export_workbook(&path, &report, &rankings, &leagues)?;
        println!(
            "Workbook written to {} ({} fixtures, {} skipped, {} ranking rows, {} leagues)",
            path.display(),
            summary.fixtures,
            summary.skipped,
            summary.ranking_rows,
            summary.leagues
        );
    }
    Ok(())
}

fn load(args: &[String], source: &SourceConfig) -> Result<LoadedData> {
    if has_flag(args, "--synthetic") || arg_value(args, "--synthetic").is_some() {
        let seed = arg_value(args, "--synthetic")
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(2526);
        return Ok(synthetic_data(source, seed));
    }
    if has_flag(args, "--fetch") {
        return fetch::fetch_all(source, Some(source.data_dir.as_path()));
    }
    let dir = arg_value(args, "--dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| source.data_dir.clone());
    if dir.is_dir() {
        return fetch::load_dir(&dir, Some(source.codes.as_slice()));
    }
    info!(dir = %dir.display(), "no local data directory, downloading");
    fetch::fetch_all(source, Some(dir.as_path()))
}

fn synthetic_data(source: &SourceConfig, seed: u64) -> LoadedData {
    let start = NaiveDate::from_ymd_opt(2025, 8, 9).unwrap_or_else(|| Local::now().date_naive());
    let mut out = LoadedData::default();
    for (idx, code) in source.codes.iter().take(4).enumerate() {
        let league = synthetic::generate_league(code, 12, start, seed + idx as u64);
        out.dataset.insert_sheet(code, league.history);
        out.fixtures.extend(league.fixtures);
    }
    out
}

fn league_reports(dataset: &HistoricalDataset, fixtures: &[Fixture]) -> Vec<LeagueReport> {
    slate::slate_competitions(dataset, fixtures)
        .iter()
        .filter_map(|code| {
            build_league_report(code, dataset.competition(code)?, dataset.stat_coverage(code))
        })
        .collect()
}

fn print_slate(report: &SlateReport) {
    println!(
        "{:<5} {:<22} {:<22} {:>6} {:>6} {:>6} {:>5} {:>6} {:>6} {:>6} {:<7}",
        "Lg", "Home", "Away", "1%", "X%", "2%", "xG", "O2.5%", "BTTS%", "Corn", "Conf"
    );
    for a in &report.analyses {
        print_analysis(a);
    }
    if !report.skipped.is_empty() {
        println!();
        println!("Skipped {} fixtures:", report.skipped.len());
        for s in report.skipped.iter().take(20) {
            println!(
                "  {} {} v {}: {}",
                s.fixture.competition, s.fixture.home_team, s.fixture.away_team, s.reason
            );
        }
    }
}

fn print_analysis(a: &FixtureAnalysis) {
    let b = &a.bundle;
    let over = b
        .ft_line(2.5)
        .map(|l| format!("{:.1}", l.over))
        .unwrap_or_else(|| export::NOT_AVAILABLE.to_string());
    println!(
        "{:<5} {:<22} {:<22} {:>6.1} {:>6.1} {:>6.1} {:>5.2} {:>6} {:>6.1} {:>6.1} {:<7}",
        a.fixture.competition,
        truncate(&a.fixture.home_team, 22),
        truncate(&a.fixture.away_team, 22),
        b.p_home_win,
        b.p_draw,
        b.p_away_win,
        b.xg_total,
        over,
        b.btts,
        b.corners.total,
        b.confidence.label.as_str(),
    );
    if let Some(margin) = a.implied.overround() {
        println!("      1X2 overround: {margin:.1}%");
    }
    for tip in &a.tips {
        println!("      tip: {}", tip.describe());
    }
    for (team, alerts) in [
        (&a.fixture.home_team, &a.home_alerts),
        (&a.fixture.away_team, &a.away_alerts),
    ] {
        for alert in alerts {
            println!("      {team}: {}", alert.describe());
        }
    }
}

fn print_rankings(rankings: &[CompetitionRanking]) {
    for ranking in rankings {
        println!();
        println!("{} ranking: {}", ranking.competition, ranking.market.label());
        for (idx, row) in ranking.rows.iter().enumerate() {
            println!(
                "  {:>2}. {:<24} {:>2}/{:<2} {:>5.1}%  {}",
                idx + 1,
                truncate(&row.team, 24),
                row.hits,
                row.matches_analyzed,
                row.pct,
                row.recent_marks()
            );
        }
    }
}

fn print_leagues(reports: &[LeagueReport]) {
    for r in reports {
        println!();
        println!("{}: {} matches", r.label, r.matches);
        println!(
            "  1/X/2 {:.1}/{:.1}/{:.1}%  goals/game HT {:.2} FT {:.2}  BTTS {:.1}%  O2.5 {:.1}%",
            r.home_win_pct,
            r.draw_pct,
            r.away_win_pct,
            r.ht_goals_per_game,
            r.ft_goals_per_game,
            r.btts_pct,
            r.over_ft_pct[2]
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).chain(['~']).collect()
    }
}
