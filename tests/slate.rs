use std::path::PathBuf;

use chrono::NaiveDate;

use futalgo::config::ModelConfig;
use futalgo::export;
use futalgo::fetch::{self, LoadedData};
use futalgo::league_report::build_league_report;
use futalgo::markets::Market;
use futalgo::sheet_parse::StatCoverage;
use futalgo::match_record::Perspective;
use futalgo::slate::{self, SkipReason};
use futalgo::streaks::FixtureTip;
use futalgo::synthetic;

fn fixtures_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn load_fixture_dir() -> LoadedData {
    fetch::load_dir(&fixtures_dir(), None).expect("fixture dir should load")
}

#[test]
fn loads_fixture_directory() {
    let data = load_fixture_dir();
    assert!(data.errors.is_empty());
    assert_eq!(data.dataset.total_matches(), 15);
    assert_eq!(data.fixtures.len(), 4);
    assert_eq!(data.rejected_rows, 2);
    assert_eq!(data.dataset.stat_coverage("E0"), StatCoverage::ALL);
}

#[test]
fn goals_only_sheet_reports_missing_stats() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("I1.csv"),
        "Div,Date,HomeTeam,AwayTeam,FTHG,FTAG,FTR,HTHG,HTAG\n\
         I1,16/08/2025,Inter,Milan,2,1,H,1,0\n\
         I1,23/08/2025,Milan,Inter,1,1,D,0,1\n",
    )
    .unwrap();
    let data = fetch::load_dir(dir.path(), None).unwrap();
    assert_eq!(data.dataset.stat_coverage("I1"), StatCoverage::default());

    let history = data.dataset.competition("I1").unwrap();
    let report = build_league_report("I1", history, data.dataset.stat_coverage("I1")).unwrap();
    assert_eq!(report.corners_per_game, None);
    assert_eq!(report.shots_per_game, None);

    let rows = export::league_rows(&[report]);
    let corners = rows[0].iter().position(|h| h == "Corners/game").unwrap();
    assert_eq!(rows[1][corners], export::NOT_AVAILABLE);
}

#[test]
fn evaluates_fixture_slate() {
    let data = load_fixture_dir();
    let report = slate::analyze_fixtures(&data.dataset, &data.fixtures, &ModelConfig::default());

    let analyzed: Vec<(&str, &str)> = report
        .analyses
        .iter()
        .map(|a| (a.fixture.home_team.as_str(), a.fixture.away_team.as_str()))
        .collect();
    assert_eq!(analyzed, vec![("Chelsea", "Arsenal"), ("Liverpool", "Spurs")]);

    assert_eq!(report.skipped.len(), 2);
    assert_eq!(
        report.skipped[0].reason,
        SkipReason::ThinSample {
            team: "Newcastle".into(),
            matches: 0
        }
    );
    assert_eq!(report.skipped[1].fixture.competition, "SP1");
    assert_eq!(report.skipped[1].reason, SkipReason::UnknownCompetition);
}

#[test]
fn thin_venue_sample_falls_back_to_all_matches() {
    let data = load_fixture_dir();
    let report = slate::analyze_fixtures(&data.dataset, &data.fixtures, &ModelConfig::default());
    let a = &report.analyses[0];
    // Two home games for Chelsea and two away games for Arsenal.
    assert_eq!(a.home_form.perspective, Perspective::Either);
    assert_eq!(a.away_form.perspective, Perspective::Either);
    assert_eq!(a.home_form.sample_size, 5);
    assert_eq!(a.bundle.sample_size, 10);
    assert_eq!(a.fixture.odds.home, Some(2.80));
    assert_eq!(a.implied.home, Some(35.7));
}

#[test]
fn shared_streaks_show_up_as_tips() {
    let data = load_fixture_dir();
    let report = slate::analyze_fixtures(&data.dataset, &data.fixtures, &ModelConfig::default());
    let a = &report.analyses[0];
    let shared: Vec<Market> = a
        .tips
        .iter()
        .filter_map(|t| match t {
            FixtureTip::SharedStreak { market, .. } => Some(*market),
            FixtureTip::Model { .. } => None,
        })
        .collect();
    assert!(shared.contains(&Market::Shots10Plus));
    assert!(shared.contains(&Market::Corners9Plus));
    assert!(!shared.contains(&Market::FtGoalsOver25));

    let arsenal = a
        .away_alerts
        .iter()
        .map(|alert| alert.describe())
        .collect::<Vec<_>>();
    assert!(arsenal.contains(&"Unbeaten in the last 5".to_string()));
    assert!(arsenal.contains(&"Over 2.5 in 4 of the last 5".to_string()));
}

#[test]
fn synthetic_league_is_fully_analyzed() {
    let start = NaiveDate::from_ymd_opt(2025, 8, 9).unwrap();
    let league = synthetic::generate_league("E0", 10, start, 7);
    assert_eq!(league.history.len(), 90);
    assert_eq!(league.fixtures.len(), 5);

    let mut data = LoadedData::default();
    data.dataset.insert_sheet("E0", league.history);
    let report = slate::analyze_fixtures(&data.dataset, &league.fixtures, &ModelConfig::default());
    assert!(report.skipped.is_empty());
    assert_eq!(report.analyses.len(), 5);
    for a in &report.analyses {
        assert_eq!(a.home_form.perspective, Perspective::Home);
        assert_eq!(a.away_form.perspective, Perspective::Away);
        assert_eq!(a.home_form.sample_size, 9);
    }
}

#[test]
fn exports_csv_and_workbook() {
    let data = load_fixture_dir();
    let cfg = ModelConfig::default();
    let report = slate::analyze_fixtures(&data.dataset, &data.fixtures, &cfg);
    let rankings =
        slate::competition_rankings(&data.dataset, &data.fixtures, Market::BothTeamsScored, &cfg);
    let leagues: Vec<_> = slate::slate_competitions(&data.dataset, &data.fixtures)
        .iter()
        .filter_map(|code| {
            let history = data.dataset.competition(code)?;
            build_league_report(code, history, data.dataset.stat_coverage(code))
        })
        .collect();
    assert_eq!(leagues.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("slate.csv");
    export::write_csv(&csv_path, &export::fixture_rows(&report)).unwrap();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(&csv_path)
        .unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "League");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(&rows[0][2], "Chelsea");
    assert_eq!(&rows[0][1], "2025-10-04");
    let overround = headers.iter().position(|h| h == "Overround %").unwrap();
    // 35.7 + 29.4 + 40.0 implied on 2.80 / 3.40 / 2.50.
    assert_eq!(&rows[0][overround], "5.1");
    assert_eq!(&rows[2][overround], export::NOT_AVAILABLE);
    let skipped = &rows[2];
    assert_eq!(&skipped[3], "Newcastle");
    assert_eq!(&skipped[4], export::NOT_AVAILABLE);
    assert_eq!(&skipped[skipped.len() - 1], "Newcastle has only 0 matches");

    let xlsx_path = dir.path().join("slate.xlsx");
    let summary = export::export_workbook(&xlsx_path, &report, &rankings, &leagues).unwrap();
    assert!(xlsx_path.exists());
    assert_eq!(summary.fixtures, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.ranking_rows, 6);
    assert_eq!(summary.leagues, 1);
}
