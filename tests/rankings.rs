use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use futalgo::markets::Market;
use futalgo::match_record::{MatchRecord, MatchResult, SideLine};
use futalgo::rankings::{RankingConfig, rank_market};
use futalgo::sheet_parse::parse_history_str;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn e0() -> Vec<MatchRecord> {
    parse_history_str(&read_fixture("E0.csv"), "E0")
        .expect("fixture should parse")
        .rows
}

#[test]
fn ranks_over_25_on_fixture_sheet() {
    let rows = rank_market(&e0(), Market::FtGoalsOver25, &RankingConfig::default());
    let order: Vec<(&str, f64)> = rows.iter().map(|r| (r.team.as_str(), r.pct)).collect();
    assert_eq!(
        order,
        vec![
            ("Arsenal", 80.0),
            ("Spurs", 80.0),
            ("Liverpool", 60.0),
            ("Everton", 40.0),
            ("Fulham", 40.0),
            ("Chelsea", 20.0),
        ]
    );
    assert_eq!(rows[0].hits, 4);
    assert_eq!(rows[0].matches_analyzed, 5);
    assert_eq!(rows[0].recent_marks(), "YYNYY");
}

#[test]
fn team_corner_ranking_uses_own_line() {
    let rows = rank_market(&e0(), Market::TeamCorners9Plus, &RankingConfig::default());
    // Only Arsenal's 9 at home to Everton reaches nine on their own.
    assert_eq!(rows[0].team, "Arsenal");
    assert_eq!(rows[0].hits, 1);
    assert!(rows[1..].iter().all(|r| r.hits == 0));
}

fn record(day: u32, home: &str, away: &str, ft: (u8, u8)) -> MatchRecord {
    let side = |goals| SideLine {
        goals,
        ..SideLine::default()
    };
    MatchRecord {
        competition: "T1".into(),
        date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + chrono::Days::new(u64::from(day)),
        home_team: home.into(),
        away_team: away.into(),
        result: MatchResult::from_goals(ft.0, ft.1),
        home: side(ft.0),
        away: side(ft.1),
    }
}

/// Fourteen teams, each with `window` matches against a shared sparring side.
fn wide_league(window: u32) -> Vec<MatchRecord> {
    let mut h = Vec::new();
    for t in 0..14u32 {
        let team = format!("Team {t:02}");
        for n in 0..window {
            // Team t scores over 2.5 in its first `t % 7` matches.
            let ft = if n < t % 7 { (3, 1) } else { (1, 0) };
            h.push(record(t * 40 + n, &team, "Sparring", ft));
        }
    }
    h
}

#[test]
fn keeps_top_ten() {
    let h = wide_league(7);
    let rows = rank_market(&h, Market::FtGoalsOver25, &RankingConfig::default());
    assert_eq!(rows.len(), 10);
    assert!(rows.windows(2).all(|w| w[0].pct >= w[1].pct));
    // Sparring played everything, so its window is the full ten.
    assert!(rows.iter().all(|r| r.matches_analyzed >= 7));
}

#[test]
fn ties_prefer_more_matches_then_name() {
    let mut h = Vec::new();
    for n in 0..6 {
        h.push(record(n, "Zeta", "Pad", (2, 1)));
    }
    for n in 0..5 {
        h.push(record(20 + n, "Alpha", "Pad2", (2, 1)));
        h.push(record(20 + n, "Beta", "Pad3", (2, 1)));
    }
    let cfg = RankingConfig {
        top: 3,
        ..RankingConfig::default()
    };
    let rows = rank_market(&h, Market::FtGoalsOver25, &cfg);
    let names: Vec<&str> = rows.iter().map(|r| r.team.as_str()).collect();
    assert_eq!(names, vec!["Pad", "Zeta", "Alpha"]);
}

#[test]
fn recent_marks_keep_last_five_oldest_first() {
    let mut h = Vec::new();
    let scores = [(3, 0), (3, 0), (0, 0), (3, 0), (0, 0), (3, 0), (3, 0), (0, 0)];
    for (n, ft) in scores.into_iter().enumerate() {
        h.push(record(n as u32, "Solo", "Other", ft));
    }
    let rows = rank_market(&h, Market::FtGoalsOver25, &RankingConfig::default());
    let solo = rows.iter().find(|r| r.team == "Solo").unwrap();
    assert_eq!(solo.matches_analyzed, 8);
    assert_eq!(solo.hits, 5);
    assert_eq!(solo.pct, 62.5);
    assert_eq!(solo.recent_marks(), "YNYYN");
}
