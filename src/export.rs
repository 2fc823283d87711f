use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::league_report::{FT_REPORT_LINES, LeagueReport};
use crate::slate::{CompetitionRanking, FixtureAnalysis, SkippedFixture, SlateReport};

/// Marker for values the model could not produce.
pub const NOT_AVAILABLE: &str = "n/a";

pub struct ExportReport {
    pub fixtures: usize,
    pub skipped: usize,
    pub ranking_rows: usize,
    pub leagues: usize,
}

const FIXTURE_HEADER: &[&str] = &[
    "League",
    "Date",
    "Home",
    "Away",
    "Home %",
    "Draw %",
    "Away %",
    "xG Home",
    "xG Away",
    "xG Total",
    "Over 0.5 HT %",
    "Over 0.5 %",
    "Over 1.5 %",
    "Over 2.5 %",
    "Over 3.5 %",
    "Under 2.5 %",
    "BTTS %",
    "Corners",
    "Shots",
    "Shots on target",
    "Cards",
    "Odds Home",
    "Odds Draw",
    "Odds Away",
    "Implied Home %",
    "Implied Draw %",
    "Implied Away %",
    "Overround %",
    "Edge Home",
    "Edge Draw",
    "Edge Away",
    "Edge Over 2.5",
    "Confidence",
    "Score",
    "Matches",
    "Tips",
    "Note",
];

pub fn fixture_rows(report: &SlateReport) -> Vec<Vec<String>> {
    let mut rows = vec![header(FIXTURE_HEADER)];
    rows.extend(report.analyses.iter().map(analysis_row));
    rows.extend(report.skipped.iter().map(skipped_row));
    rows
}

fn analysis_row(a: &FixtureAnalysis) -> Vec<String> {
    let b = &a.bundle;
    let line = |l: f64| b.ft_line(l).map(|g| g.over);
    vec![
        a.fixture.competition.clone(),
        opt_to_string(a.fixture.date),
        a.fixture.home_team.clone(),
        a.fixture.away_team.clone(),
        fmt1(b.p_home_win),
        fmt1(b.p_draw),
        fmt1(b.p_away_win),
        fmt2(b.xg_home),
        fmt2(b.xg_away),
        fmt2(b.xg_total),
        fmt1(b.ht_over_05.over),
        opt_fmt1(line(0.5)),
        opt_fmt1(line(1.5)),
        opt_fmt1(line(2.5)),
        opt_fmt1(line(3.5)),
        opt_fmt1(b.ft_line(2.5).map(|g| g.under)),
        fmt1(b.btts),
        fmt1(b.corners.total),
        fmt1(b.shots.total),
        fmt1(b.shots_on_target.total),
        fmt1(b.cards.total),
        opt_fmt2(a.fixture.odds.home),
        opt_fmt2(a.fixture.odds.draw),
        opt_fmt2(a.fixture.odds.away),
        opt_fmt1(a.implied.home),
        opt_fmt1(a.implied.draw),
        opt_fmt1(a.implied.away),
        opt_fmt1(a.implied.overround()),
        opt_fmt1(a.edge.home),
        opt_fmt1(a.edge.draw),
        opt_fmt1(a.edge.away),
        opt_fmt1(a.edge.over_25),
        b.confidence.label.as_str().to_string(),
        fmt2(b.confidence.score),
        b.sample_size.to_string(),
        a.tips.iter().map(|t| t.describe()).collect::<Vec<_>>().join(" | "),
        String::new(),
    ]
}

/// Skipped fixtures keep their row so nothing silently disappears; every
/// model column reads "n/a".
fn skipped_row(s: &SkippedFixture) -> Vec<String> {
    let mut row = vec![
        s.fixture.competition.clone(),
        opt_to_string(s.fixture.date),
        s.fixture.home_team.clone(),
        s.fixture.away_team.clone(),
    ];
    row.resize(FIXTURE_HEADER.len() - 1, NOT_AVAILABLE.to_string());
    row.push(s.reason.to_string());
    row
}

pub fn ranking_rows(rankings: &[CompetitionRanking]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "League", "Market", "Rank", "Team", "Hits", "Matches", "%", "Last 5",
    ])];
    for ranking in rankings {
        for (idx, row) in ranking.rows.iter().enumerate() {
            rows.push(vec![
                ranking.competition.clone(),
                ranking.market.label().to_string(),
                (idx + 1).to_string(),
                row.team.clone(),
                row.hits.to_string(),
                row.matches_analyzed.to_string(),
                fmt1(row.pct),
                row.recent_marks(),
            ]);
        }
    }
    rows
}

pub fn league_rows(reports: &[LeagueReport]) -> Vec<Vec<String>> {
    let mut head = vec![
        "Code".to_string(),
        "League".to_string(),
        "Matches".to_string(),
        "Home %".to_string(),
        "Draw %".to_string(),
        "Away %".to_string(),
        "HT goals/game".to_string(),
        "FT goals/game".to_string(),
        "1st half goals %".to_string(),
        "2nd half goals %".to_string(),
        "Over 0.5 HT %".to_string(),
        "Over 1.5 HT %".to_string(),
    ];
    head.extend(FT_REPORT_LINES.iter().map(|l| format!("Over {l:.1} %")));
    head.extend(
        [
            "BTTS %",
            "0-0 %",
            "Corners/game",
            "Yellow/game",
            "Shots/game",
            "On target/game",
            "Fouls/game",
        ]
        .map(str::to_string),
    );

    let mut rows = vec![head];
    for r in reports {
        let mut row = vec![
            r.competition.clone(),
            r.label.clone(),
            r.matches.to_string(),
            fmt1(r.home_win_pct),
            fmt1(r.draw_pct),
            fmt1(r.away_win_pct),
            fmt2(r.ht_goals_per_game),
            fmt2(r.ft_goals_per_game),
            opt_fmt1(r.first_half_goal_share),
            opt_fmt1(r.second_half_goal_share),
            fmt1(r.over_05_ht_pct),
            fmt1(r.over_15_ht_pct),
        ];
        row.extend(r.over_ft_pct.iter().map(|p| fmt1(*p)));
        row.extend([
            fmt1(r.btts_pct),
            fmt1(r.goalless_pct),
            opt_fmt1(r.corners_per_game),
            opt_fmt1(r.yellow_cards_per_game),
            opt_fmt1(r.shots_per_game),
            opt_fmt1(r.shots_on_target_per_game),
            opt_fmt1(r.fouls_per_game),
        ]);
        rows.push(row);
    }
    rows
}

/// `;`-separated, as spreadsheet tools in comma-decimal locales expect.
pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed creating {}", path.display()))?;
    for row in rows {
        writer
            .write_record(row)
            .with_context(|| format!("failed writing {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed flushing {}", path.display()))?;
    Ok(())
}

pub fn export_workbook(
    path: &Path,
    slate: &SlateReport,
    rankings: &[CompetitionRanking],
    leagues: &[LeagueReport],
) -> Result<ExportReport> {
    let fixture_rows = fixture_rows(slate);
    let ranking_rows = ranking_rows(rankings);
    let league_rows = league_rows(leagues);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fixtures")?;
        write_rows(sheet, &fixture_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Rankings")?;
        write_rows(sheet, &ranking_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("League")?;
        write_rows(sheet, &league_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        fixtures: slate.analyses.len(),
        skipped: slate.skipped.len(),
        ranking_rows: ranking_rows.len().saturating_sub(1),
        leagues: leagues.len(),
    })
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn fmt1(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt2(v: f64) -> String {
    format!("{v:.2}")
}

fn opt_fmt1(v: Option<f64>) -> String {
    v.map(fmt1).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn opt_fmt2(v: Option<f64>) -> String {
    v.map(fmt2).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_record::{Fixture, MarketOdds};
    use crate::slate::SkipReason;

    #[test]
    fn skipped_fixture_row_is_marked_not_available() {
        let report = SlateReport {
            analyses: Vec::new(),
            skipped: vec![SkippedFixture {
                fixture: Fixture {
                    competition: "ZZ".into(),
                    date: None,
                    home_team: "A".into(),
                    away_team: "B".into(),
                    odds: MarketOdds::default(),
                },
                reason: SkipReason::UnknownCompetition,
            }],
        };
        let rows = fixture_rows(&report);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), FIXTURE_HEADER.len());
        assert_eq!(rows[1][1], NOT_AVAILABLE);
        assert_eq!(rows[1][4], NOT_AVAILABLE);
        assert_eq!(rows[1].last().map(String::as_str), Some("no history for competition"));
    }

    #[test]
    fn league_row_marks_absent_stat_columns() {
        let raw = "Div,Date,HomeTeam,AwayTeam,FTHG,FTAG,FTR,HTHG,HTAG,HC,AC\n\
                   E0,16/08/2025,Arsenal,Chelsea,2,1,H,1,0,6,3\n";
        let parsed = crate::sheet_parse::parse_history_str(raw, "E0").unwrap();
        let report = crate::league_report::build_league_report("E0", &parsed.rows, parsed.stats)
            .unwrap();
        let rows = league_rows(&[report]);
        let col = |name: &str| rows[0].iter().position(|h| h == name).unwrap();
        assert_eq!(rows[1][col("Corners/game")], "9.0");
        assert_eq!(rows[1][col("Shots/game")], NOT_AVAILABLE);
        assert_eq!(rows[1][col("Yellow/game")], NOT_AVAILABLE);
        assert_eq!(rows[1][col("Fouls/game")], NOT_AVAILABLE);
        assert_eq!(rows[1][col("FT goals/game")], "3.00");
    }

    #[test]
    fn missing_values_never_render_as_zero() {
        assert_eq!(opt_fmt1(None), "n/a");
        assert_eq!(opt_fmt1(Some(0.0)), "0.0");
    }
}
