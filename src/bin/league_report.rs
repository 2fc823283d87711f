use std::path::PathBuf;

use anyhow::{Result, anyhow};

use futalgo::config::{self, SourceConfig, arg_value};
use futalgo::export;
use futalgo::fetch;
use futalgo::league_report::{FT_REPORT_LINES, LeagueReport, build_league_report};
use futalgo::logging;
use futalgo::match_record::Perspective;
use futalgo::team_form::{FormConfig, aggregate_team_form, season_record};

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut source = SourceConfig::from_env();
    if let Some(raw) = arg_value(&args, "--leagues") {
        source.codes = config::parse_codes(&raw);
    }
    let dir = arg_value(&args, "--dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| source.data_dir.clone());
    let data = fetch::load_dir(&dir, Some(source.codes.as_slice()))?;

    let reports: Vec<LeagueReport> = data
        .dataset
        .competitions()
        .filter_map(|code| {
            let history = data.dataset.competition(code)?;
            build_league_report(code, history, data.dataset.stat_coverage(code))
        })
        .collect();
    if reports.is_empty() {
        return Err(anyhow!("no sheets found in {}", dir.display()));
    }

    let show_teams = config::has_flag(&args, "--teams");
    for r in &reports {
        print_report(r);
        if show_teams && let Some(history) = data.dataset.competition(&r.competition) {
            print_teams(history);
        }
    }

    if let Some(path) = arg_value(&args, "--csv") {
        let path = PathBuf::from(path);
        export::write_csv(&path, &export::league_rows(&reports))?;
        println!("CSV written to {}", path.display());
    }
    Ok(())
}

fn print_report(r: &LeagueReport) {
    let na = |v: Option<f64>| {
        v.map(|x| format!("{x:.1}%"))
            .unwrap_or_else(|| export::NOT_AVAILABLE.to_string())
    };
    let per_game = |v: Option<f64>| {
        v.map(|x| format!("{x:.1}"))
            .unwrap_or_else(|| export::NOT_AVAILABLE.to_string())
    };
    println!();
    println!("{} [{}] - {} matches", r.label, r.competition, r.matches);
    println!(
        "  Home {:.1}%  Draw {:.1}%  Away {:.1}%",
        r.home_win_pct, r.draw_pct, r.away_win_pct
    );
    println!(
        "  Goals/game HT {:.2}  FT {:.2}  1st half {}  2nd half {}",
        r.ht_goals_per_game,
        r.ft_goals_per_game,
        na(r.first_half_goal_share),
        na(r.second_half_goal_share)
    );
    println!(
        "  HT over 0.5 {:.1}%  over 1.5 {:.1}%",
        r.over_05_ht_pct, r.over_15_ht_pct
    );
    let lines = FT_REPORT_LINES
        .iter()
        .zip(r.over_ft_pct)
        .map(|(line, p)| format!("O{line:.1} {p:.1}%"))
        .collect::<Vec<_>>()
        .join("  ");
    println!("  FT {lines}");
    println!("  BTTS {:.1}%  0-0 {:.1}%", r.btts_pct, r.goalless_pct);
    println!(
        "  Per game: corners {}  yellows {}  shots {}  on target {}  fouls {}",
        per_game(r.corners_per_game),
        per_game(r.yellow_cards_per_game),
        per_game(r.shots_per_game),
        per_game(r.shots_on_target_per_game),
        per_game(r.fouls_per_game)
    );
}

fn print_teams(history: &[futalgo::match_record::MatchRecord]) {
    let cfg = FormConfig::default();
    println!(
        "  {:<24} {:>3} {:>3} {:>3} {:>3} {:>6} {:>5} {:>5} {:>6}",
        "Team", "P", "W", "D", "L", "Pts%", "GF", "GA", "O2.5%"
    );
    for team in futalgo::dataset::teams_in(history) {
        let Some(record) = season_record(history, &team) else {
            continue;
        };
        let form = aggregate_team_form(history, &team, Perspective::Either, &cfg);
        let cell = |v: Option<f64>, prec: usize| {
            v.map(|x| format!("{x:.prec$}"))
                .unwrap_or_else(|| export::NOT_AVAILABLE.to_string())
        };
        println!(
            "  {:<24} {:>3} {:>3} {:>3} {:>3} {:>6.1} {:>5} {:>5} {:>6}",
            team,
            record.played,
            record.wins,
            record.draws,
            record.losses,
            record.points_pct,
            cell(form.as_ref().map(|f| f.goals.team), 2),
            cell(form.as_ref().map(|f| f.goals.opponent), 2),
            cell(form.as_ref().map(|f| f.over_25_ft_pct), 1),
        );
    }
}
