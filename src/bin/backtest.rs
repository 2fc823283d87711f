use std::path::PathBuf;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;

use futalgo::calibration::{self, BacktestReport};
use futalgo::config::{self, ModelConfig, SourceConfig, arg_value, has_flag};
use futalgo::fetch;
use futalgo::logging;
use futalgo::match_record::MatchResult;
use futalgo::synthetic;

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let model = ModelConfig::from_env();
    let mut source = SourceConfig::from_env();
    if let Some(raw) = arg_value(&args, "--leagues") {
        source.codes = config::parse_codes(&raw);
    }

    let sheets = if has_flag(&args, "--synthetic") {
        let start = NaiveDate::from_ymd_opt(2024, 8, 10).ok_or_else(|| anyhow!("bad start date"))?;
        source
            .codes
            .iter()
            .take(3)
            .enumerate()
            .map(|(idx, code)| {
                let seed = 40 + idx as u64;
                let league = synthetic::generate_league(code, 16, start, seed);
                (code.clone(), league.history)
            })
            .collect::<Vec<_>>()
    } else {
        let dir = arg_value(&args, "--dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| source.data_dir.clone());
        let data = fetch::load_dir(&dir, Some(source.codes.as_slice()))?;
        data.dataset
            .competitions()
            .filter_map(|code| Some((code.to_string(), data.dataset.competition(code)?.to_vec())))
            .collect()
    };
    if sheets.is_empty() {
        return Err(anyhow!("no sheets to backtest (try --dir PATH or --synthetic)"));
    }

    println!(
        "{:<6} {:>6} {:>6} {:>8} {:>8} {:>7} {:>8} {:>8} {:>7}",
        "League", "Eval", "Skip", "Brier", "LogLoss", "Acc", "bBrier", "bLogLoss", "bAcc"
    );
    let mut all = Vec::new();
    for (code, history) in &sheets {
        let report = calibration::backtest_competition(code, history, &model);
        print_report(&report);
        all.push(report);
    }

    if has_flag(&args, "--bins") {
        let predictions: Vec<_> = all.iter().flat_map(|r| r.predictions.iter().copied()).collect();
        let outcomes: Vec<_> = all.iter().flat_map(|r| r.outcomes.iter().copied()).collect();
        println!();
        println!("Home-win reliability:");
        for bin in calibration::calibration_bins(&predictions, &outcomes, MatchResult::Home, 10) {
            if bin.count == 0 {
                continue;
            }
            println!(
                "  {:.1}-{:.1}: n={:<4} pred={:.3} actual={:.3}",
                bin.bucket_start, bin.bucket_end, bin.count, bin.avg_pred, bin.actual_rate
            );
        }
    }

    Ok(())
}

fn print_report(r: &BacktestReport) {
    println!(
        "{:<6} {:>6} {:>6} {:>8.4} {:>8.4} {:>7.3} {:>8.4} {:>8.4} {:>7.3}",
        r.competition,
        r.evaluated,
        r.skipped,
        r.model.brier,
        r.model.log_loss,
        r.model.accuracy,
        r.baseline.brier,
        r.baseline.log_loss,
        r.baseline.accuracy
    );
}
