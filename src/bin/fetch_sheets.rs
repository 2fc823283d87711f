use std::path::PathBuf;

use anyhow::{Result, anyhow};

use futalgo::config::{self, SourceConfig, arg_value};
use futalgo::fetch;
use futalgo::logging;

fn main() -> Result<()> {
    config::load_dotenv();
    logging::init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut source = SourceConfig::from_env();
    if let Some(raw) = arg_value(&args, "--leagues") {
        source.codes = config::parse_codes(&raw);
    }
    if let Some(season) = arg_value(&args, "--season") {
        source.season = season;
    }
    if source.codes.is_empty() {
        return Err(anyhow!("no competition codes resolved for download"));
    }
    let dir = arg_value(&args, "--dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| source.data_dir.clone());

    let data = fetch::fetch_all(&source, Some(dir.as_path()))?;

    println!("Download complete");
    println!("Dir: {}", dir.display());
    println!("Season: {}", source.season);
    println!(
        "Sheets: {}/{}",
        data.dataset.competitions().count(),
        source.codes.len()
    );
    for code in data.dataset.competitions() {
        let rows = data.dataset.competition(code).map(|r| r.len()).unwrap_or(0);
        let latest = data
            .dataset
            .competition(code)
            .and_then(|r| r.last())
            .map(|m| m.date.to_string());
        println!(
            "  {code}: matches={rows} latest={}",
            latest.as_deref().unwrap_or("n/a")
        );
    }
    println!("Fixtures: {}", data.fixtures.len());
    println!("Rejected rows: {}", data.rejected_rows);
    if !data.errors.is_empty() {
        println!("errors: {}", data.errors.len());
        for err in data.errors.iter().take(6) {
            println!("   - {err}");
        }
    }
    Ok(())
}
