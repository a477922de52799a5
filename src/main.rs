use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use r6_rankings::logging::init_logging;
use r6_rankings::{run_reports, DailyLogNaming, RankingContext};

/*
    Meant to be run once a day by cron or similar. With no arguments it reads
    config/config.json and writes today's reports. --date re-runs a past day.
*/

#[derive(Parser, Debug)]
#[command(
    name = "r6-rankings",
    version,
    about = "Top operators and players from the last N days of match logs"
)]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config/config.json")]
    config: PathBuf,

    /// Reference date as yyyymmdd, defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d").map_err(|e| format!("expected yyyymmdd: {e}"))
}

fn run(cli: Cli) -> Result<()> {
    let ctx = RankingContext::from_file(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());

    run_reports(&ctx, &DailyLogNaming, date)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "report run failed");
            ExitCode::FAILURE
        }
    }
}
