//! One full pass for a reference date:
//!
//! log files
//! WindowRecords (parse)
//! KillAggregator
//! rank_operators / rank_players
//! write_reports
//!
//! Nothing here is kept between runs. Every run recomputes from the raw logs.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::num::NonZeroUsize;
use std::thread;
use tracing::{debug, info, warn};

use crate::aggregation::KillAggregator;
use crate::data_loader::{window_dates, LoadStats, LogNaming, WindowRecords};
use crate::ranking::{rank_operators, rank_players};
use crate::ranking_context::RankingContext;
use crate::report::{write_reports, ReportPaths};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub load: LoadStats,
    pub records: u64,
    pub operators_ranked: usize,
    pub players_ranked: usize,
    pub reports: ReportPaths,
}

pub fn aggregate_window(
    ctx: &RankingContext,
    naming: &dyn LogNaming,
    reference: NaiveDate,
) -> (KillAggregator, LoadStats) {
    let days = window_dates(reference, ctx.n_days);
    let mut records = WindowRecords::new(&ctx.logs_folder, naming, days);

    let mut agg = KillAggregator::new();
    agg.consume(records.by_ref());

    (agg, records.into_stats())
}

// Never more workers than cores, and never more than days to read.
pub fn worker_count(days: usize) -> usize {
    let cores = thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1);
    cores.min(days).max(1)
}

// Consecutive days per worker. Each worker folds its own chunk, partials merge at the end.
pub fn aggregate_window_parallel(
    ctx: &RankingContext,
    naming: &dyn LogNaming,
    reference: NaiveDate,
) -> Result<(KillAggregator, LoadStats)> {
    let days = window_dates(reference, ctx.n_days);
    let workers = worker_count(days.len());
    aggregate_days_parallel(ctx, naming, days, workers)
}

pub fn aggregate_days_parallel(
    ctx: &RankingContext,
    naming: &dyn LogNaming,
    days: Vec<NaiveDate>,
    max_workers: usize,
) -> Result<(KillAggregator, LoadStats)> {
    let logs_folder = ctx.logs_folder.as_path();
    let chunk_len = days.len().div_ceil(max_workers.max(1)).max(1);

    thread::scope(|s| -> Result<(KillAggregator, LoadStats)> {
        let mut workers = Vec::new();
        for (idx, chunk) in days.chunks(chunk_len).enumerate() {
            let chunk = chunk.to_vec();
            let handle = thread::Builder::new()
                .name(format!("log-worker-{idx}"))
                .spawn_scoped(s, move || {
                    let mut records = WindowRecords::new(logs_folder, naming, chunk);
                    let mut agg = KillAggregator::new();
                    agg.consume(records.by_ref());
                    (agg, records.into_stats())
                })
                .context("spawning log worker")?;
            workers.push(handle);
        }
        debug!(workers = workers.len(), days = days.len(), "aggregating window in parallel");

        let mut agg = KillAggregator::new();
        let mut stats = LoadStats::default();
        for worker in workers {
            let (partial, partial_stats) = worker
                .join()
                .map_err(|_| anyhow!("log worker panicked"))?;
            agg.merge(partial);
            stats.merge(partial_stats);
        }

        Ok((agg, stats))
    })
}

pub fn run_reports(
    ctx: &RankingContext,
    naming: &dyn LogNaming,
    reference: NaiveDate,
) -> Result<RunSummary> {
    info!(
        date = %reference,
        n_days = ctx.n_days,
        logs = %ctx.logs_folder.display(),
        parallel = ctx.parallel_days,
        "starting report run"
    );

    let (agg, load) = if ctx.parallel_days {
        aggregate_window_parallel(ctx, naming, reference)?
    } else {
        aggregate_window(ctx, naming, reference)
    };

    if load.files_read == 0 {
        warn!(date = %reference, n_days = ctx.n_days, "no log files found in window, reports will be empty");
    }

    let operators = rank_operators(agg.operators(), ctx.top_n_operator_kills);
    let players = rank_players(agg.players(), ctx.top_n_players);

    let reports = write_reports(&ctx.report_folder, reference, &operators, &players)
        .with_context(|| format!("writing reports for {}", reference.format("%Y%m%d")))?;

    let summary = RunSummary {
        date: reference,
        records: agg.records_seen(),
        operators_ranked: operators.len(),
        players_ranked: players.len(),
        load,
        reports,
    };

    info!(
        records = summary.records,
        files_read = summary.load.files_read,
        missing_days = summary.load.missing_days.len(),
        malformed_lines = summary.load.malformed_lines,
        operators = summary.operators_ranked,
        players = summary.players_ranked,
        "report run finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_loader::DailyLogNaming;
    use chrono::Days;
    use std::fs;

    fn ctx(logs: &std::path::Path, n_days: u32) -> RankingContext {
        RankingContext {
            n_days,
            top_n_operator_kills: 100,
            top_n_players: 10,
            logs_folder: logs.to_path_buf(),
            report_folder: logs.join("reports"),
            parallel_days: true,
        }
    }

    #[test]
    fn worker_count_is_bounded_by_days() {
        assert_eq!(worker_count(1), 1);
        assert_eq!(worker_count(0), 1);
        assert!(worker_count(5000) <= 5000);
        assert!(worker_count(5000) >= 1);
    }

    #[test]
    fn more_days_than_workers_still_covers_every_day() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let reference = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let ctx = ctx(dir.path(), 12);
        for n in 0..12u64 {
            if n == 4 {
                continue;
            }
            let date = reference.checked_sub_days(Days::new(n)).unwrap();
            fs::write(
                dir.path().join(DailyLogNaming.file_name(date)),
                format!("p{},m{n},ash,{n}\nbad\n", n % 3),
            )
            .unwrap();
        }
        let days = window_dates(reference, ctx.n_days);

        // Act
        let (sequential, seq_stats) = aggregate_window(&ctx, &DailyLogNaming, reference);
        let (parallel, par_stats) =
            aggregate_days_parallel(&ctx, &DailyLogNaming, days, 3).unwrap();

        // Assert
        assert_eq!(parallel, sequential);
        assert_eq!(par_stats, seq_stats);
        assert_eq!(par_stats.days_in_window, 12);
        assert_eq!(par_stats.files_read, 11);
        assert_eq!(par_stats.malformed_lines, 11);
        assert_eq!(parallel.records_seen(), 11);
    }
}
