use chrono::NaiveDate;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};
use tracing::{info, warn};

use crate::error::ReportError;
use crate::ranking::RankedEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Operators,
    Players,
}

impl ReportKind {
    pub fn file_name(self, date: NaiveDate) -> String {
        let stem = match self {
            ReportKind::Operators => "operator_top100",
            ReportKind::Players => "player_top10",
        };
        format!("{stem}_{}.txt", date.format("%Y%m%d"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub operators: PathBuf,
    pub players: PathBuf,
}

// One `rank,id,value` line per entry. Ids get quoted if they'd otherwise break the layout.
pub fn render_entries(entries: &[RankedEntry]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for entry in entries {
        writer.write_record(entry.fields())?;
    }

    writer
        .into_inner()
        .map_err(|e| {
            let source = io::Error::new(e.error().kind(), e.error().to_string());
            ReportError::Render(csv::Error::from(source))
        })
}

/// Writes both reports for `date` into `folder`, replacing any from an earlier run that day.
///
/// Both files are rendered up front and staged next to their destination. If either fails
/// to land, the operator report is rolled back to what was there before the call.
pub fn write_reports(
    folder: &Path,
    date: NaiveDate,
    operators: &[RankedEntry],
    players: &[RankedEntry],
) -> Result<ReportPaths, ReportError> {
    let operator_bytes = render_entries(operators)?;
    let player_bytes = render_entries(players)?;

    fs::create_dir_all(folder).map_err(|source| ReportError::CreateDir {
        path: folder.to_path_buf(),
        source,
    })?;

    let paths = ReportPaths {
        operators: folder.join(ReportKind::Operators.file_name(date)),
        players: folder.join(ReportKind::Players.file_name(date)),
    };

    let staged_operators = stage(folder, &paths.operators, &operator_bytes)?;
    let staged_players = stage(folder, &paths.players, &player_bytes)?;

    // An earlier report for this date stays recoverable until both new files land
    let previous = set_aside(folder, &paths.operators)?;

    if let Err(e) = persist(staged_operators, &paths.operators) {
        if previous.is_some() {
            roll_back(&paths.operators, previous);
        }
        return Err(e);
    }
    if let Err(e) = persist(staged_players, &paths.players) {
        roll_back(&paths.operators, previous);
        return Err(e);
    }

    info!(
        operators = %paths.operators.display(),
        players = %paths.players.display(),
        "reports written"
    );

    Ok(paths)
}

fn stage(folder: &Path, target: &Path, bytes: &[u8]) -> Result<NamedTempFile, ReportError> {
    let write_err = |source| ReportError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(folder).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    Ok(tmp)
}

fn set_aside(folder: &Path, target: &Path) -> Result<Option<TempPath>, ReportError> {
    if !target.is_file() {
        return Ok(None);
    }

    let write_err = |source| ReportError::Write {
        path: target.to_path_buf(),
        source,
    };

    let holder = NamedTempFile::new_in(folder).map_err(write_err)?.into_temp_path();
    fs::rename(target, &holder).map_err(write_err)?;
    Ok(Some(holder))
}

fn roll_back(target: &Path, previous: Option<TempPath>) {
    let outcome = match previous {
        Some(prev) => prev.persist(target).map_err(|e| e.error),
        None => fs::remove_file(target),
    };

    if let Err(e) = outcome {
        warn!(path = %target.display(), error = %e, "could not roll back report, only one report may be present");
    }
}

fn persist(tmp: NamedTempFile, target: &Path) -> Result<(), ReportError> {
    tmp.persist(target).map_err(|e| ReportError::Write {
        path: target.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
