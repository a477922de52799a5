use chrono::{Days, NaiveDate};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Split};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ParseError;

// playerId,matchId,operatorId,killCount
pub const LOG_FIELD_COUNT: usize = 4;

// One player's operator usage in one match. The date comes from the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub player_id: String,
    pub match_id: String,
    pub operator_id: String,
    pub kill_count: u32,
}

fn log_reader() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.has_headers(false).flexible(true).trim(Trim::All);
    builder
}

pub fn parse_line(line: &str, date: NaiveDate) -> Result<MatchRecord, ParseError> {
    let mut reader = log_reader().from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(raw)) => parse_record(&raw, date),
        Some(Err(e)) => match e.kind() {
            csv::ErrorKind::Utf8 { .. } => Err(ParseError::Encoding),
            _ => Err(ParseError::Malformed(e.to_string())),
        },
        None => Err(ParseError::FieldCount {
            expected: LOG_FIELD_COUNT,
            found: 0,
        }),
    }
}

pub fn parse_record(raw: &StringRecord, date: NaiveDate) -> Result<MatchRecord, ParseError> {
    if raw.len() != LOG_FIELD_COUNT {
        return Err(ParseError::FieldCount {
            expected: LOG_FIELD_COUNT,
            found: raw.len(),
        });
    }

    Ok(MatchRecord {
        date,
        player_id: non_empty(&raw[0], "player id")?,
        match_id: non_empty(&raw[1], "match id")?,
        operator_id: non_empty(&raw[2], "operator id")?,
        kill_count: parse_kill_count(&raw[3])?,
    })
}

// Raw bytes of one line, newline already stripped. A stray quote can't run past the line.
pub fn parse_bytes(line: &[u8], date: NaiveDate) -> Result<MatchRecord, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::Encoding)?;
    parse_line(line, date)
}

fn non_empty(field: &str, name: &'static str) -> Result<String, ParseError> {
    if field.is_empty() {
        return Err(ParseError::EmptyField(name));
    }
    Ok(field.to_string())
}

fn parse_kill_count(field: &str) -> Result<u32, ParseError> {
    if let Ok(kills) = field.parse::<u32>() {
        return Ok(kills);
    }

    // "-3" and "abc" get different errors
    match field.parse::<i64>() {
        Ok(n) if n < 0 => Err(ParseError::NegativeKillCount(n)),
        _ => Err(ParseError::NotNumeric(field.to_string())),
    }
}

//-----------------------------------------------------------------------------
// Window discovery
//-----------------------------------------------------------------------------

/// Maps a calendar day to the name of that day's log file.
pub trait LogNaming: Send + Sync {
    fn file_name(&self, date: NaiveDate) -> String;
}

/// `r6-matches-<yyyymmdd>.log`, the name the match servers write.
#[derive(Debug, Clone, Copy, Default)]
pub struct DailyLogNaming;

impl LogNaming for DailyLogNaming {
    fn file_name(&self, date: NaiveDate) -> String {
        format!("r6-matches-{}.log", date.format("%Y%m%d"))
    }
}

// Reference date first, then backwards. Days before the calendar's start are just dropped.
pub fn window_dates(reference: NaiveDate, n_days: u32) -> Vec<NaiveDate> {
    (0..u64::from(n_days))
        .filter_map(|i| reference.checked_sub_days(Days::new(i)))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub days_in_window: usize,
    pub files_read: usize,
    pub missing_days: Vec<NaiveDate>,
    pub unreadable_days: Vec<NaiveDate>,
    pub lines_read: u64,
    pub malformed_lines: u64,
}

impl LoadStats {
    pub fn merge(&mut self, other: LoadStats) {
        self.days_in_window += other.days_in_window;
        self.files_read += other.files_read;
        self.missing_days.extend(other.missing_days);
        self.unreadable_days.extend(other.unreadable_days);
        self.lines_read += other.lines_read;
        self.malformed_lines += other.malformed_lines;

        // Newest first, same as a sequential pass
        self.missing_days.sort_unstable_by(|a, b| b.cmp(a));
        self.unreadable_days.sort_unstable_by(|a, b| b.cmp(a));
    }
}

struct OpenLog {
    date: NaiveDate,
    path: PathBuf,
    lines: Split<BufReader<File>>,
    line_no: u64,
}

/// Lazily walks every log file in the window, one file open at a time, and yields the
/// records that parse. Bad lines and absent days are tallied in [`LoadStats`].
///
/// Single pass. Drain it with `by_ref()` and then call [`WindowRecords::into_stats`].
pub struct WindowRecords<'a> {
    logs_folder: &'a Path,
    naming: &'a dyn LogNaming,
    pending: std::vec::IntoIter<NaiveDate>,
    current: Option<OpenLog>,
    stats: LoadStats,
}

impl<'a> WindowRecords<'a> {
    pub fn new(logs_folder: &'a Path, naming: &'a dyn LogNaming, days: Vec<NaiveDate>) -> Self {
        let stats = LoadStats {
            days_in_window: days.len(),
            ..LoadStats::default()
        };

        Self {
            logs_folder,
            naming,
            pending: days.into_iter(),
            current: None,
            stats,
        }
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn into_stats(self) -> LoadStats {
        self.stats
    }

    fn open_day(&mut self, date: NaiveDate) -> Option<OpenLog> {
        let path = self.logs_folder.join(self.naming.file_name(date));

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(date = %date, path = %path.display(), "log file not found, skipping day");
                self.stats.missing_days.push(date);
                return None;
            }
            Err(e) => {
                warn!(date = %date, path = %path.display(), error = %e, "log file unreadable, skipping day");
                self.stats.unreadable_days.push(date);
                return None;
            }
        };

        debug!(date = %date, path = %path.display(), "reading log file");
        self.stats.files_read += 1;

        Some(OpenLog {
            date,
            path,
            lines: BufReader::new(file).split(b'\n'),
            line_no: 0,
        })
    }
}

impl Iterator for WindowRecords<'_> {
    type Item = MatchRecord;

    fn next(&mut self) -> Option<MatchRecord> {
        loop {
            if let Some(log) = self.current.as_mut() {
                match log.lines.next() {
                    Some(Ok(mut bytes)) => {
                        log.line_no += 1;
                        if bytes.last() == Some(&b'\r') {
                            bytes.pop();
                        }
                        if bytes.iter().all(u8::is_ascii_whitespace) {
                            continue;
                        }

                        self.stats.lines_read += 1;
                        match parse_bytes(&bytes, log.date) {
                            Ok(record) => return Some(record),
                            Err(e) => {
                                self.stats.malformed_lines += 1;
                                warn!(path = %log.path.display(), line = log.line_no, error = %e, "skipping malformed log line");
                            }
                        }
                    }
                    Some(Err(e)) => {
                        warn!(path = %log.path.display(), error = %e, "read failed, skipping rest of file");
                        self.stats.unreadable_days.push(log.date);
                        self.current = None;
                    }
                    None => self.current = None,
                }
                continue;
            }

            let date = self.pending.next()?;
            self.current = self.open_day(date);
        }
    }
}
