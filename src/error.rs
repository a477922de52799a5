use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),

    #[error("config value {field} must be at least 1")]
    Invalid { field: &'static str },
}

// Per-line failures. These never abort a run, the loader counts them and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("{0} is empty")]
    EmptyField(&'static str),

    #[error("kill count '{0}' is not a number")]
    NotNumeric(String),

    #[error("kill count {0} is negative")]
    NegativeKillCount(i64),

    #[error("line is not valid UTF-8")]
    Encoding,

    #[error("unreadable record: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to create report folder {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write report {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render report")]
    Render(#[from] csv::Error),
}
