use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// Everything a run needs. Built once at startup and handed to each stage by reference.
// Numbers may come in as strings ("7") since the config is often hand-edited.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RankingContext {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub n_days: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub top_n_operator_kills: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub top_n_players: usize,

    pub logs_folder: PathBuf,
    pub report_folder: PathBuf,

    // Fan the window out over one thread per day. Output is identical either way.
    #[serde(default)]
    pub parallel_days: bool,
}

impl RankingContext {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let ctx: Self = serde_json::from_str(contents)?;
        ctx.validate()?;
        Ok(ctx)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_days < 1 {
            return Err(ConfigError::Invalid { field: "N_DAYS" });
        }
        if self.top_n_operator_kills < 1 {
            return Err(ConfigError::Invalid { field: "TOP_N_OPERATOR_KILLS" });
        }
        if self.top_n_players < 1 {
            return Err(ConfigError::Invalid { field: "TOP_N_PLAYERS" });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "N_DAYS": 7,
        "TOP_N_OPERATOR_KILLS": 100,
        "TOP_N_PLAYERS": 10,
        "LOGS_FOLDER": "logs",
        "REPORT_FOLDER": "reports"
    }"#;

    #[test]
    fn parses_uppercase_keys() {
        let ctx = RankingContext::from_json(FULL).unwrap();

        assert_eq!(ctx.n_days, 7);
        assert_eq!(ctx.top_n_operator_kills, 100);
        assert_eq!(ctx.top_n_players, 10);
        assert_eq!(ctx.logs_folder, PathBuf::from("logs"));
        assert_eq!(ctx.report_folder, PathBuf::from("reports"));
        assert!(!ctx.parallel_days);
    }

    #[test]
    fn accepts_numbers_as_strings() {
        let json = r#"{
            "N_DAYS": "3",
            "TOP_N_OPERATOR_KILLS": "5",
            "TOP_N_PLAYERS": 2,
            "LOGS_FOLDER": "l",
            "REPORT_FOLDER": "r",
            "PARALLEL_DAYS": true
        }"#;

        let ctx = RankingContext::from_json(json).unwrap();

        assert_eq!(ctx.n_days, 3);
        assert_eq!(ctx.top_n_operator_kills, 5);
        assert!(ctx.parallel_days);
    }

    #[test]
    fn rejects_zero_window() {
        let json = FULL.replace("\"N_DAYS\": 7", "\"N_DAYS\": 0");

        let err = RankingContext::from_json(&json).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { field: "N_DAYS" }));
    }

    #[test]
    fn rejects_zero_top_n() {
        let json = FULL.replace("\"TOP_N_PLAYERS\": 10", "\"TOP_N_PLAYERS\": 0");

        let err = RankingContext::from_json(&json).unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { field: "TOP_N_PLAYERS" }));
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        let json = r#"{ "N_DAYS": 7, "TOP_N_PLAYERS": 10, "LOGS_FOLDER": "l", "REPORT_FOLDER": "r" }"#;

        let err = RankingContext::from_json(json).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn negative_window_is_a_parse_error() {
        let json = FULL.replace("\"N_DAYS\": 7", "\"N_DAYS\": -2");

        assert!(matches!(
            RankingContext::from_json(&json),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = RankingContext::from_file(&dir.path().join("nope.json")).unwrap_err();

        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
