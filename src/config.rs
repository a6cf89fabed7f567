// Runtime settings, read from the environment with file-friendly defaults.
use crate::error::{Error, Result};
use crate::types::DateRange;
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

pub const SUBMISSIONS_PATH_VAR: &str = "TITHE_SUBMISSIONS_PATH";
pub const MEMBERS_PATH_VAR: &str = "TITHE_MEMBERS_PATH";
pub const OUTPUT_DIR_VAR: &str = "TITHE_OUTPUT_DIR";
pub const PREVIEW_ROWS_VAR: &str = "TITHE_PREVIEW_ROWS";
pub const REPORT_START_VAR: &str = "TITHE_REPORT_START";
pub const REPORT_END_VAR: &str = "TITHE_REPORT_END";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub submissions_path: PathBuf,
    pub members_path: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    /// Restricts the enhanced report when set.
    pub report_range: Option<DateRange>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            submissions_path: PathBuf::from("data/submissions.json"),
            members_path: PathBuf::from("data/members.json"),
            output_dir: PathBuf::from("."),
            preview_rows: 5,
            report_range: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        if let Some(path) = get(SUBMISSIONS_PATH_VAR) {
            config.submissions_path = PathBuf::from(path);
        }
        if let Some(path) = get(MEMBERS_PATH_VAR) {
            config.members_path = PathBuf::from(path);
        }
        if let Some(dir) = get(OUTPUT_DIR_VAR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(rows) = get(PREVIEW_ROWS_VAR) {
            config.preview_rows = rows.parse().map_err(|_| Error::Config {
                key: PREVIEW_ROWS_VAR,
                value: rows.clone(),
            })?;
        }

        let start = get(REPORT_START_VAR);
        let end = get(REPORT_END_VAR);
        if start.is_some() || end.is_some() {
            let start = iso_date(REPORT_START_VAR, start)?;
            let end = iso_date(REPORT_END_VAR, end)?;
            config.report_range = Some(DateRange::new(start, end));
        }
        Ok(config)
    }

    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }
}

fn iso_date(key: &'static str, value: Option<String>) -> Result<String> {
    let value = value.unwrap_or_default();
    match NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
        Ok(_) => Ok(value),
        Err(_) => Err(Error::Config { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.output_path("a.csv"), PathBuf::from("./a.csv"));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            (SUBMISSIONS_PATH_VAR, "snap/subs.csv"),
            (OUTPUT_DIR_VAR, "out"),
            (PREVIEW_ROWS_VAR, " 12 "),
            (REPORT_START_VAR, "2024-01-01"),
            (REPORT_END_VAR, "2024-03-31"),
        ]))
        .unwrap();
        assert_eq!(config.submissions_path, PathBuf::from("snap/subs.csv"));
        assert_eq!(config.preview_rows, 12);
        assert_eq!(
            config.report_range,
            Some(DateRange::new("2024-01-01", "2024-03-31"))
        );
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_lookup(lookup(&[(PREVIEW_ROWS_VAR, "lots")])).unwrap_err();
        assert!(matches!(err, Error::Config { key: PREVIEW_ROWS_VAR, .. }));

        let err = Config::from_lookup(lookup(&[(REPORT_START_VAR, "2024-01-01")])).unwrap_err();
        assert!(matches!(err, Error::Config { key: REPORT_END_VAR, .. }));
    }
}
