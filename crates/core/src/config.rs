//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the services.
//! Nothing in the core crate reads environment variables or the wall clock during an
//! operation; "today" and the logging switches all come from here.

use crate::error::{HospitalError, HospitalResult};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    today: NaiveDate,
    verbose: bool,
    log_file: Option<PathBuf>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `log_file` is `Some` only when flat-file logging has been requested.
    pub fn new(today: NaiveDate, verbose: bool, log_file: Option<PathBuf>) -> HospitalResult<Self> {
        if let Some(path) = &log_file {
            if path.as_os_str().is_empty() {
                return Err(HospitalError::InvalidInput(
                    "log file path cannot be empty".into(),
                ));
            }
        }

        Ok(Self {
            today,
            verbose,
            log_file,
        })
    }

    /// The date treated as "today" for booking and overdue checks.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

/// Parse the "today" override from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the local wall-clock date.
pub fn today_from_env_value(value: Option<String>) -> HospitalResult<NaiveDate> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|e| {
            HospitalError::InvalidInput(format!("invalid date override '{v}': {e}"))
        }),
        None => Ok(Local::now().date_naive()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn today_override_is_parsed() {
        let today = today_from_env_value(Some(" 2024-03-01 ".into())).expect("should parse");
        assert_eq!(today, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn blank_override_falls_back_to_clock() {
        let before = Local::now().date_naive();
        let today = today_from_env_value(Some("   ".into())).expect("should fall back");
        let after = Local::now().date_naive();
        assert!(today == before || today == after);
    }

    #[test]
    fn malformed_override_is_rejected() {
        let err = today_from_env_value(Some("01/03/2024".into())).expect_err("should fail");
        assert!(matches!(err, HospitalError::InvalidInput(_)));
    }

    #[test]
    fn empty_log_path_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(CoreConfig::new(today, false, Some(PathBuf::new())).is_err());

        let cfg = CoreConfig::new(today, true, Some("log.txt".into())).unwrap();
        assert!(cfg.verbose());
        assert_eq!(cfg.log_file(), Some(Path::new("log.txt")));
    }
}
