//! File logging for the headless runner
//!
//! Stdout carries the NDJSON event stream, so every diagnostic goes to a
//! daily-rolling file instead.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "TABSHELL_LOG";

/// Environment variable overriding the log directory
pub const LOG_DIR_ENV_VAR: &str = "TABSHELL_LOG_DIR";

const LOG_FILE_PREFIX: &str = "tabshell.log";

const DEFAULT_FILTER: &str = "tabshell=info,tabshell_app=info,warn";

/// Install the file subscriber and return the path of today's log file.
///
/// Logs land in `$TABSHELL_LOG_DIR` when set, otherwise in
/// `~/.local/share/tabshell/logs/`.
///
/// ```bash
/// TABSHELL_LOG=debug tabshell --item "./reports/q1=Q1"
/// TABSHELL_LOG_DIR=/tmp/tabshell TABSHELL_LOG=tabshell_app=trace tabshell
/// ```
pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory(std::env::var_os(LOG_DIR_ENV_VAR));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    let log_file = log_file_for(&log_dir, Utc::now().date_naive());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        file = %log_file.display(),
        "tabshell starting"
    );

    Ok(log_file)
}

fn log_directory(override_dir: Option<OsString>) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabshell")
            .join("logs"),
    }
}

/// Daily rotation suffixes the prefix with the UTC date
fn log_file_for(dir: &Path, day: NaiveDate) -> PathBuf {
    dir.join(format!("{}.{}", LOG_FILE_PREFIX, day.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directory_is_under_tabshell() {
        assert!(log_directory(None).ends_with("tabshell/logs"));
        assert!(log_directory(Some(OsString::new())).ends_with("tabshell/logs"));
    }

    #[test]
    fn test_directory_override() {
        let dir = log_directory(Some(OsString::from("/tmp/tabshell-logs")));
        assert_eq!(dir, PathBuf::from("/tmp/tabshell-logs"));
    }

    #[test]
    fn test_log_file_carries_rotation_date() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let file = log_file_for(Path::new("/var/log/tabshell"), day);
        assert_eq!(file, PathBuf::from("/var/log/tabshell/tabshell.log.2024-03-09"));
    }
}
