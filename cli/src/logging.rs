//! Log setup for the `pwmon` binary.
//!
//! Readings and JSON documents go to stdout, so log records always go to
//! stderr. `--log-file` additionally mirrors them into a daily rolling file
//! under the runtime directory.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{runtime_dir, LogLevel};

/// Overrides the configured level with `tracing` directives.
pub const LOG_ENV: &str = "PWMON_LOG";

const LOG_FILE_PREFIX: &str = "pwmon";
const KEPT_LOG_FILES: usize = 7;

/// Keeps the file writer flushing until dropped.
pub struct LogGuard {
    file: Option<WorkerGuard>,
}

impl LogGuard {
    pub fn is_file_backed(&self) -> bool {
        self.file.is_some()
    }
}

/// Installs the global subscriber. Later calls leave the first one in place.
pub fn init(level: LogLevel, to_file: bool) -> LogGuard {
    let Some(level) = level.as_tracing_level() else {
        return LogGuard { file: None };
    };

    let (file_layer, file) = match to_file.then(file_appender).flatten() {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(false)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true);

    let installed = tracing_subscriber::registry()
        .with(filter(level))
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if installed.is_err() {
        return LogGuard { file: None };
    }
    LogGuard { file }
}

fn filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy()
}

fn file_appender() -> Option<RollingFileAppender> {
    let dir = log_dir();

    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Warning: Failed to create log directory {:?}: {}", dir, e);
        return None;
    }

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEPT_LOG_FILES)
        .build(&dir)
        .ok()
}

pub fn log_dir() -> PathBuf {
    runtime_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_level_never_opens_a_file() {
        let guard = init(LogLevel::Off, true);
        assert!(!guard.is_file_backed());
    }

    #[test]
    fn test_second_init_keeps_first_subscriber() {
        let _first = init(LogLevel::Warn, false);
        let second = init(LogLevel::Trace, true);
        assert!(!second.is_file_backed());
    }
}
