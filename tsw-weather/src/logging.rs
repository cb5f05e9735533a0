//! Logging infrastructure.
//!
//! Structured logging to a file and to stdout:
//! - Writes to `<log_dir>/tsw-weather.log` (cleared on session start)
//! - Also prints to stdout
//! - `RUST_LOG` overrides the configured level

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Initialize logging.
///
/// Creates `log_dir` if needed, clears any previous log file, and installs a
/// global subscriber writing to both the file and stdout.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be prepared, or if a
/// global subscriber is already installed.
pub fn init_logging(
    log_dir: &Path,
    log_file: &str,
    level: &str,
) -> Result<LoggingGuard, io::Error> {
    let log_path = prepare_log_file(log_dir, log_file)?;

    let file_appender = tracing_appender::rolling::never(log_dir, log_file);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(false);

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(true)
        .with_target(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .try_init()
        .map_err(io::Error::other)?;

    tracing::debug!(path = %log_path.display(), "Logging initialized");

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Map a configured level name to a filter directive.
///
/// Accepts `debug`, `info`/`information`, `warn`/`warning` and `error` in any
/// case. Anything else falls back to `info`.
pub fn level_directive(level: &str) -> &'static str {
    match level.trim().to_lowercase().as_str() {
        "debug" => "debug",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Get default log directory path.
pub fn default_log_dir() -> PathBuf {
    crate::config::config_directory().join("logs")
}

/// Get default log file name.
pub fn default_log_file() -> &'static str {
    "tsw-weather.log"
}

/// Create the log directory and truncate the log file.
fn prepare_log_file(log_dir: &Path, log_file: &str) -> Result<PathBuf, io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(log_file);
    fs::write(&log_path, "")?;
    Ok(log_path)
}
