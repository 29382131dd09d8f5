//! File logging for the previewer.
//!
//! The terminal belongs to the UI, so logs never go to stdout or stderr.

use jqlive_core::{LogConfig, LogRotation};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "jqlive.log";

/// Get the jqlive data directory
///
/// Respects the following environment variables (in order of precedence):
/// 1. JQLIVE_DATA_DIR - explicit override
/// 2. XDG_DATA_HOME - standard XDG data home directory
/// 3. dirs::data_local_dir() - platform default
pub fn data_dir() -> PathBuf {
  if let Ok(dir) = std::env::var("JQLIVE_DATA_DIR") {
    return PathBuf::from(dir);
  }

  if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
    return PathBuf::from(xdg_data).join("jqlive");
  }

  dirs::data_local_dir()
    .unwrap_or_else(|| PathBuf::from("."))
    .join("jqlive")
}

/// Parse log level from config string. `None` means logging is off.
fn parse_log_level(level: &str) -> Option<tracing::Level> {
  match level.to_lowercase().as_str() {
    "off" => None,
    "error" => Some(tracing::Level::ERROR),
    "warn" => Some(tracing::Level::WARN),
    "info" => Some(tracing::Level::INFO),
    "debug" => Some(tracing::Level::DEBUG),
    "trace" => Some(tracing::Level::TRACE),
    _ => Some(tracing::Level::WARN),
  }
}

/// Initialize file logging from the `[log]` config section.
///
/// Returns the guard that must be kept alive for the duration of the program.
/// Nothing is installed when the level is `off` or the data directory
/// cannot be created.
pub fn init_logging(config: &LogConfig) -> Option<WorkerGuard> {
  let level = parse_log_level(&config.level)?;

  let log_dir = data_dir();
  if std::fs::create_dir_all(&log_dir).is_err() {
    return None;
  }

  // RUST_LOG still overrides the configured level
  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let file_appender = match config.rotation {
    LogRotation::Hourly => tracing_appender::rolling::hourly(&log_dir, LOG_FILE),
    LogRotation::Never => tracing_appender::rolling::never(&log_dir, LOG_FILE),
    LogRotation::Daily => tracing_appender::rolling::daily(&log_dir, LOG_FILE),
  };

  let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_ansi(false)
    .with_writer(file_writer)
    .init();

  Some(guard)
}
