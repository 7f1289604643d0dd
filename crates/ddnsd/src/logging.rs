//! Tracing setup: console output plus a daily rolling log file

use std::path::Path;

use anyhow::{Context, Result};
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Parse a `DDNS_LOG_LEVEL` value
pub fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Split a log path into the directory and the file name prefix
///
/// `logs/ddns.log` rolls into `logs/ddns.log.YYYY-MM-DD`.
pub fn split_log_path(path: &Path) -> Result<(&Path, &str)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("LOG path has no file name: {}", path.display()))?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    Ok((directory, file_name))
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// until the process exits.
pub fn init(level: Level, log_path: &Path) -> Result<WorkerGuard> {
    let (directory, prefix) = split_log_path(log_path)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .build(directory)
        .with_context(|| format!("Failed to open log file in {}", directory.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(guard)
}
