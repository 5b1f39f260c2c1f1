//! File logging for the TUI and CLI.
//!
//! Logs go to `<SHELF_HOME>/logs/shelf.log` so the terminal UI is never
//! written over. `SHELF_LOG` takes precedence over the configured level.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, paths};

/// Env var holding a filter directive (e.g. `shelf_core=debug`).
pub const LOG_ENV: &str = "SHELF_LOG";

const LOG_FILE_NAME: &str = "shelf.log";

/// Installs the global subscriber. Keep the returned guard alive for the
/// whole run; dropping it flushes pending lines.
///
/// # Errors
/// Returns an error if the log directory cannot be created or a subscriber
/// is already installed.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(filter(config))
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::debug!(dir = %dir.display(), "logging initialized");
    Ok(guard)
}

fn filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
