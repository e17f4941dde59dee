//! Tracing setup. The terminal belongs to the UI, so log output goes to a daily
//! file under the data directory instead of stdout.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_PREFIX: &str = "biteread.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn log_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("biteread")
        .join("logs")
}

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
/// Subsequent calls are no-ops.
pub fn init(default_level: &str) -> Result<PathBuf> {
    let dir = log_dir();
    if LOG_GUARD.get().is_some() {
        return Ok(dir);
    }
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer),
        )
        .try_init()
        .context("failed to install tracing subscriber")?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Logging initialized; log directory {}", dir.display());
    Ok(dir)
}
