//! Tracing setup for the binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Platform-specific log directory.
///
/// - macOS: `~/Library/Caches/rotation-sim/logs`
/// - Linux: `~/.cache/rotation-sim/logs` (or `$XDG_CACHE_HOME/rotation-sim/logs`)
/// - Windows: `%LOCALAPPDATA%\rotation-sim\logs`
/// - Fallback: `/tmp/rotation-sim/logs`
pub fn log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "rotation-sim")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/rotation-sim"))
        .join("logs")
}

/// Installs the stderr layer and, when `log_file` is set, a non-blocking
/// file layer. The returned guard must live until the program exits.
pub fn setup_logging(log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let env_filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let Some(name) = log_file else {
        tracing_subscriber::registry().with(stderr_layer).init();
        return Ok(None);
    };

    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(&dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
    tracing::info!("Log file: {}", dir.join(name).display());
    Ok(Some(guard))
}
