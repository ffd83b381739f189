//! Diagnostic log: `~/.local/state/imgsift/imgsift.log`, or stderr when that fails.
//!
//! Per-attempt progress for humans is printed by the CLI, not logged here.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,imgsift_core=debug,imgsift=debug";
const LOG_FILE: &str = "imgsift.log";

/// `RUST_LOG` if set, else info everywhere and debug for our crates.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Where the log file lives; the state directory is created if missing.
pub fn log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgsift")?;
    xdg_dirs
        .place_state_file(LOG_FILE)
        .context("create log directory")
}

/// Install the global subscriber writing to the log file (appending).
/// Returns the file's path. On error nothing is installed, so the caller
/// can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<PathBuf> {
    let path = log_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("install log subscriber: {}", e))?;

    tracing::info!(path = %path.display(), "imgsift logging initialized");
    Ok(path)
}

/// Log to stderr only. A subscriber that is already installed is left alone.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
