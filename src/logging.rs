use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::app_dirs::AppDirs;

pub const LOG_FILE: &str = "wordsprint.log";

/// Route `tracing` output to a file, since the TUI owns stdout.
///
/// Filtering follows `RUST_LOG`, defaulting to `warn`. The returned guard must
/// be held until exit or buffered lines are lost. Returns `None` when no log
/// directory is usable or a subscriber is already installed.
pub fn init() -> Option<WorkerGuard> {
    let dir = AppDirs::log_dir()?;
    init_in(&dir)
}

pub fn init_in(dir: &Path) -> Option<WorkerGuard> {
    fs::create_dir_all(dir).ok()?;

    let file_appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
