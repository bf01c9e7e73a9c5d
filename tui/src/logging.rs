use std::fs;
use std::path::PathBuf;

use color_eyre::eyre::Result;
use color_eyre::eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// The TUI owns stdout, so diagnostics go to a log file instead. Returns the
/// guard that flushes the writer; keep it alive for the whole session.
pub fn init() -> Result<WorkerGuard> {
    let log_dir = log_dir();
    fs::create_dir_all(&log_dir)
        .wrap_err_with(|| format!("create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::never(log_dir, "tagscope.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

fn log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("tagscope")
}
