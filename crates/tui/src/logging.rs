use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

pub const LOG_FILE_NAME: &str = "todos.log";

/// Route tracing output to `todos.log` in the configured log directory. The
/// terminal belongs to the UI, so nothing is written to stdout. Keep the
/// returned guard alive until exit so buffered lines get flushed.
pub fn init_logging(config: &AppConfig, filter: Option<&str>) -> Result<WorkerGuard> {
    let directive: Directive = filter
        .unwrap_or("info")
        .parse()
        .with_context(|| format!("invalid log directive '{}'", filter.unwrap_or_default()))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let log_dir = config.log_dir();
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init();
    Ok(guard)
}
