//! Tracing subscriber setup.
//!
//! Logs go to stderr by default, or to a file when `log.file` is set.
//! `FORKLINE_LOG` overrides the configured filter directive.

use std::path::Path;
use std::{env, fs, io};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Environment variable that overrides `log.filter`.
pub const LOG_ENV: &str = "FORKLINE_LOG";

/// Keeps the non-blocking file writer alive. Hold it until exit so buffered
/// lines are flushed.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Picks the filter directive: the env override when set and non-blank,
/// otherwise the configured one.
pub fn filter_directive(config: &LogConfig, env_override: Option<&str>) -> String {
    env_override
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(config.filter.as_str())
        .to_string()
}

fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber.
///
/// # Errors
/// Fails if the log directory cannot be created or a global subscriber is
/// already installed.
pub fn init(config: &LogConfig, home: &Path) -> Result<LogGuard> {
    let env_override = env::var(LOG_ENV).ok();
    let filter = build_filter(&filter_directive(config, env_override.as_deref()));

    let Some(file) = config.resolved_file(home) else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;
        return Ok(LogGuard { _worker: None });
    };

    let dir = file.parent().unwrap_or(home);
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let file_name = file
        .file_name()
        .with_context(|| format!("Invalid log file path {}", file.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, worker) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(LogGuard {
        _worker: Some(worker),
    })
}
