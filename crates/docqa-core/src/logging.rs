//! Tracing subscriber setup.
//!
//! `DOCQA_LOG` takes an `EnvFilter` directive and wins over `log_level` from
//! config. With `log_dir` set, output goes to a daily rolling file instead of
//! stderr.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "DOCQA_LOG";

/// Keeps the non-blocking file writer alive. Drop flushes pending lines.
#[must_use]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// Calling it twice is harmless; the second subscriber is ignored.
pub fn init(config: &Config) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(dir) = config.log_dir.as_deref().filter(|d| !d.trim().is_empty()) else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
        return Ok(LogGuard { _file: None });
    };

    let dir = Path::new(dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
    let appender = tracing_appender::rolling::daily(dir, "docqa.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Ok(LogGuard { _file: Some(guard) })
}
