//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from the `VERSION_WATCHER_LOG` environment variable when
//! set, otherwise from `logging.level` in the config file.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LOG_ENV_VAR, LogFormat, LoggingConfig};

/// Installs the global subscriber.
///
/// When logging to a file the returned guard must be held until shutdown,
/// otherwise buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(std::env::var(LOG_ENV_VAR).ok(), &config.level)?;

    let (writer, guard) = match &config.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (writer, Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(config.file.is_none())
        .with_target(true);

    let installed = match config.format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}

fn env_filter(env_value: Option<String>, default_level: &str) -> Result<EnvFilter> {
    let directives = env_value.unwrap_or_else(|| default_level.to_string());
    EnvFilter::try_new(&directives).with_context(|| format!("Invalid log filter {:?}", directives))
}

fn file_writer(path: &Path) -> Result<(BoxMakeWriter, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("Log file path has no file name: {:?}", path))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    Ok((BoxMakeWriter::new(non_blocking), guard))
}
