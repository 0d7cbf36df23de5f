//! Global tracing subscriber setup.

use crate::event_layer::{ProgressEvent, ProgressEventLayer};
use slidewright_core::config::LoggingConfig;
use slidewright_core::{Result, SlideError};
use std::path::Path;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Prefix of the daily-rolling log files.
pub const LOG_FILE_PREFIX: &str = "slidewright.log";

/// Keeps the background log writer alive; drop it last to flush.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Filter from `RUST_LOG`, falling back to the configured level.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// Console output goes to stderr (JSON when `config.json`). When
/// `config.file` is set and `logs_dir` is given, a plain daily-rolling file
/// is written there too. `progress` receives every event that passes the
/// filter.
pub fn init_tracing(
    config: &LoggingConfig,
    logs_dir: Option<&Path>,
    progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
) -> Result<LoggingGuard> {
    let console = if config.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file, guard) = match logs_dir {
        Some(dir) if config.file => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(console)
        .with(file)
        .with(progress.map(ProgressEventLayer::new))
        .try_init()
        .map_err(|e| SlideError::config(format!("Failed to install tracing subscriber: {e}")))?;

    Ok(LoggingGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_configured_level() {
        let config = LoggingConfig {
            level: "slidewright_application=debug,warn".to_string(),
            ..LoggingConfig::default()
        };
        // RUST_LOG takes precedence when set, so only check the fallback path.
        if std::env::var("RUST_LOG").is_err() {
            let rendered = build_filter(&config).to_string().to_lowercase();
            assert!(rendered.contains("slidewright_application=debug"));
        }
    }
}
