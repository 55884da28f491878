//! Diagnostic logging
//!
//! Logs go to stderr so that reports printed to stdout stay machine readable.
//! `RUST_LOG` overrides the level chosen here; otherwise this crate logs at the
//! requested level and its dependencies only at `warn`.

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::utils::error::{ReportError, Result};

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Human,
    /// One JSON object per line
    Json,
}

/// Filter directives used when `RUST_LOG` is not set
pub fn default_directives(level: Level) -> String {
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), level)
}

fn env_filter(level: Level) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directives(level))
            .map_err(|e| ReportError::config(format!("Invalid log filter: {}", e))),
    }
}

/// Install the global subscriber
pub fn init_subscriber(level: Level, format: LogFormat) -> Result<()> {
    let (human, json) = match format {
        LogFormat::Human => (
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        LogFormat::Json => (
            None,
            Some(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(env_filter(level)?)
        .with(human)
        .with(json)
        .try_init()
        .map_err(|e| ReportError::config(format!("Failed to initialize logging: {}", e)))
}

/// Human-readable logging at `info`
pub fn init_logging() -> Result<()> {
    init_subscriber(Level::INFO, LogFormat::Human)
}

/// Human-readable logging at `level`
pub fn init_logging_with_level(level: Level) -> Result<()> {
    init_subscriber(level, LogFormat::Human)
}

/// JSON logging at `level`
pub fn init_json_logging(level: Level) -> Result<()> {
    init_subscriber(level, LogFormat::Json)
}
