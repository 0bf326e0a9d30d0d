//! Logging setup for the sqlscope binary and embedding services.
//!
//! sqlx logs every statement at INFO, which would drown catalog walks, so
//! the driver is capped at WARN unless `SQLSCOPE_LOG` says otherwise.

use tracing_subscriber::EnvFilter;

use crate::Result;
use crate::error::SqlScopeError;

/// Environment variable holding an `EnvFilter` directive that replaces the
/// verbosity flags, e.g. `SQLSCOPE_LOG=sqlscope_core::extractor=trace`.
pub const LOG_ENV: &str = "SQLSCOPE_LOG";

/// Output format of log lines on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event, for log shippers
    Json,
}

fn level_for(verbose: u8, quiet: bool) -> tracing::Level {
    match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    }
}

/// Filter directive for the given flags. Statement-level driver output only
/// appears at the highest verbosity.
fn directive_for(verbose: u8, quiet: bool) -> String {
    let level = level_for(verbose, quiet);
    let driver = if verbose >= 3 && !quiet {
        tracing::Level::TRACE
    } else {
        tracing::Level::WARN.min(level)
    };
    format!("{level},sqlx={driver}").to_lowercase()
}

/// Initializes text logging on stderr.
///
/// `verbose`: 0 = INFO, 1 = DEBUG, 2+ = TRACE (3+ also traces sqlx).
/// `quiet` wins and keeps ERROR only.
///
/// ```rust,no_run
/// use sqlscope_core::logging::init_logging;
///
/// init_logging(1, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    init_logging_with(verbose, quiet, LogFormat::Text)
}

/// Like [`init_logging`] with an explicit output format.
pub fn init_logging_with(verbose: u8, quiet: bool, format: LogFormat) -> Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.trim().is_empty() => EnvFilter::try_new(directive.trim())
            .map_err(|e| SqlScopeError::configuration(format!("Invalid {LOG_ENV}: {e}")))?,
        _ => EnvFilter::new(directive_for(verbose, quiet)),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| {
        SqlScopeError::configuration(format!("Failed to initialize logging: {}", e))
    })
}
