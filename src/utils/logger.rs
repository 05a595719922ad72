//! Logging utilities

use crate::{ArbitrageError, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Registry,
};

/// Console output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Initialize logging with human-readable console output
pub fn init<P: AsRef<Path>>(log_level: &str, log_file: P) -> Result<()> {
    init_with_format(log_level, log_file, LogFormat::Pretty)
}

/// Initialize logging system.
///
/// `RUST_LOG` takes precedence over `log_level`. The file layer rotates daily,
/// so the files on disk carry a date suffix after the configured name.
pub fn init_with_format<P: AsRef<Path>>(log_level: &str, log_file: P, format: LogFormat) -> Result<()> {
    let log_file = log_file.as_ref();
    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(directory)?;

    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        directory,
        log_file.file_name().unwrap_or(std::ffi::OsStr::new("arbitrage.log")),
    );

    let pretty_layer = (format == LogFormat::Pretty).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let json_layer = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false)
    });

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    Registry::default()
        .with(env_filter)
        .with(pretty_layer)
        .with(json_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ArbitrageError::Config(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// Log a detected opportunity with structured fields
#[macro_export]
macro_rules! log_opportunity {
    ($level:ident, $event_id:expr, $matchup:expr, $roi_percent:expr, $margin:expr, $($field:tt)*) => {
        tracing::$level!(
            event_id = %$event_id,
            matchup = %$matchup,
            roi_percent = %$roi_percent,
            implied_margin = %$margin,
            $($field)*
        );
    };
}

/// Log a single quote with structured fields
#[macro_export]
macro_rules! log_quote {
    ($level:ident, $outcome:expr, $bookmaker:expr, $price:expr, $($field:tt)*) => {
        tracing::$level!(
            outcome = %$outcome,
            bookmaker = %$bookmaker,
            price = %$price,
            $($field)*
        );
    };
}
