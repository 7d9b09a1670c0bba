//! # Logging Utilities
//!
//! Logging infrastructure for hprofconv using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Multiple output formats (JSON for production, pretty for development)
//! - Environment variable configuration
//! - Log level filtering
//! - Optional file output next to the console output
//!
//! Console logs are written to **stderr**. Standard output is reserved for
//! the converter's own side output (resolved strings, char array dumps), so
//! the two can be redirected independently.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hprofconv_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Converter started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=hprofconv_core=trace`)
//! - `HPROFCONV_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `HPROFCONV_LOG_FILE`: Optional path to log file (if not set, logs only to stderr)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "HPROFCONV_LOG_FORMAT";

/// Environment variable naming an additional log file.
pub const LOG_FILE_ENV: &str = "HPROFCONV_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON format, one event per line
    Json,
}

impl LogFormat
{
    /// Read the format from `HPROFCONV_LOG_FORMAT`, if set and valid.
    #[must_use]
    pub fn from_env() -> Option<Self>
    {
        env::var(LOG_FORMAT_ENV).ok().and_then(|s| Self::from_str(&s).ok())
    }
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (every decoded sub-record)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `hprofconv_core=trace`)
/// - `HPROFCONV_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `HPROFCONV_LOG_FILE`: Optional path to log file
///
/// ## Errors
///
/// Returns an error if a global subscriber is already installed or the log
/// file directory cannot be created.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = LogFormat::from_env().unwrap_or(LogFormat::Pretty);

    // RUST_LOG may hold a full filter expression; only a bare level is used as the default here
    let default_level = env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LogLevel>()
        .map(Into::into)
        .unwrap_or(Level::INFO);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
    init_logging_internal(format, env_filter)
}

/// Initialize logging with explicit level and format
///
/// The explicit level wins over `RUST_LOG`. This is what the `-v` / `-q`
/// command-line flags use.
///
/// ## Example
///
/// ```rust,no_run
/// use hprofconv_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    let level: Level = level.into();
    init_logging_internal(format, EnvFilter::new(level.to_string()))
}

fn file_appender_for(path: &Path) -> Result<tracing_appender::non_blocking::NonBlocking, LoggingError>
{
    let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    std::fs::create_dir_all(directory)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidFile(path.display().to_string()))?;

    // The file name is used as given; the converter runs are short-lived
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    // Keep the worker alive for the rest of the process
    std::mem::forget(guard);
    Ok(non_blocking)
}

fn init_logging_internal(format: LogFormat, env_filter: EnvFilter) -> Result<(), LoggingError>
{
    let log_file = env::var(LOG_FILE_ENV).ok().map(PathBuf::from);

    match format {
        LogFormat::Pretty => {
            let console_layer = fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(env_filter.clone());

            if let Some(file_path) = log_file {
                let file_layer = fmt::layer()
                    .with_writer(file_appender_for(&file_path)?)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false) // No ANSI in files
                    .with_filter(env_filter);

                Registry::default()
                    .with(console_layer)
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;
            } else {
                Registry::default()
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;
            }
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(io::stderr)
                .with_filter(env_filter.clone());

            if let Some(file_path) = log_file {
                let file_layer = fmt::layer()
                    .json()
                    .with_writer(file_appender_for(&file_path)?)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(env_filter);

                Registry::default()
                    .with(console_layer)
                    .with(file_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;
            } else {
                Registry::default()
                    .with(console_layer)
                    .try_init()
                    .map_err(|e| LoggingError::InitializationFailed(e.to_string()))?;
            }
        }
    }

    Ok(())
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// The configured log file path has no file name
    #[error("Invalid log file path: {0}")]
    InvalidFile(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}
