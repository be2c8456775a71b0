//! Logging infrastructure for Memoir
//!
//! Structured logging with file output, built on `tracing` and
//! `tracing-subscriber`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default log file name
pub const DEFAULT_LOG_FILE: &str = "memoir.log";

/// Errors that can occur during logger initialization
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Failed to create log directory
    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(String),

    /// Failed to initialize the logger
    #[error("Failed to initialize logger: {0}")]
    InitializationFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Configuration for the Memoir logger
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Log level filter
    pub level: LogLevel,
    /// Whether to also log to stdout
    pub log_to_stdout: bool,
}

impl LoggerConfig {
    /// Creates a new LoggerConfig with the specified log directory
    pub fn new(log_dir: PathBuf) -> Self {
        Self {
            log_dir,
            level: LogLevel::Info,
            log_to_stdout: false,
        }
    }

    /// Creates a LoggerConfig with the default log directory (~/.memoir/logs/)
    pub fn with_default_dir() -> Self {
        let log_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".memoir")
            .join("logs");
        Self::new(log_dir)
    }

    /// Sets the log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Enables logging to stdout in addition to file
    pub fn with_stdout(mut self, enabled: bool) -> Self {
        self.log_to_stdout = enabled;
        self
    }

    /// Returns the log directory path
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Returns the full path to the log file
    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(DEFAULT_LOG_FILE)
    }
}

/// Guard that keeps the logger alive
///
/// When dropped, the logger will be flushed and closed.
pub struct LoggerGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initializes the Memoir logger with the given configuration
///
/// Returns a `LoggerGuard` that must be kept alive for the duration of the
/// program; dropping it flushes buffered log lines.
///
/// # Errors
/// Returns `LoggerError` if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init_logger(config: LoggerConfig) -> Result<LoggerGuard, LoggerError> {
    use std::fs;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if !config.log_dir.exists() {
        fs::create_dir_all(&config.log_dir).map_err(|e| {
            LoggerError::DirectoryCreationFailed(format!("{}: {}", config.log_dir.display(), e))
        })?;
    }

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, DEFAULT_LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("memoir={}", config.level)));

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if config.log_to_stdout {
        let stdout_layer = fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(stdout_layer)
            .try_init()
            .map_err(|e| LoggerError::InitializationFailed(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .try_init()
            .map_err(|e| LoggerError::InitializationFailed(e.to_string()))?;
    }

    tracing::info!(
        log_dir = %config.log_dir.display(),
        level = %config.level,
        "Memoir logger initialized"
    );

    Ok(LoggerGuard { _guard: guard })
}
