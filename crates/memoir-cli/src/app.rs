//! Application initialization and lifecycle management
//!
//! Provides the centralized initialization sequence and fatal error handling
//! for the Memoir CLI application.

use anyhow::{Context, Result};
use memoir_core::{
    init_logger, load_config, Config, DirectoryManager, LogLevel, LoggerConfig, LoggerGuard,
};
use std::panic;
use std::sync::Arc;
use tracing::error;

/// Application context holding initialized components
pub struct AppContext {
    /// Application configuration
    pub config: Arc<Config>,
    /// Logger guard (keeps logger alive)
    #[allow(dead_code)]
    logger_guard: Option<LoggerGuard>,
}

impl AppContext {
    /// Returns reference to the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Application initialization options
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Whether to initialize the file logger
    pub init_logger: bool,
    /// Whether to create the data directory structure
    pub create_directories: bool,
    /// Log level override
    pub log_level: Option<LogLevel>,
}

impl InitOptions {
    /// Creates options for CLI command mode
    pub fn command() -> Self {
        Self {
            init_logger: false,
            create_directories: true,
            log_level: None,
        }
    }

    /// Creates options with file logging enabled
    pub fn with_logging(level: LogLevel) -> Self {
        Self {
            init_logger: true,
            create_directories: true,
            log_level: Some(level),
        }
    }
}

/// Initializes the Memoir application
///
/// Initialization sequence:
/// 1. Load configuration from `~/.memoir/config.toml`
/// 2. Create the directory structure (`~/.memoir/`, `~/.memoir/logs/`)
/// 3. Initialize logging (if requested)
/// 4. Install a panic hook for fatal error handling
pub fn initialize(options: InitOptions) -> Result<AppContext> {
    let config = load_config().context("Failed to load configuration")?;
    let config = Arc::new(config);

    if options.create_directories {
        let dir_manager = DirectoryManager::new(config.storage.data_dir.clone());
        dir_manager
            .initialize()
            .context("Failed to create directory structure")?;
    }

    let logger_guard = if options.init_logger {
        let log_level = options.log_level.unwrap_or(LogLevel::Info);
        let logger_config =
            LoggerConfig::new(config.storage.data_dir.join("logs")).with_level(log_level);

        Some(init_logger(logger_config).context("Failed to initialize logger")?)
    } else {
        None
    };

    setup_panic_hook(Arc::clone(&config));

    Ok(AppContext {
        config,
        logger_guard,
    })
}

/// Installs a panic hook that logs the panic and points at the log file
fn setup_panic_hook(config: Arc<Config>) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic payload".to_string()
        };

        error!("FATAL ERROR at {}: {}", location, message);

        eprintln!();
        eprintln!("Memoir encountered a fatal error and must exit.");
        eprintln!("Location: {}", location);
        eprintln!("Error: {}", message);
        eprintln!();
        eprintln!(
            "Please check the log file at: {}/logs/memoir.log",
            config.storage.data_dir.display()
        );
        eprintln!();

        default_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_options_command() {
        let options = InitOptions::command();
        assert!(!options.init_logger);
        assert!(options.create_directories);
        assert!(options.log_level.is_none());
    }

    #[test]
    fn test_init_options_with_logging() {
        let options = InitOptions::with_logging(LogLevel::Debug);
        assert!(options.init_logger);
        assert_eq!(options.log_level, Some(LogLevel::Debug));
    }
}
