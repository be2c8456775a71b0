//! Directory management for Memoir
//!
//! Handles initialization of the Memoir data directory structure.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::error::ConfigError;

/// Required subdirectories within the Memoir data directory
const SUBDIRECTORIES: &[&str] = &["logs"];

/// Directory permission mode (owner read/write/execute only)
#[cfg(unix)]
const DIR_PERMISSION_MODE: u32 = 0o700;

/// Manages the Memoir data directory structure
#[derive(Debug, Clone)]
pub struct DirectoryManager {
    /// Base data directory (e.g., ~/.memoir/)
    data_dir: PathBuf,
}

impl DirectoryManager {
    /// Creates a new DirectoryManager with the specified data directory
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Creates a DirectoryManager with the default data directory (~/.memoir/)
    pub fn with_default_dir() -> Self {
        let data_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".memoir");
        Self::new(data_dir)
    }

    /// Returns the base data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the logs directory path
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Returns the database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("memoir.db")
    }

    /// Returns the config file path
    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    /// Initializes the directory structure
    ///
    /// Creates the base data directory and all required subdirectories with
    /// owner-only permissions on Unix.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if directory creation fails
    pub fn initialize(&self) -> Result<(), ConfigError> {
        self.create_directory_with_permissions(&self.data_dir)?;

        for subdir in SUBDIRECTORIES {
            let path = self.data_dir.join(subdir);
            self.create_directory_with_permissions(&path)?;
        }

        tracing::info!("Initialized Memoir data directory at {:?}", self.data_dir);
        Ok(())
    }

    fn create_directory_with_permissions(&self, path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            #[cfg(unix)]
            self.set_unix_permissions(path)?;
            return Ok(());
        }

        fs::create_dir_all(path)?;

        #[cfg(unix)]
        self.set_unix_permissions(path)?;

        Ok(())
    }

    #[cfg(unix)]
    fn set_unix_permissions(&self, path: &Path) -> Result<(), ConfigError> {
        let permissions = fs::Permissions::from_mode(DIR_PERMISSION_MODE);
        fs::set_permissions(path, permissions)?;
        Ok(())
    }
}
