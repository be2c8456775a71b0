//! Configuration management for Memoir
//!
//! Handles loading and validation of TOML configuration files.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure for Memoir
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Storage-related settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// AI provider settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Journal display settings
    #[serde(default)]
    pub journal: JournalConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Base data directory (default: ~/.memoir/)
    #[serde(
        default = "default_data_dir",
        deserialize_with = "deserialize_data_dir"
    )]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// AI provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AiConfig {
    /// Default AI provider: "claude" or "gemini"
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model name to use
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            model: default_model(),
        }
    }
}

/// Journal display configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JournalConfig {
    /// How many entries `memoir journal` lists by default
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memoir")
}

fn default_provider() -> String {
    "claude".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_recent_limit() -> usize {
    20
}

/// Expands tilde (~) in a path to the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    if path_str.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(path_str.strip_prefix("~/").unwrap());
        }
    } else if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    path.to_path_buf()
}

/// Custom deserializer for data_dir that expands tilde
fn deserialize_data_dir<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let path_str = String::deserialize(deserializer)?;
    let path = PathBuf::from(path_str);
    Ok(expand_tilde(&path))
}

impl Config {
    /// Validates the configuration values
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if:
    /// - `ai.default_provider` is not "claude" or "gemini"
    /// - `journal.recent_limit` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !["claude", "gemini"].contains(&self.ai.default_provider.as_str()) {
            return Err(ConfigError::InvalidValue(
                "default_provider must be 'claude' or 'gemini'".to_string(),
            ));
        }

        if self.journal.recent_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "recent_limit must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Returns the default configuration file path (`~/.memoir/config.toml`)
pub fn get_default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memoir")
        .join("config.toml")
}

/// Loads configuration from the specified path
///
/// If the file doesn't exist, creates a default configuration file.
/// If the file is invalid or contains invalid values, returns default
/// configuration with a warning.
pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let default_config = Config::default();
        let toml_str = toml::to_string_pretty(&default_config)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, &toml_str)?;

        tracing::info!("Created default configuration file at {:?}", path);
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)?;

    let config: Config = match toml::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(
                "Failed to parse configuration file {:?}: {}. Using default configuration.",
                path,
                e
            );
            return Ok(Config::default());
        }
    };

    if let Err(e) = config.validate() {
        tracing::warn!(
            "Invalid configuration in {:?}: {}. Using default configuration.",
            path,
            e
        );
        return Ok(Config::default());
    }

    Ok(config)
}

/// Loads configuration from the default path (`~/.memoir/config.toml`)
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_path(&get_default_config_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ai.default_provider, "claude");
        assert_eq!(config.journal.recent_limit, 20);
        assert!(config.storage.data_dir.ends_with(".memoir"));
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        assert!(toml_str.contains("default_provider"));
        assert!(toml_str.contains("recent_limit"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
[storage]
data_dir = "/var/lib/memoir"

[ai]
default_provider = "gemini"
model = "gemini-2.0-flash"

[journal]
recent_limit = 5
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to parse");
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/memoir"));
        assert_eq!(config.ai.default_provider, "gemini");
        assert_eq!(config.journal.recent_limit, 5);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml_str = r#"
[ai]
default_provider = "gemini"
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to parse");
        assert_eq!(config.ai.default_provider, "gemini");
        assert_eq!(config.ai.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.journal.recent_limit, 20);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_provider_fails() {
        let mut config = Config::default();
        config.ai.default_provider = "invalid_provider".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("default_provider"));
    }

    #[test]
    fn test_validate_zero_recent_limit_fails() {
        let mut config = Config::default();
        config.journal.recent_limit = 0;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("recent_limit"));
    }

    #[test]
    fn test_load_config_creates_default_when_missing() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        assert!(!config_path.exists());

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.ai.default_provider, "claude");
        assert!(config_path.exists());

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[ai]"));
    }

    #[test]
    fn test_load_config_reads_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[ai]
default_provider = "gemini"
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.ai.default_provider, "gemini");
        assert_eq!(config.journal.recent_limit, 20);
    }

    #[test]
    fn test_load_config_invalid_toml_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "this is not valid toml {{{").unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.ai.default_provider, "claude");
    }

    #[test]
    fn test_load_config_invalid_values_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(
            &config_path,
            r#"
[ai]
default_provider = "invalid"
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.ai.default_provider, "claude");
    }

    #[test]
    fn test_tilde_expansion_in_data_dir() {
        let toml_str = r#"
[storage]
data_dir = "~/my_custom/memoir_data"
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to parse");

        let home = dirs::home_dir().expect("Failed to get home directory");
        assert_eq!(config.storage.data_dir, home.join("my_custom/memoir_data"));
        assert!(config.storage.data_dir.is_absolute());
    }

    #[test]
    fn test_absolute_path_unchanged() {
        let toml_str = r#"
[storage]
data_dir = "/absolute/path/to/memoir"
"#;
        let config: Config = toml::from_str(toml_str).expect("Failed to parse");
        assert_eq!(
            config.storage.data_dir,
            PathBuf::from("/absolute/path/to/memoir")
        );
    }
}
