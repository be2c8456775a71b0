//! API key management for AI providers
//!
//! Handles loading and validation of API keys from environment variables.

use crate::ports::ai::AIError;
use std::env;
use std::fmt;

/// Environment variable name for Anthropic API key
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Environment variable name for Google AI API key
pub const GOOGLE_AI_API_KEY_ENV: &str = "GOOGLE_AI_API_KEY";

/// A wrapper for API keys that prevents accidental logging
///
/// `Debug` and `Display` mask the actual key value.
#[derive(Clone)]
pub struct SecretApiKey {
    key: String,
}

impl SecretApiKey {
    /// Wraps a non-empty key; `None` for empty or whitespace-only input
    pub fn new(key: String) -> Option<Self> {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                key: trimmed.to_string(),
            })
        }
    }

    /// Returns the actual key. Never log the returned value.
    pub fn expose(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for SecretApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretApiKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl fmt::Display for SecretApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED API KEY]")
    }
}

/// AI provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AIProvider {
    /// Anthropic Claude
    Claude,
    /// Google Gemini
    Gemini,
}

impl AIProvider {
    /// Environment variable carrying this provider's API key
    pub fn env_var_name(&self) -> &'static str {
        match self {
            AIProvider::Claude => ANTHROPIC_API_KEY_ENV,
            AIProvider::Gemini => GOOGLE_AI_API_KEY_ENV,
        }
    }

    /// Human-readable provider name
    pub fn display_name(&self) -> &'static str {
        match self {
            AIProvider::Claude => "Anthropic Claude",
            AIProvider::Gemini => "Google Gemini",
        }
    }
}

impl std::str::FromStr for AIProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(AIProvider::Claude),
            "gemini" | "google" => Ok(AIProvider::Gemini),
            _ => Err(format!("Unknown AI provider: {}", s)),
        }
    }
}

/// Manages API keys for AI providers
pub struct ApiKeyManager;

impl ApiKeyManager {
    /// Loads the key for `provider` from its environment variable
    ///
    /// # Errors
    /// `AIError::Unauthorized` if the variable is unset or empty
    pub fn load_api_key(provider: AIProvider) -> Result<SecretApiKey, AIError> {
        match env::var(provider.env_var_name()) {
            Ok(key) => SecretApiKey::new(key).ok_or(AIError::Unauthorized),
            Err(_) => Err(AIError::Unauthorized),
        }
    }

    /// Guidance shown when a key is missing
    pub fn missing_key_guidance(provider: AIProvider) -> String {
        format!(
            "To use {} for diary drafting, set the {} environment variable:\n\n  export {}=<your API key>\n\nThen run the command again.",
            provider.display_name(),
            provider.env_var_name(),
            provider.env_var_name()
        )
    }
}
