//! AI provider port definition

use async_trait::async_trait;
use thiserror::Error;

/// A photo attached to a diary draft request
#[derive(Debug, Clone)]
pub struct PhotoData {
    /// Base64 encoded image data
    pub base64: String,
    /// MIME type (e.g., "image/jpeg")
    pub media_type: String,
}

/// Multimodal prompt sent to an AI provider to draft a diary entry
#[derive(Debug, Clone)]
pub struct DiaryPrompt {
    /// System message establishing the diarist persona
    pub system_message: String,
    /// User text: the day's context, mood, and any notes
    pub user_text: String,
    /// Photos the entry should be written about
    pub photos: Vec<PhotoData>,
}

/// A drafted diary entry returned by an AI provider
#[derive(Debug, Clone)]
pub struct DiaryDraft {
    /// Generated entry text
    pub text: String,
}

/// Errors that can occur during AI operations
#[derive(Debug, Error)]
pub enum AIError {
    /// API key is missing or invalid
    #[error("Unauthorized: API key is missing or invalid. Please set the appropriate environment variable (ANTHROPIC_API_KEY or GOOGLE_AI_API_KEY)")]
    Unauthorized,

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimitExceeded,

    /// Invalid request (e.g., no photos, empty context)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider-specific error
    #[error("Provider '{0}' error: {1}")]
    ProviderError(String, String),

    /// Request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Too many photos attached
    #[error("Photo limit exceeded: maximum {0} photos allowed")]
    PhotoLimitExceeded(usize),
}

/// Port for AI provider operations
///
/// Memoir's core only decides whether a draft call is permitted; the provider
/// behind this port is an opaque collaborator that turns photos into text.
#[async_trait]
pub trait AIProviderPort: Send + Sync {
    /// Draft a diary entry from the given prompt
    async fn draft_entry(&self, prompt: DiaryPrompt) -> Result<DiaryDraft, AIError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_data() {
        let photo = PhotoData {
            base64: "aGVsbG8=".to_string(),
            media_type: "image/jpeg".to_string(),
        };
        assert_eq!(photo.media_type, "image/jpeg");
    }

    #[test]
    fn test_diary_prompt() {
        let prompt = DiaryPrompt {
            system_message: "You are a thoughtful diarist.".to_string(),
            user_text: "A quiet Sunday at the lake.".to_string(),
            photos: vec![],
        };
        assert!(!prompt.system_message.is_empty());
        assert!(!prompt.user_text.is_empty());
    }

    #[test]
    fn test_ai_error_messages() {
        let err = AIError::Unauthorized;
        assert!(err.to_string().contains("API key"));

        let err = AIError::RateLimitExceeded;
        assert!(err.to_string().contains("Rate limit"));

        let err = AIError::PhotoLimitExceeded(10);
        assert!(err.to_string().contains("10"));

        let err = AIError::ProviderError("claude".to_string(), "Server error".to_string());
        assert!(err.to_string().contains("claude"));
    }
}
