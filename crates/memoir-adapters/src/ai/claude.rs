//! Claude API adapter implementation
//!
//! Implements the AIProviderPort trait for Anthropic's Claude API.

use async_trait::async_trait;
use memoir_core::ports::ai::{AIError, AIProviderPort, DiaryDraft, DiaryPrompt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default Claude model
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";

/// Claude API endpoint
const CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Maximum retry attempts for rate limiting
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Claude API adapter
///
/// Communicates with Anthropic's Claude Messages API to draft diary entries
/// from photos.
pub struct ClaudeAdapter {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeAdapter {
    /// Creates a new Claude adapter
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key
    /// * `model` - Model identifier (e.g., "claude-3-5-sonnet-20241022")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Creates a new Claude adapter with the default model
    pub fn with_default_model(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_CLAUDE_MODEL)
    }

    /// Returns the model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Builds the request body for the Claude API
    fn build_request(&self, prompt: &DiaryPrompt) -> CreateMessageRequest {
        let mut content = Vec::new();

        // Photos first, so the model sees the day before the instructions
        for photo in &prompt.photos {
            content.push(ContentBlock::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: photo.media_type.clone(),
                    data: photo.base64.clone(),
                },
            });
        }

        content.push(ContentBlock::Text {
            text: prompt.user_text.clone(),
        });

        CreateMessageRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            system: Some(prompt.system_message.clone()),
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
        }
    }

    /// Sends a request to the Claude API with retry logic
    async fn send_request(&self, request: &CreateMessageRequest) -> Result<DiaryDraft, AIError> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match self.send_single_request(request).await {
                Ok(draft) => return Ok(draft),
                Err(AIError::RateLimitExceeded) => {
                    let backoff = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis(),
                        "Rate limited, retrying after backoff"
                    );
                    tokio::time::sleep(backoff).await;
                    last_error = Some(AIError::RateLimitExceeded);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(AIError::RateLimitExceeded))
    }

    /// Sends a single request to the Claude API
    async fn send_single_request(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<DiaryDraft, AIError> {
        debug!(model = %self.model, "Sending draft request to Claude API");

        let response = self
            .client
            .post(CLAUDE_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to Claude API");
                AIError::RequestFailed(e.to_string())
            })?;

        let status = response.status();

        if status.is_success() {
            let body: CreateMessageResponse = response.json().await.map_err(|e| {
                error!(error = %e, "Failed to parse Claude API response");
                AIError::InvalidResponse(e.to_string())
            })?;

            let text = body
                .content
                .into_iter()
                .filter_map(|block| match block {
                    ResponseContent::Text { text } => Some(text),
                })
                .collect::<Vec<_>>()
                .join("\n");

            if text.is_empty() {
                return Err(AIError::InvalidResponse(
                    "No text content in response".to_string(),
                ));
            }

            debug!(text_length = text.len(), "Received draft from Claude API");
            Ok(DiaryDraft { text })
        } else {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status.as_u16() {
                401 => {
                    error!("Claude API authentication failed");
                    Err(AIError::Unauthorized)
                }
                429 => {
                    warn!("Claude API rate limit exceeded");
                    Err(AIError::RateLimitExceeded)
                }
                400 => {
                    error!(body = %error_body, "Claude API invalid request");
                    Err(AIError::InvalidRequest(error_body))
                }
                _ => {
                    error!(status = %status, body = %error_body, "Claude API error");
                    Err(AIError::ProviderError("claude".to_string(), error_body))
                }
            }
        }
    }
}

#[async_trait]
impl AIProviderPort for ClaudeAdapter {
    async fn draft_entry(&self, prompt: DiaryPrompt) -> Result<DiaryDraft, AIError> {
        let request = self.build_request(&prompt);
        self.send_request(&request).await
    }
}

// === Request/Response Types ===

#[derive(Debug, Serialize)]
struct CreateMessageRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
struct ImageSource {
    #[serde(rename = "type")]
    source_type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct CreateMessageResponse {
    content: Vec<ResponseContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseContent {
    Text { text: String },
}
