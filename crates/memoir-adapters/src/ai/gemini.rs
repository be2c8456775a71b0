//! Gemini API adapter implementation
//!
//! Implements the AIProviderPort trait for Google's Gemini API.

use async_trait::async_trait;
use memoir_core::ports::ai::{AIError, AIProviderPort, DiaryDraft, DiaryPrompt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default Gemini model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

/// Gemini API base URL
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Maximum retry attempts for rate limiting
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Gemini API adapter
///
/// Communicates with Google's Gemini API to draft diary entries from photos.
pub struct GeminiAdapter {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiAdapter {
    /// Creates a new Gemini adapter
    ///
    /// # Arguments
    /// * `api_key` - Google AI API key
    /// * `model` - Model identifier (e.g., "gemini-2.0-flash-exp")
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

    /// Creates a new Gemini adapter with the default model
    pub fn with_default_model(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_GEMINI_MODEL)
    }

    /// Returns the model identifier
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the API endpoint URL
    fn api_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        )
    }

    /// Builds the request body for the Gemini API
    ///
    /// Gemini has no dedicated system slot at this endpoint, so the system
    /// message rides as the first text part.
    fn build_request(&self, prompt: &DiaryPrompt) -> GenerateContentRequest {
        let mut parts = Vec::new();

        if !prompt.system_message.is_empty() {
            parts.push(Part::Text {
                text: prompt.system_message.clone(),
            });
        }

        for photo in &prompt.photos {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: photo.media_type.clone(),
                    data: photo.base64.clone(),
                },
            });
        }

        parts.push(Part::Text {
            text: prompt.user_text.clone(),
        });

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: Some(GenerationConfig {
                max_output_tokens: Some(1024),
            }),
        }
    }

    /// Sends a request to the Gemini API with retry logic
    async fn send_request(&self, request: &GenerateContentRequest) -> Result<DiaryDraft, AIError> {
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

    /// Sends a single request to the Gemini API
    async fn send_single_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<DiaryDraft, AIError> {
        debug!(model = %self.model, "Sending draft request to Gemini API");

        let response = self
            .client
            .post(self.api_url())
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to Gemini API");
                AIError::RequestFailed(e.to_string())
            })?;

        let status = response.status();

        if status.is_success() {
            let body: GenerateContentResponse = response.json().await.map_err(|e| {
                error!(error = %e, "Failed to parse Gemini API response");
                AIError::InvalidResponse(e.to_string())
            })?;

            let text = body
                .candidates
                .into_iter()
                .flat_map(|candidate| candidate.content.parts)
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("\n");

            if text.is_empty() {
                return Err(AIError::InvalidResponse(
                    "No text content in response".to_string(),
                ));
            }

            debug!(text_length = text.len(), "Received draft from Gemini API");
            Ok(DiaryDraft { text })
        } else {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            match status.as_u16() {
                401 | 403 => {
                    error!("Gemini API authentication failed");
                    Err(AIError::Unauthorized)
                }
                429 => {
                    warn!("Gemini API rate limit exceeded");
                    Err(AIError::RateLimitExceeded)
                }
                400 => {
                    error!(body = %error_body, "Gemini API invalid request");
                    Err(AIError::InvalidRequest(error_body))
                }
                _ => {
                    error!(status = %status, body = %error_body, "Gemini API error");
                    Err(AIError::ProviderError("gemini".to_string(), error_body))
                }
            }
        }
    }
}

#[async_trait]
impl AIProviderPort for GeminiAdapter {
    async fn draft_entry(&self, prompt: DiaryPrompt) -> Result<DiaryDraft, AIError> {
        let request = self.build_request(&prompt);
        self.send_request(&request).await
    }
}

// === Request/Response Types ===

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::ports::ai::PhotoData;

    fn create_test_prompt() -> DiaryPrompt {
        DiaryPrompt {
            system_message: "You are a thoughtful diarist.".to_string(),
            user_text: "Write today's entry from these photos.".to_string(),
            photos: vec![PhotoData {
                base64: "aGVsbG8=".to_string(),
                media_type: "image/jpeg".to_string(),
            }],
        }
    }

    #[test]
    fn test_gemini_adapter_creation() {
        let adapter = GeminiAdapter::new("test-key", "gemini-2.0-flash-exp");
        assert_eq!(adapter.model(), "gemini-2.0-flash-exp");
    }

    #[test]
    fn test_gemini_adapter_with_default_model() {
        let adapter = GeminiAdapter::with_default_model("test-key");
        assert_eq!(adapter.model(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_api_url_contains_model_and_key() {
        let adapter = GeminiAdapter::new("test-key", "gemini-2.0-flash-exp");
        let url = adapter.api_url();
        assert!(url.contains("gemini-2.0-flash-exp"));
        assert!(url.contains("key=test-key"));
    }

    #[test]
    fn test_build_request_structure() {
        let adapter = GeminiAdapter::new("test-key", "gemini-2.0-flash-exp");
        let request = adapter.build_request(&create_test_prompt());

        assert_eq!(request.contents.len(), 1);
        // system text + 1 photo + user text
        assert_eq!(request.contents[0].parts.len(), 3);
    }

    #[test]
    fn test_request_serializes_camel_case_fields() {
        let adapter = GeminiAdapter::new("test-key", "gemini-2.0-flash-exp");
        let request = adapter.build_request(&create_test_prompt());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert!(json["generationConfig"]["maxOutputTokens"].is_number());
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "A quiet day in the park."}]}}
            ]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(
            response.candidates[0].content.parts[0].text.as_deref(),
            Some("A quiet day in the park.")
        );
    }

    #[test]
    fn test_empty_response_has_no_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }
}
