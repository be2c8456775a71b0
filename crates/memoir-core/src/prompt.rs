//! Prompt builder for diary drafting
//!
//! Builds multimodal prompts from the day's photos and optional context.

use crate::ports::ai::{AIError, DiaryPrompt, PhotoData};

/// Maximum number of photos allowed in a single draft request
pub const MAX_PHOTOS: usize = 10;

/// Optional context the user attaches to a draft request
#[derive(Debug, Clone, Default)]
pub struct EntryContext {
    /// Free-form note about the day
    pub note: Option<String>,
    /// One-word mood (e.g., "calm", "excited")
    pub mood: Option<String>,
}

/// Builder for constructing diary draft prompts
pub struct PromptBuilder;

impl PromptBuilder {
    /// Builds a diary prompt from photos and optional context
    ///
    /// # Errors
    /// * `AIError::InvalidRequest` - if no photos are provided
    /// * `AIError::PhotoLimitExceeded` - if more than [`MAX_PHOTOS`] photos
    ///   are provided
    pub fn build_entry_prompt(
        photos: Vec<PhotoData>,
        context: &EntryContext,
    ) -> Result<DiaryPrompt, AIError> {
        if photos.is_empty() {
            return Err(AIError::InvalidRequest(
                "At least one photo is required".to_string(),
            ));
        }
        if photos.len() > MAX_PHOTOS {
            return Err(AIError::PhotoLimitExceeded(MAX_PHOTOS));
        }

        Ok(DiaryPrompt {
            system_message: Self::build_system_message(),
            user_text: Self::build_user_text(photos.len(), context),
            photos,
        })
    }

    fn build_system_message() -> String {
        r#"You are a thoughtful diarist writing in the first person.
From the attached photos, write a short diary entry about this day.

Keep in mind:
- Describe what actually appears in the photos, not what might have happened
- Write warmly and concretely, in one or two short paragraphs
- Weave in the mood and notes when they are given
- Never mention that you are looking at photos or writing on someone's behalf"#
            .to_string()
    }

    fn build_user_text(photo_count: usize, context: &EntryContext) -> String {
        let mut text = format!(
            "Write today's diary entry from these {} photo(s).",
            photo_count
        );
        if let Some(mood) = context.mood.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            text.push_str(&format!("\nMood: {}", mood));
        }
        if let Some(note) = context.note.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            text.push_str(&format!("\nNotes: {}", note));
        }
        text
    }
}
