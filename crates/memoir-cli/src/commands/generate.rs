//! Generate command
//!
//! Handles `memoir generate <photo>...`: reads photos from disk, encodes
//! them as Base64, runs the gated draft through the configured AI provider,
//! and saves the accepted entry to the journal.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use memoir_adapters::{ClaudeAdapter, GeminiAdapter};
use memoir_core::ports::ai::PhotoData;
use memoir_core::{
    AIProvider, ApiKeyManager, DiaryEntry, DiaryError, DiaryWriter, DraftOutcome, EntryContext,
    JournalStore, PromptBuilder, MAX_PHOTOS,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::AppContext;

/// Draft a diary entry from photos
pub async fn run(
    ctx: &AppContext,
    photo_paths: &[PathBuf],
    note: Option<String>,
    mood: Option<String>,
) -> Result<()> {
    let config = ctx.config();

    // Parse AI provider from config
    let provider: AIProvider = config
        .ai
        .default_provider
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    // Check API key availability first
    let api_key = match ApiKeyManager::load_api_key(provider) {
        Ok(key) => key,
        Err(_) => {
            eprintln!("Error: API key not configured.\n");
            eprintln!("{}", ApiKeyManager::missing_key_guidance(provider));
            return Ok(());
        }
    };

    if photo_paths.len() > MAX_PHOTOS {
        eprintln!(
            "Error: Too many photos ({}). A diary entry can use at most {} photos.",
            photo_paths.len(),
            MAX_PHOTOS
        );
        return Ok(());
    }

    // Collect and encode photos
    println!("Reading {} photo(s)...", photo_paths.len());
    let photos = collect_photos(photo_paths)?;
    if photos.is_empty() {
        eprintln!("Error: None of the given photo files could be read.");
        return Ok(());
    }

    let context = EntryContext {
        note,
        mood: mood.clone(),
    };
    let prompt = PromptBuilder::build_entry_prompt(photos.clone(), &context)
        .map_err(|e| anyhow::anyhow!("Failed to build prompt: {}", e))?;

    let storage = super::open_storage(config).await?;
    let service = Arc::new(super::open_service(Arc::clone(&storage)).await?);

    println!(
        "Drafting with {} ({})...",
        provider.display_name(),
        config.ai.model
    );
    println!();

    let now = Utc::now();
    let outcome = match provider {
        AIProvider::Claude => {
            let adapter = Arc::new(ClaudeAdapter::new(api_key.expose(), &config.ai.model));
            DiaryWriter::new(Arc::clone(&service), adapter)
                .draft(prompt, now)
                .await
        }
        AIProvider::Gemini => {
            let adapter = Arc::new(GeminiAdapter::new(api_key.expose(), &config.ai.model));
            DiaryWriter::new(Arc::clone(&service), adapter)
                .draft(prompt, now)
                .await
        }
    };

    match outcome {
        Ok(DraftOutcome { text, used, limit }) => {
            let entry = DiaryEntry::new(text.clone(), photos.len(), mood, now);
            JournalStore::new(storage)
                .save(&entry)
                .await
                .context("Failed to save diary entry")?;

            println!("Diary Entry ({})", now.format("%Y-%m-%d"));
            println!("========================");
            println!();
            println!("{}", text);
            println!();
            println!("Saved as entry {}. Drafts used this month: {}/{}.", entry.id, used, limit);
        }
        Err(DiaryError::QuotaExceeded { used, limit }) => {
            eprintln!("Monthly draft quota reached ({}/{}).", used, limit);
            eprintln!();
            eprintln!("Upgrade for a larger allowance:");
            eprintln!("  memoir plans");
            eprintln!("  memoir subscribe premium_monthly");
        }
        Err(DiaryError::Inactive) => {
            eprintln!("Your subscription is inactive.");
            eprintln!();
            eprintln!("Re-activate with:");
            eprintln!("  memoir subscribe <plan>");
            eprintln!("  memoir restore");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

/// Reads photo files and encodes them as Base64
fn collect_photos(paths: &[PathBuf]) -> Result<Vec<PhotoData>> {
    let mut photos = Vec::new();

    for path in paths {
        if !path.exists() {
            tracing::warn!("Photo file not found: {}", path.display());
            eprintln!("Warning: skipping missing file {}", path.display());
            continue;
        }

        match read_and_encode_photo(path) {
            Ok(photo) => photos.push(photo),
            Err(e) => {
                tracing::warn!("Failed to read photo {}: {}", path.display(), e);
                eprintln!("Warning: skipping unreadable file {}", path.display());
            }
        }
    }

    Ok(photos)
}

/// Reads a photo file and encodes it as Base64
fn read_and_encode_photo(path: &Path) -> Result<PhotoData> {
    let bytes = fs::read(path).context("Failed to read photo file")?;
    Ok(PhotoData {
        base64: BASE64.encode(&bytes),
        media_type: media_type_for(path).to_string(),
    })
}

/// Maps a file extension to its MIME type
fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_media_type_for_known_extensions() {
        assert_eq!(media_type_for(Path::new("a.png")), "image/png");
        assert_eq!(media_type_for(Path::new("a.PNG")), "image/png");
        assert_eq!(media_type_for(Path::new("a.gif")), "image/gif");
        assert_eq!(media_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(media_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn test_read_and_encode_photo() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("photo.png");
        fs::write(&path, b"fake image bytes").unwrap();

        let photo = read_and_encode_photo(&path).unwrap();
        assert_eq!(photo.media_type, "image/png");
        assert_eq!(
            BASE64.decode(photo.base64.as_bytes()).unwrap(),
            b"fake image bytes"
        );
    }

    #[test]
    fn test_collect_photos_skips_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let present = temp_dir.path().join("present.jpg");
        fs::write(&present, b"data").unwrap();
        let missing = temp_dir.path().join("missing.jpg");

        let photos = collect_photos(&[present, missing]).unwrap();
        assert_eq!(photos.len(), 1);
    }
}
