//! Journal command
//!
//! Handles `memoir journal`: lists recent diary entries.

use anyhow::Result;
use memoir_core::JournalStore;

use crate::app::AppContext;

/// List recent diary entries
pub async fn run(ctx: &AppContext, limit: Option<usize>) -> Result<()> {
    let config = ctx.config();
    let limit = limit.unwrap_or(config.journal.recent_limit);

    let storage = super::open_storage(config).await?;
    let journal = JournalStore::new(storage);

    let entries = journal.list_recent(limit).await?;
    if entries.is_empty() {
        println!("No diary entries yet.");
        println!();
        println!("Draft your first entry with:");
        println!("  memoir generate <photo>...");
        return Ok(());
    }

    println!("Journal ({} most recent)", entries.len());
    println!("========================");

    for entry in &entries {
        println!();
        print!("{}", entry.created_at.format("%Y-%m-%d %H:%M"));
        if let Some(mood) = &entry.mood {
            print!("  [{}]", mood);
        }
        println!("  ({} photo(s))", entry.photo_count);
        println!("{}", entry.text);
    }

    Ok(())
}
