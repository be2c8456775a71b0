//! Restore command
//!
//! Handles `memoir restore`: replays completed purchases from the platform.

use anyhow::Result;
use chrono::Utc;
use memoir_core::{plan, Applied};

use crate::app::AppContext;

/// Restore previously completed purchases
pub async fn run(ctx: &AppContext) -> Result<()> {
    let storage = super::open_storage(ctx.config()).await?;
    let service = super::open_service(storage).await?;

    let now = Utc::now();
    let outcomes = service.restore_purchases(now).await?;

    if outcomes.is_empty() {
        println!("No purchases to restore.");
        return Ok(());
    }

    for outcome in &outcomes {
        match outcome {
            Applied::Activated { plan: plan_id } => {
                println!("Restored: {}", plan::lookup(*plan_id).display_name);
            }
            Applied::AlreadyApplied => println!("Skipped: already applied."),
            Applied::Expired => println!("Skipped: purchase has expired."),
            Applied::Cancelled => println!("Skipped: cancelled flow."),
        }
    }

    let status = service.current_status(now).await?;
    println!();
    println!(
        "Current plan: {} ({})",
        status.plan().display_name,
        if status.is_active { "active" } else { "inactive" }
    );

    Ok(())
}
