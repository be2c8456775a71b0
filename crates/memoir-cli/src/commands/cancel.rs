//! Cancel command
//!
//! Handles `memoir cancel`: reverts to the Basic plan.

use anyhow::Result;

use crate::app::AppContext;

/// Cancel the subscription and revert to Basic
pub async fn run(ctx: &AppContext) -> Result<()> {
    let storage = super::open_storage(ctx.config()).await?;
    let service = super::open_service(storage).await?;

    let status = service.cancel_subscription().await?;

    println!("Subscription cancelled.");
    println!(
        "Plan: {} ({})",
        status.plan().display_name,
        if status.is_active { "active" } else { "inactive" }
    );
    println!();
    println!("AI drafting is paused until you subscribe or restore a purchase.");

    Ok(())
}
