//! Subscribe command
//!
//! Handles `memoir subscribe <plan>`: runs a purchase flow against the
//! sandbox platform and reconciles the result.

use anyhow::Result;
use chrono::Utc;
use memoir_core::{plan, Applied, PlanId};

use crate::app::AppContext;

/// Purchase a subscription plan
pub async fn run(ctx: &AppContext, plan_arg: &str) -> Result<()> {
    let plan_id: PlanId = match plan_arg.parse() {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Available plans:");
            for plan in plan::all().iter().filter(|p| p.is_premium()) {
                eprintln!("  {}  ({})", plan.id, plan.price);
            }
            return Ok(());
        }
    };

    let storage = super::open_storage(ctx.config()).await?;
    let service = super::open_service(storage).await?;

    let now = Utc::now();
    match service.purchase_plan(plan_id, now).await {
        Ok(Applied::Activated { plan: activated }) => {
            let status = service.current_status(now).await?;
            println!("Subscribed to {}.", plan::lookup(activated).display_name);
            if let Some(expires_at) = status.expires_at {
                println!("Paid through: {}", expires_at.format("%Y-%m-%d"));
            }
        }
        Ok(Applied::AlreadyApplied) => {
            println!("This purchase was already applied; nothing changed.");
        }
        Ok(Applied::Cancelled) => {
            println!("Purchase cancelled; nothing changed.");
        }
        Ok(Applied::Expired) => {
            println!("That purchase has already expired; nothing changed.");
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}
