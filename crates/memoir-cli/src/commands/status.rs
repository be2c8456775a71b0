//! Status command
//!
//! Handles `memoir status`: subscription snapshot, quota usage, and
//! configuration summary.

use anyhow::Result;
use chrono::{DateTime, Utc};
use memoir_core::Entitlements;

use crate::app::AppContext;

/// Show subscription status and quota usage
pub async fn run(ctx: &AppContext) -> Result<()> {
    let config = ctx.config();
    let storage = super::open_storage(config).await?;
    let service = super::open_service(storage).await?;

    let now = Utc::now();
    let status = service.current_status(now).await?;
    let plan = status.plan();
    let grants = Entitlements::evaluate(&status);

    println!("Memoir Status");
    println!("=============");
    println!();
    println!("Plan: {} ({})", plan.display_name, status.plan_id);
    println!(
        "Subscription: {}",
        if status.is_active { "Active" } else { "Inactive" }
    );
    if let Some(expires_at) = status.expires_at {
        println!("Expires: {}", format_date(expires_at));
        println!(
            "Auto-renewal: {}",
            if status.auto_renewal { "On" } else { "Off" }
        );
    }
    println!();

    println!("Monthly AI drafts");
    println!("-----------------");
    println!(
        "  Used: {} / {}",
        status.usage_count, plan.monthly_generation_limit
    );
    println!("  Remaining: {}", grants.remaining_generations);
    println!("  Counting since: {}", format_date(status.last_reset_at));
    println!();

    println!("Features");
    println!("--------");
    println!("  AI generation: {}", yes_no(grants.ai_generation));
    println!("  Writing prompts: {}", yes_no(grants.writing_prompts));
    println!("  Advanced filters: {}", yes_no(grants.advanced_filters));
    println!("  Advanced analytics: {}", yes_no(grants.advanced_analytics));
    println!("  Priority support: {}", yes_no(grants.priority_support));
    println!();

    println!("Configuration");
    println!("-------------");
    println!(
        "  Data directory: {}",
        config.storage.data_dir.to_string_lossy()
    );
    println!("  AI provider: {}", config.ai.default_provider);
    println!("  Model: {}", config.ai.model);

    Ok(())
}

fn yes_no(granted: bool) -> &'static str {
    if granted {
        "Yes"
    } else {
        "No"
    }
}

fn format_date(when: DateTime<Utc>) -> String {
    when.format("%Y-%m-%d").to_string()
}
