//! Plans command
//!
//! Handles `memoir plans`: lists the plan catalog with entitlements.

use anyhow::Result;
use memoir_core::{plan, Entitlements};

/// List available subscription plans
pub fn run() -> Result<()> {
    println!("Memoir Plans");
    println!("============");

    for plan in plan::all() {
        let grants = Entitlements::for_plan(plan);

        println!();
        println!("{} ({})", plan.display_name, plan.id);
        println!("  Price: {}", plan.price);
        println!("  AI drafts per month: {}", grants.remaining_generations);
        println!("  Writing prompts: {}", yes_no(grants.writing_prompts));
        println!("  Advanced filters: {}", yes_no(grants.advanced_filters));
        println!("  Advanced analytics: {}", yes_no(grants.advanced_analytics));
        println!("  Priority support: {}", yes_no(grants.priority_support));
    }

    println!();
    println!("Subscribe with: memoir subscribe <plan>");

    Ok(())
}

fn yes_no(granted: bool) -> &'static str {
    if granted {
        "Yes"
    } else {
        "No"
    }
}
