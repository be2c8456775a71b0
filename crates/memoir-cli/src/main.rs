//! Memoir CLI - AI-powered photo diary
//!
//! Main entry point for the Memoir application.

mod app;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use memoir_core::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "memoir")]
#[command(about = "AI-powered photo diary with freemium subscription tiers", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging to ~/.memoir/logs/
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show subscription status and quota usage
    Status,
    /// List available subscription plans
    Plans,
    /// Purchase a subscription plan
    Subscribe {
        /// Plan identifier (premium_monthly or premium_yearly)
        plan: String,
    },
    /// Cancel the subscription and revert to Basic
    Cancel,
    /// Restore previously completed purchases
    Restore,
    /// Draft a diary entry from photos
    Generate {
        /// Photo files to draft the entry from (max 10)
        #[arg(required = true)]
        photos: Vec<std::path::PathBuf>,
        /// Free-form note about the day
        #[arg(long)]
        note: Option<String>,
        /// One-word mood (e.g., "calm")
        #[arg(long)]
        mood: Option<String>,
    },
    /// List recent diary entries
    Journal {
        /// Maximum number of entries to list
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = if cli.verbose {
        app::InitOptions::with_logging(LogLevel::Debug)
    } else {
        app::InitOptions::command()
    };
    let ctx = app::initialize(options)?;

    match cli.command {
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Plans => commands::plans::run(),
        Commands::Subscribe { plan } => commands::subscribe::run(&ctx, &plan).await,
        Commands::Cancel => commands::cancel::run(&ctx).await,
        Commands::Restore => commands::restore::run(&ctx).await,
        Commands::Generate { photos, note, mood } => {
            commands::generate::run(&ctx, &photos, note, mood).await
        }
        Commands::Journal { limit } => commands::journal::run(&ctx, limit).await,
    }
}
