//! CLI command implementations
//!
//! Each subcommand has its own module with the implementation logic.

pub mod cancel;
pub mod generate;
pub mod journal;
pub mod plans;
pub mod restore;
pub mod status;
pub mod subscribe;

use anyhow::{Context, Result};
use chrono::Utc;
use memoir_adapters::{SandboxBillingAdapter, SqliteKvAdapter};
use memoir_core::{Config, SubscriptionService};
use std::sync::Arc;

/// The concrete subscription service the CLI wires together
pub(crate) type CliSubscriptionService = SubscriptionService<SqliteKvAdapter, SandboxBillingAdapter>;

/// Opens the key-value store backing all durable state
pub(crate) async fn open_storage(config: &Config) -> Result<Arc<SqliteKvAdapter>> {
    let db_path = config.storage.data_dir.join("memoir.db");
    let storage = SqliteKvAdapter::new(&db_path)
        .await
        .context("Failed to open database")?;
    Ok(Arc::new(storage))
}

/// Wires storage and the sandbox purchase platform into the facade
pub(crate) async fn open_service(
    storage: Arc<SqliteKvAdapter>,
) -> Result<CliSubscriptionService> {
    let billing = Arc::new(SandboxBillingAdapter::new());
    SubscriptionService::initialize(storage, billing, Utc::now())
        .await
        .context("Failed to load subscription state")
}
