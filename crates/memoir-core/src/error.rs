//! Common error types for Memoir
//!
//! Domain-specific errors live next to the code that produces them (ports,
//! ledger, reconciliation) and are re-exported here for convenience.

use thiserror::Error;

// Re-export domain-specific errors
pub use crate::diary::DiaryError;
pub use crate::ledger::UsageError;
pub use crate::logging::LoggerError;
pub use crate::plan::PlanError;
pub use crate::ports::ai::AIError;
pub use crate::ports::billing::PurchaseError;
pub use crate::ports::storage::StorageError;
pub use crate::reconcile::ReconcileError;
pub use crate::subscription::SubscriptionError;

/// Top-level error type for Memoir operations
///
/// Wraps all domain-specific errors with automatic conversion via `From`,
/// enabling propagation with `?` across module boundaries.
#[derive(Debug, Error)]
pub enum MemoirError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Plan catalog errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Usage accounting errors
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    /// Purchase platform errors
    #[error("Purchase error: {0}")]
    Purchase(#[from] PurchaseError),

    /// Purchase reconciliation errors
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Subscription facade errors
    #[error("Subscription error: {0}")]
    Subscription(#[from] SubscriptionError),

    /// AI provider errors
    #[error("AI error: {0}")]
    AI(#[from] AIError),

    /// Logger errors
    #[error("Logger error: {0}")]
    Logger(#[from] LoggerError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Parse error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
