//! Memoir Adapters - Infrastructure implementations
//!
//! This crate contains concrete implementations of the ports defined in
//! memoir-core: SQLite-backed key-value storage, AI provider clients, and a
//! sandbox purchase platform.

pub mod ai;
pub mod billing;
pub mod storage;

// Re-export primary adapter types
pub use ai::{ClaudeAdapter, GeminiAdapter};
pub use billing::SandboxBillingAdapter;
pub use storage::SqliteKvAdapter;
