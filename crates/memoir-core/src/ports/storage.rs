//! Key-value storage port definition

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend operation failed
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Connection to the backing store failed
    #[error("Storage connection error: {0}")]
    Connection(String),

    /// A stored record could not be decoded
    #[error("Corrupt record for key '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port for the embedded key-value store
///
/// Memoir keeps its durable state (subscription status, journal entries) as
/// small records in a local key-value store. Keys are UTF-8 strings, values
/// are opaque byte payloads; encoding is the caller's concern.
#[async_trait]
pub trait KeyValuePort: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Removes the value stored under `key`; absent keys are not an error
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}
