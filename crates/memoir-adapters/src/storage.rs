//! Storage adapter implementations
//!
//! Contains the SQLite adapter backing the key-value port.

use async_trait::async_trait;
use memoir_core::ports::storage::{KeyValuePort, StorageError};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_rusqlite::Connection;

const CREATE_KV_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

/// SQLite adapter implementing KeyValuePort
///
/// One row per key. The `updated_at` column is bookkeeping for debugging
/// with the sqlite3 shell; nothing reads it programmatically.
pub struct SqliteKvAdapter {
    conn: Connection,
}

impl SqliteKvAdapter {
    /// Creates a new SQLite adapter and initializes the schema
    ///
    /// # Errors
    /// Returns `StorageError::Connection` if opening the database fails
    pub async fn new(db_path: &Path) -> Result<Self, StorageError> {
        let path_str = db_path.to_string_lossy().to_string();

        let conn = Connection::open(&path_str)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::initialize_schema(&conn).await?;

        tracing::info!("SQLite key-value store initialized at {}", path_str);
        Ok(Self { conn })
    }

    /// Creates a new in-memory adapter for testing
    pub async fn new_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open(":memory:")
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Self::initialize_schema(&conn).await?;

        Ok(Self { conn })
    }

    async fn initialize_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.call(|conn| {
            // WAL mode for better write performance
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            conn.execute(CREATE_KV_TABLE_SQL, [])?;
            Ok(())
        })
        .await
        .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    fn unix_now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl KeyValuePort for SqliteKvAdapter {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
                let mut rows = stmt.query(rusqlite::params![key])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, Vec<u8>>(0)?)),
                    None => Ok(None),
                }
            })
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        let key = key.to_string();
        let updated_at = Self::unix_now();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                    rusqlite::params![key, value, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let key = key.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
                Ok(())
            })
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }
}
