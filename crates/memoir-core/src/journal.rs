//! Diary entry persistence
//!
//! Stores accepted entries through the same key-value port that holds the
//! subscription record: one record per entry plus a single index record
//! listing entry ids newest-first. Index updates are serialized behind a
//! mutex so concurrent saves cannot lose each other's index writes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::ports::storage::{KeyValuePort, StorageError};

/// Key the entry-id index is stored under
const INDEX_KEY: &str = "journal/index";

/// A saved diary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Entry identifier, derived from the creation timestamp
    pub id: String,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// Entry text (AI-drafted, possibly edited by the user)
    pub text: String,
    /// Number of photos the entry was drafted from
    pub photo_count: usize,
    /// Mood the user attached, if any
    pub mood: Option<String>,
}

impl DiaryEntry {
    /// Creates an entry stamped with `created_at`
    pub fn new(
        text: String,
        photo_count: usize,
        mood: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: created_at.format("%Y%m%dT%H%M%S%3f").to_string(),
            created_at,
            text,
            photo_count,
            mood,
        }
    }
}

fn entry_key(id: &str) -> String {
    format!("journal/entry/{}", id)
}

/// Journal store over the key-value port
pub struct JournalStore<S: KeyValuePort> {
    storage: Arc<S>,
    index_lock: Mutex<()>,
}

impl<S: KeyValuePort> JournalStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            index_lock: Mutex::new(()),
        }
    }

    /// Saves an entry and prepends its id to the index
    ///
    /// Saving an entry whose id is already indexed replaces the record
    /// without duplicating the index slot.
    pub async fn save(&self, entry: &DiaryEntry) -> Result<(), StorageError> {
        let _serial = self.index_lock.lock().await;

        let bytes = serde_json::to_vec(entry).map_err(|e| StorageError::Corrupt {
            key: entry_key(&entry.id),
            reason: e.to_string(),
        })?;
        self.storage.put(&entry_key(&entry.id), bytes).await?;

        let mut index = self.read_index().await?;
        if !index.iter().any(|id| id == &entry.id) {
            index.insert(0, entry.id.clone());
            self.write_index(&index).await?;
        }

        info!(id = %entry.id, "Diary entry saved");
        Ok(())
    }

    /// Returns the entry stored under `id`, or `None` if absent
    pub async fn get(&self, id: &str) -> Result<Option<DiaryEntry>, StorageError> {
        let key = entry_key(id);
        match self.storage.get(&key).await? {
            Some(bytes) => {
                let entry = serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                    key,
                    reason: e.to_string(),
                })?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Returns up to `limit` entries, newest first
    ///
    /// Index slots whose entry record has gone missing are skipped.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<DiaryEntry>, StorageError> {
        let index = self.read_index().await?;
        let mut entries = Vec::new();
        for id in index.iter().take(limit) {
            match self.get(id).await? {
                Some(entry) => entries.push(entry),
                None => debug!(id = %id, "Indexed entry record is missing, skipping"),
            }
        }
        Ok(entries)
    }

    /// Deletes an entry and removes it from the index
    pub async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let _serial = self.index_lock.lock().await;

        self.storage.delete(&entry_key(id)).await?;
        let mut index = self.read_index().await?;
        let before = index.len();
        index.retain(|indexed| indexed != id);
        if index.len() != before {
            self.write_index(&index).await?;
        }
        Ok(())
    }

    async fn read_index(&self) -> Result<Vec<String>, StorageError> {
        match self.storage.get(INDEX_KEY).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
                key: INDEX_KEY.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn write_index(&self, index: &[String]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(index).map_err(|e| StorageError::Corrupt {
            key: INDEX_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.storage.put(INDEX_KEY, bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::collections::HashMap;

    struct MemoryStore {
        entries: std::sync::Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                entries: std::sync::Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl KeyValuePort for MemoryStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
            self.entries.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, d, h, 0, 0).unwrap()
    }

    fn entry(text: &str, created_at: DateTime<Utc>) -> DiaryEntry {
        DiaryEntry::new(text.to_string(), 2, Some("calm".to_string()), created_at)
    }

    #[tokio::test]
    async fn test_save_and_get_round_trip() {
        let store = JournalStore::new(Arc::new(MemoryStore::new()));
        let entry = entry("Rain on the window all afternoon.", at(1, 18));

        store.save(&entry).await.unwrap();
        let loaded = store.get(&entry.id).await.unwrap().unwrap();
        assert_eq!(loaded, entry);
    }

    #[tokio::test]
    async fn test_get_missing_entry_is_none() {
        let store = JournalStore::new(Arc::new(MemoryStore::new()));
        assert!(store.get("20240601T000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first() {
        let store = JournalStore::new(Arc::new(MemoryStore::new()));
        let first = entry("Monday", at(3, 9));
        let second = entry("Tuesday", at(4, 9));
        let third = entry("Wednesday", at(5, 9));

        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();
        store.save(&third).await.unwrap();

        let recent = store.list_recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].text, "Wednesday");
        assert_eq!(recent[1].text, "Tuesday");
    }

    #[tokio::test]
    async fn test_resave_does_not_duplicate_index() {
        let store = JournalStore::new(Arc::new(MemoryStore::new()));
        let mut entry = entry("Draft", at(6, 9));

        store.save(&entry).await.unwrap();
        entry.text = "Edited".to_string();
        store.save(&entry).await.unwrap();

        let recent = store.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].text, "Edited");
    }

    #[tokio::test]
    async fn test_delete_removes_entry_and_index_slot() {
        let store = JournalStore::new(Arc::new(MemoryStore::new()));
        let keep = entry("Keep", at(7, 9));
        let drop = entry("Drop", at(8, 9));
        store.save(&keep).await.unwrap();
        store.save(&drop).await.unwrap();

        store.delete(&drop.id).await.unwrap();

        assert!(store.get(&drop.id).await.unwrap().is_none());
        let recent = store.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].text, "Keep");
    }

    #[tokio::test]
    async fn test_delete_missing_entry_is_ok() {
        let store = JournalStore::new(Arc::new(MemoryStore::new()));
        store.delete("20240601T000000000").await.unwrap();
    }
}
