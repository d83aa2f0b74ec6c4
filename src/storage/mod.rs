//! Storage contract for knowledge entries.
//!
//! The retrieval service consumes storage only through [`EntryStore`]; the
//! backend is chosen once at startup via [`create_store`]. Two backends
//! ship: [`sqlite::SqliteEntryStore`] for persistence and
//! [`memory::MemoryEntryStore`] for tests and throwaway sessions.

pub mod memory;
pub mod sqlite;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::knowledge::types::{EntryType, KnowledgeEntry};

/// Storage backend failure. Retryable from the caller's perspective — the
/// retrieval core itself never retries.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend was busy or locked past the configured deadline.
    #[error("storage busy: {0}")]
    Busy(String),
    /// Any other backend failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// The read/write contract the retrieval service consumes.
///
/// Every operation is scoped by `owner_id`; an id that exists under a
/// different owner behaves exactly like one that does not exist.
pub trait EntryStore: Send + Sync {
    /// Write all fields of an entry, embedding included, atomically.
    /// Inserts a new row or replaces an existing one.
    fn upsert(&self, entry: &KnowledgeEntry) -> Result<(), StoreError>;

    /// Single-entry fetch. `None` covers both nonexistence and foreign
    /// ownership.
    fn fetch_by_id(&self, owner_id: &str, id: &str) -> Result<Option<KnowledgeEntry>, StoreError>;

    /// Bulk fetch of an owner's entries for the similarity scan, optionally
    /// restricted to one category.
    fn fetch_all_by_owner(
        &self,
        owner_id: &str,
        entry_type: Option<EntryType>,
    ) -> Result<Vec<KnowledgeEntry>, StoreError>;

    /// Remove an entry and its vector. Returns `false` when nothing matched.
    fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError>;

    /// Record a read access. Best-effort — callers tolerate failure and
    /// concurrent touches may race last-write-wins.
    fn touch_last_accessed(
        &self,
        owner_id: &str,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Build the store selected by configuration.
pub fn create_store(config: &crate::config::StorageConfig) -> anyhow::Result<Box<dyn EntryStore>> {
    match config.backend.as_str() {
        "sqlite" => {
            let db_path = crate::config::expand_tilde(&config.db_path)?;
            let store = sqlite::SqliteEntryStore::open(db_path, config.busy_timeout_ms)?;
            Ok(Box::new(store))
        }
        "memory" => Ok(Box::new(memory::MemoryEntryStore::new())),
        other => anyhow::bail!("unknown storage backend: {other}. Supported: sqlite, memory"),
    }
}
