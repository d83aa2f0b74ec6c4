//! In-memory entry store.
//!
//! A mutex-guarded map implementing the same contract as the SQLite
//! backend. Used by unit tests and selectable with `backend = "memory"` —
//! the backend choice is made once at startup, never by a mode flag inside
//! business logic.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use super::{EntryStore, StoreError};
use crate::knowledge::types::{EntryType, KnowledgeEntry};

#[derive(Default)]
pub struct MemoryEntryStore {
    entries: Mutex<HashMap<String, KnowledgeEntry>>,
}

impl MemoryEntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, KnowledgeEntry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("entry map lock poisoned".into()))
    }
}

impl EntryStore for MemoryEntryStore {
    fn upsert(&self, entry: &KnowledgeEntry) -> Result<(), StoreError> {
        self.lock()?.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn fetch_by_id(&self, owner_id: &str, id: &str) -> Result<Option<KnowledgeEntry>, StoreError> {
        Ok(self
            .lock()?
            .get(id)
            .filter(|e| e.owner_id == owner_id)
            .cloned())
    }

    fn fetch_all_by_owner(
        &self,
        owner_id: &str,
        entry_type: Option<EntryType>,
    ) -> Result<Vec<KnowledgeEntry>, StoreError> {
        Ok(self
            .lock()?
            .values()
            .filter(|e| e.owner_id == owner_id)
            .filter(|e| entry_type.map_or(true, |t| e.entry_type == t))
            .cloned()
            .collect())
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut entries = self.lock()?;
        match entries.get(id) {
            Some(e) if e.owner_id == owner_id => {
                entries.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn touch_last_accessed(
        &self,
        owner_id: &str,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        if let Some(e) = entries.get_mut(id) {
            if e.owner_id == owner_id {
                e.last_accessed = at;
            }
        }
        Ok(())
    }
}
