#![allow(dead_code)]

use std::sync::Arc;

use cairn::config::RetrievalConfig;
use cairn::db;
use cairn::embedding::hashed::HashedProvider;
use cairn::knowledge::service::KnowledgeService;
use cairn::knowledge::types::NewEntry;
use cairn::storage::sqlite::SqliteEntryStore;

/// Build a service backed by a fresh in-memory SQLite database with schema
/// and migrations applied — the full production stack minus the file on disk.
pub fn sqlite_service() -> KnowledgeService {
    let conn = db::open_memory_database().unwrap();
    KnowledgeService::new(
        Arc::new(SqliteEntryStore::from_connection(conn)),
        Arc::new(HashedProvider::new()),
        RetrievalConfig::default(),
    )
}

/// Build a service over an on-disk database at `path`.
pub fn sqlite_service_at(path: &std::path::Path) -> KnowledgeService {
    let store = SqliteEntryStore::open(path, 5000).unwrap();
    KnowledgeService::new(
        Arc::new(store),
        Arc::new(HashedProvider::new()),
        RetrievalConfig::default(),
    )
}

/// Minimal new-entry input with everything else defaulted.
pub fn new_entry(title: &str, content: &str) -> NewEntry {
    NewEntry {
        title: title.into(),
        content: content.into(),
        ..Default::default()
    }
}
