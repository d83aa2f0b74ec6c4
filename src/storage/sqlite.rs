//! SQLite-backed entry store.
//!
//! Entry records live in the `entries` table; their vectors live in the
//! `entries_vec` vec0 virtual table, kept in sync inside one transaction per
//! write. The service hands this adapter whole entries — partial updates are
//! merged upstream, so every write here is a full-row upsert and no query
//! text is ever assembled field-by-field.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{EntryStore, StoreError};
use crate::embedding::EMBEDDING_DIM;
use crate::knowledge::types::{EntryType, KnowledgeEntry};

pub struct SqliteEntryStore {
    conn: Mutex<Connection>,
}

impl SqliteEntryStore {
    /// Open (or create) the database at `path` with schema and migrations
    /// applied. `busy_timeout_ms` bounds how long any call may wait on a
    /// locked database before surfacing [`StoreError::Busy`].
    pub fn open(path: impl AsRef<Path>, busy_timeout_ms: u64) -> anyhow::Result<Self> {
        let conn = crate::db::open_database(path)?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Wrap an already-initialized connection. Tests use this with an
    /// in-memory database.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".into()))
    }
}

const ENTRY_COLUMNS: &str = "e.id, e.owner_id, e.title, e.content, e.type, e.relevance, \
     e.tags, e.source, e.metadata, e.last_accessed, e.created_at, e.updated_at, v.embedding";

impl EntryStore for SqliteEntryStore {
    fn upsert(&self, entry: &KnowledgeEntry) -> Result<(), StoreError> {
        if entry.embedding.len() != EMBEDDING_DIM {
            return Err(StoreError::Backend(format!(
                "refusing to store embedding of length {}, expected {EMBEDDING_DIM}",
                entry.embedding.len()
            )));
        }

        let tags = serde_json::to_string(&entry.tags)
            .map_err(|e| StoreError::Backend(format!("failed to encode tags: {e}")))?;
        let metadata = entry
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| StoreError::Backend(format!("failed to encode metadata: {e}")))?;

        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(map_sqlite_err)?;

        tx.execute(
            "INSERT INTO entries (id, owner_id, title, content, type, relevance, tags, source, metadata, last_accessed, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12) \
             ON CONFLICT(id) DO UPDATE SET \
               title = excluded.title, content = excluded.content, type = excluded.type, \
               relevance = excluded.relevance, tags = excluded.tags, source = excluded.source, \
               metadata = excluded.metadata, last_accessed = excluded.last_accessed, \
               updated_at = excluded.updated_at",
            params![
                entry.id,
                entry.owner_id,
                entry.title,
                entry.content,
                entry.entry_type.as_str(),
                entry.relevance,
                tags,
                entry.source,
                metadata,
                entry.last_accessed.to_rfc3339(),
                entry.created_at.to_rfc3339(),
                entry.updated_at.to_rfc3339(),
            ],
        )
        .map_err(map_sqlite_err)?;

        // vec0 rows have no in-place update; replace delete+insert
        tx.execute("DELETE FROM entries_vec WHERE id = ?1", params![entry.id])
            .map_err(map_sqlite_err)?;
        tx.execute(
            "INSERT INTO entries_vec (id, embedding) VALUES (?1, ?2)",
            params![entry.id, embedding_to_bytes(&entry.embedding)],
        )
        .map_err(map_sqlite_err)?;

        tx.commit().map_err(map_sqlite_err)
    }

    fn fetch_by_id(&self, owner_id: &str, id: &str) -> Result<Option<KnowledgeEntry>, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM entries e \
                 JOIN entries_vec v ON v.id = e.id \
                 WHERE e.id = ?1 AND e.owner_id = ?2"
            ),
            params![id, owner_id],
            row_to_entry,
        )
        .optional()
        .map_err(map_sqlite_err)
    }

    fn fetch_all_by_owner(
        &self,
        owner_id: &str,
        entry_type: Option<EntryType>,
    ) -> Result<Vec<KnowledgeEntry>, StoreError> {
        let conn = self.lock()?;

        let rows = match entry_type {
            Some(t) => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {ENTRY_COLUMNS} FROM entries e \
                         JOIN entries_vec v ON v.id = e.id \
                         WHERE e.owner_id = ?1 AND e.type = ?2"
                    ))
                    .map_err(map_sqlite_err)?;
                let rows = stmt
                    .query_map(params![owner_id, t.as_str()], row_to_entry)
                    .map_err(map_sqlite_err)?
                    .collect::<Result<Vec<_>, _>>();
                rows
            }
            None => {
                let mut stmt = conn
                    .prepare(&format!(
                        "SELECT {ENTRY_COLUMNS} FROM entries e \
                         JOIN entries_vec v ON v.id = e.id \
                         WHERE e.owner_id = ?1"
                    ))
                    .map_err(map_sqlite_err)?;
                let rows = stmt
                    .query_map(params![owner_id], row_to_entry)
                    .map_err(map_sqlite_err)?
                    .collect::<Result<Vec<_>, _>>();
                rows
            }
        };

        rows.map_err(map_sqlite_err)
    }

    fn delete(&self, owner_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(map_sqlite_err)?;

        let removed = tx
            .execute(
                "DELETE FROM entries WHERE id = ?1 AND owner_id = ?2",
                params![id, owner_id],
            )
            .map_err(map_sqlite_err)?;
        if removed > 0 {
            tx.execute("DELETE FROM entries_vec WHERE id = ?1", params![id])
                .map_err(map_sqlite_err)?;
        }

        tx.commit().map_err(map_sqlite_err)?;
        Ok(removed > 0)
    }

    fn touch_last_accessed(
        &self,
        owner_id: &str,
        id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE entries SET last_accessed = ?1 WHERE id = ?2 AND owner_id = ?3",
            params![at.to_rfc3339(), id, owner_id],
        )
        .map_err(map_sqlite_err)?;
        Ok(())
    }
}

/// Map a joined entries/entries_vec row into a [`KnowledgeEntry`].
fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    let type_str: String = row.get(4)?;
    let tags_str: String = row.get(6)?;
    let metadata_str: Option<String> = row.get(8)?;
    let embedding_bytes: Vec<u8> = row.get(12)?;

    Ok(KnowledgeEntry {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        entry_type: type_str
            .parse()
            .map_err(|e: String| conversion_err(4, e))?,
        relevance: row.get(5)?,
        tags: serde_json::from_str(&tags_str).map_err(|e| conversion_err(6, e.to_string()))?,
        source: row.get(7)?,
        metadata: metadata_str
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(|e| conversion_err(8, e.to_string()))?,
        embedding: bytes_to_embedding(&embedding_bytes),
        last_accessed: parse_timestamp(row, 9)?,
        created_at: parse_timestamp(row, 10)?,
        updated_at: parse_timestamp(row, 11)?,
    })
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_err(idx, e.to_string()))
}

fn conversion_err(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn map_sqlite_err(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            StoreError::Busy(e.to_string())
        }
        _ => StoreError::Backend(e.to_string()),
    }
}

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            embedding.len() * std::mem::size_of::<f32>(),
        )
    }
}

/// Inverse of [`embedding_to_bytes`]: decode a vec0 blob back into f32s.
fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
