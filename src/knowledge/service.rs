//! Knowledge-entry lifecycle and similarity search.
//!
//! [`KnowledgeService`] is the single entry point callers (CRUD routes, the
//! CLI) talk to. It validates input, asks the embedding provider for
//! vectors, and drives the storage contract — it never constructs backend
//! queries itself.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::embedding::{EmbedError, EmbeddingProvider, EMBEDDING_DIM};
use crate::storage::EntryStore;

use super::error::{KnowledgeError, KnowledgeResult};
use super::rank::{rank, SearchResponse};
use super::types::{
    DeleteReceipt, EntryPatch, EntryType, KnowledgeEntry, NewEntry, DEFAULT_RELEVANCE,
    DEFAULT_SOURCE,
};

/// Optional knobs for a similarity search. Unset fields fall back to the
/// configured defaults.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Result count cap. Clamped to the configured hard maximum.
    pub limit: Option<usize>,
    /// Minimum acceptable similarity. The default of 0.0 filters nothing.
    pub threshold: Option<f64>,
    /// Restrict candidates to a single category.
    pub entry_type: Option<EntryType>,
}

/// The retrieval service. Owns no state beyond its injected collaborators;
/// all persistence goes through the [`EntryStore`] contract and all vectors
/// come from the [`EmbeddingProvider`].
pub struct KnowledgeService {
    store: Arc<dyn EntryStore>,
    embedding: Arc<dyn EmbeddingProvider>,
    retrieval: RetrievalConfig,
}

impl KnowledgeService {
    pub fn new(
        store: Arc<dyn EntryStore>,
        embedding: Arc<dyn EmbeddingProvider>,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedding,
            retrieval,
        }
    }

    /// Create a new entry.
    ///
    /// Exactly one embedding computation and one storage write. An embedding
    /// failure aborts the whole operation with nothing persisted.
    pub fn create(&self, owner_id: &str, new: NewEntry) -> KnowledgeResult<KnowledgeEntry> {
        if new.title.trim().is_empty() {
            return Err(KnowledgeError::Validation("title must not be empty".into()));
        }
        if new.content.trim().is_empty() {
            return Err(KnowledgeError::Validation(
                "content must not be empty".into(),
            ));
        }
        if let Some(relevance) = new.relevance {
            validate_relevance(relevance)?;
        }
        if let Some(metadata) = &new.metadata {
            validate_metadata(metadata)?;
        }

        let embedding = self.checked_embed(&format!("{} {}", new.title, new.content))?;

        let now = Utc::now();
        let entry = KnowledgeEntry {
            id: uuid::Uuid::now_v7().to_string(),
            owner_id: owner_id.to_string(),
            title: new.title,
            content: new.content,
            entry_type: new.entry_type.unwrap_or_default(),
            relevance: new.relevance.unwrap_or(DEFAULT_RELEVANCE),
            tags: new.tags.unwrap_or_default(),
            source: new.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            metadata: new.metadata,
            embedding,
            last_accessed: now,
            created_at: now,
            updated_at: now,
        };

        self.store.upsert(&entry)?;
        debug!(id = %entry.id, owner = owner_id, entry_type = %entry.entry_type, "entry created");
        Ok(entry)
    }

    /// Fetch a single entry by id within the owner scope.
    ///
    /// A successful read touches `last_accessed`. The touch is best-effort:
    /// the returned entry always carries the fresh timestamp, and a failure
    /// to persist it is logged and swallowed rather than failing the read.
    pub fn get(&self, owner_id: &str, id: &str) -> KnowledgeResult<KnowledgeEntry> {
        let mut entry = self
            .store
            .fetch_by_id(owner_id, id)?
            .ok_or(KnowledgeError::NotFound)?;

        let now = Utc::now();
        entry.last_accessed = now;
        if let Err(e) = self.store.touch_last_accessed(owner_id, id, now) {
            warn!(id, error = %e, "failed to record last_accessed");
        }
        Ok(entry)
    }

    /// Apply a partial update.
    ///
    /// Existence and ownership are resolved first — a foreign-owner id gets
    /// [`KnowledgeError::NotFound`] no matter what the patch contains. When
    /// the patch touches title or content, the embedding is recomputed from
    /// the merged text ([`EntryPatch::merged_text`]) before anything is
    /// written. A patch with no recognized fields is rejected as
    /// [`KnowledgeError::NoChanges`] so a typo'd field name can't pass for a
    /// successful write.
    pub fn update(
        &self,
        owner_id: &str,
        id: &str,
        patch: EntryPatch,
    ) -> KnowledgeResult<KnowledgeEntry> {
        let mut entry = self
            .store
            .fetch_by_id(owner_id, id)?
            .ok_or(KnowledgeError::NotFound)?;

        if patch.is_empty() {
            return Err(KnowledgeError::NoChanges);
        }
        if let Some(title) = &patch.title {
            if title.trim().is_empty() {
                return Err(KnowledgeError::Validation("title must not be empty".into()));
            }
        }
        if let Some(content) = &patch.content {
            if content.trim().is_empty() {
                return Err(KnowledgeError::Validation(
                    "content must not be empty".into(),
                ));
            }
        }
        if let Some(relevance) = patch.relevance {
            validate_relevance(relevance)?;
        }
        if let Some(metadata) = &patch.metadata {
            validate_metadata(metadata)?;
        }

        if patch.touches_text() {
            entry.embedding = self.checked_embed(&patch.merged_text(&entry))?;
        }

        let EntryPatch {
            title,
            content,
            entry_type,
            tags,
            source,
            relevance,
            metadata,
        } = patch;
        if let Some(title) = title {
            entry.title = title;
        }
        if let Some(content) = content {
            entry.content = content;
        }
        if let Some(entry_type) = entry_type {
            entry.entry_type = entry_type;
        }
        if let Some(tags) = tags {
            entry.tags = tags;
        }
        if let Some(source) = source {
            entry.source = source;
        }
        if let Some(relevance) = relevance {
            entry.relevance = relevance;
        }
        if let Some(metadata) = metadata {
            entry.metadata = Some(metadata);
        }
        entry.updated_at = Utc::now();

        self.store.upsert(&entry)?;
        debug!(id, owner = owner_id, "entry updated");
        Ok(entry)
    }

    /// Delete an entry and its vector. Irreversible.
    pub fn delete(&self, owner_id: &str, id: &str) -> KnowledgeResult<DeleteReceipt> {
        let entry = self
            .store
            .fetch_by_id(owner_id, id)?
            .ok_or(KnowledgeError::NotFound)?;

        if !self.store.delete(owner_id, id)? {
            // Raced with another delete between fetch and remove
            return Err(KnowledgeError::NotFound);
        }
        debug!(id, owner = owner_id, "entry deleted");
        Ok(DeleteReceipt {
            id: entry.id,
            title: entry.title,
        })
    }

    /// Similarity search over the owner's entries.
    ///
    /// Brute-force scan: embed the query, score every candidate, then rank
    /// via [`rank`] (similarity desc, relevance desc, last_accessed desc).
    /// An owner with zero entries gets an empty response, not an error.
    pub fn search(
        &self,
        owner_id: &str,
        query: &str,
        options: &SearchOptions,
    ) -> KnowledgeResult<SearchResponse> {
        if query.trim().is_empty() {
            return Err(KnowledgeError::Validation("query must not be empty".into()));
        }

        let query_vec = self.checked_embed(query)?;
        let candidates = self
            .store
            .fetch_all_by_owner(owner_id, options.entry_type)?;

        let limit = options
            .limit
            .unwrap_or(self.retrieval.default_limit)
            .min(self.retrieval.max_limit);
        let threshold = options.threshold.unwrap_or(self.retrieval.default_threshold);

        debug!(
            owner = owner_id,
            candidates = candidates.len(),
            limit,
            threshold,
            "similarity search"
        );
        Ok(rank(&query_vec, candidates, threshold, limit))
    }

    /// Embed text and verify the provider honored the system dimensionality.
    /// A mismatch would silently corrupt every comparison, so it fails loudly
    /// instead.
    fn checked_embed(&self, text: &str) -> KnowledgeResult<Vec<f32>> {
        let vector = self.embedding.embed(text)?;
        if vector.len() != EMBEDDING_DIM {
            return Err(KnowledgeError::Generation(EmbedError::DimensionMismatch {
                expected: EMBEDDING_DIM,
                actual: vector.len(),
            }));
        }
        Ok(vector)
    }
}

fn validate_relevance(relevance: f64) -> KnowledgeResult<()> {
    // Inclusive bounds: 0.0 and 1.0 are both valid
    if !(0.0..=1.0).contains(&relevance) {
        return Err(KnowledgeError::Validation(format!(
            "relevance must be within [0.0, 1.0], got {relevance}"
        )));
    }
    Ok(())
}

fn validate_metadata(metadata: &serde_json::Value) -> KnowledgeResult<()> {
    if !metadata.is_object() {
        return Err(KnowledgeError::Validation(
            "metadata must be a JSON object".into(),
        ));
    }
    Ok(())
}
