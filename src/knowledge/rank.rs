//! Similarity ranking for search results.
//!
//! Pure ordering logic over already-fetched candidates: score against the
//! query vector, drop below-threshold hits, sort, truncate. Keeping this
//! free of storage concerns means an indexed backend can be swapped in
//! later without changing the observable ordering.

use std::cmp::Ordering;

use serde::Serialize;

use super::cosine_similarity;
use super::types::KnowledgeEntry;

/// A search hit: the stored entry plus the similarity computed for this
/// query.
///
/// `similarity` is per-query and never persisted. `entry.relevance` is the
/// stored caller-assigned score. The two are distinct numbers and both are
/// returned.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub entry: KnowledgeEntry,
    pub similarity: f64,
}

/// Response from a similarity search.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<RankedEntry>,
    /// Candidates that cleared the threshold, counted before limit
    /// truncation.
    pub total_matched: usize,
}

/// Score, filter, and order candidates against a query vector.
///
/// Ordering contract: similarity descending, then stored relevance
/// descending, then `last_accessed` descending. Embeddings over short
/// templated text tie often, so the tie-breaks are part of the observable
/// behavior rather than an accident of fetch order.
pub fn rank(
    query: &[f32],
    candidates: Vec<KnowledgeEntry>,
    threshold: f64,
    limit: usize,
) -> SearchResponse {
    let mut scored: Vec<RankedEntry> = candidates
        .into_iter()
        .map(|entry| {
            let similarity = cosine_similarity(query, &entry.embedding);
            RankedEntry { entry, similarity }
        })
        .filter(|hit| hit.similarity >= threshold)
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.entry
                    .relevance
                    .partial_cmp(&a.entry.relevance)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| b.entry.last_accessed.cmp(&a.entry.last_accessed))
    });

    let total_matched = scored.len();
    scored.truncate(limit);

    SearchResponse {
        results: scored,
        total_matched,
    }
}
