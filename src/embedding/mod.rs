//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait and the deterministic
//! feature-hashing implementation (384 dimensions, L2-normalized). The
//! provider is created via [`create_provider`] from configuration.

pub mod hashed;

use thiserror::Error;

/// Number of dimensions in the embedding vectors.
pub const EMBEDDING_DIM: usize = 384;

/// Failure to turn text into a vector.
///
/// A write or search that hits this error is aborted whole — no partial
/// vector is ever persisted or compared.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The input contained no embeddable tokens (empty or punctuation-only).
    #[error("text contains no embeddable tokens")]
    EmptyText,
    /// The provider produced a vector of the wrong length. Indicates a
    /// misconfigured provider, not bad input.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Trait for embedding text into vectors.
///
/// Implementations produce L2-normalized vectors of exactly [`EMBEDDING_DIM`]
/// dimensions, and must be deterministic: the same input text always maps to
/// the same vector, across calls and across processes. Implementations hold
/// no per-call mutable state and are safe to share across threads.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Return the number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"hashed"` is supported (deterministic feature hashing).
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "hashed" => Ok(Box::new(hashed::HashedProvider::new())),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: hashed"),
    }
}
