//! Error taxonomy for the retrieval service.

use thiserror::Error;

use crate::embedding::EmbedError;
use crate::storage::StoreError;

/// Every failure a service operation can return. All variants are recovered
/// at the operation boundary — none should surface as a panic. Messages never
/// carry vector values or backend query text.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Malformed or out-of-range input. Caller-fixable; never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// The entry does not exist, or belongs to a different owner. The two
    /// cases are deliberately indistinguishable.
    #[error("entry not found")]
    NotFound,

    /// An update payload that touches no recognized field.
    #[error("nothing to update")]
    NoChanges,

    /// The embedding generator failed; the operation was aborted whole.
    #[error("embedding generation failed: {0}")]
    Generation(#[from] EmbedError),

    /// The storage backend failed. Retryable from the caller's side; the
    /// core itself never retries.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result type alias for service operations.
pub type KnowledgeResult<T> = Result<T, KnowledgeError>;
