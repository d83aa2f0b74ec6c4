//! Deterministic feature-hashing embedding provider.
//!
//! Implements [`EmbeddingProvider`] without a trained model: lowercase
//! alphanumeric tokens and adjacent-token bigrams are hashed with FNV-1a
//! into a fixed number of buckets, term frequencies accumulate, and the
//! result is L2-normalized. Identical text always produces a bit-identical
//! vector, which lets callers skip re-embedding unchanged text and lets
//! tests assert exact values.
//!
//! All feature weights are non-negative, so cosine similarity between any
//! two embeddings lands in `[0.0, 1.0]`.

use super::{EmbedError, EmbeddingProvider, EMBEDDING_DIM};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Bigram features get less weight than the unigrams they span.
const BIGRAM_WEIGHT: f32 = 0.5;

/// Stateless feature-hashing embedder.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashedProvider;

impl HashedProvider {
    pub fn new() -> Self {
        Self
    }
}

impl EmbeddingProvider for HashedProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Err(EmbedError::EmptyText);
        }

        let mut v = vec![0.0f32; EMBEDDING_DIM];
        for token in &tokens {
            v[bucket(token)] += 1.0;
        }
        // Bigrams separate short templated texts that unigram counts alone
        // would leave tied.
        for pair in tokens.windows(2) {
            let joined = format!("{} {}", pair[0], pair[1]);
            v[bucket(&joined)] += BIGRAM_WEIGHT;
        }

        Ok(l2_normalize(&v))
    }
}

/// Lowercased alphanumeric tokens, in input order.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Map a token to its dimension bucket.
fn bucket(token: &str) -> usize {
    (fnv1a(token.as_bytes()) % EMBEDDING_DIM as u64) as usize
}

/// 64-bit FNV-1a. Stable across platforms and process runs.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// L2-normalize a vector. The input always has at least one positive
/// component here, so the norm is never zero.
fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
