//! Semantic knowledge retrieval for personal productivity data.
//!
//! cairn turns free-text knowledge entries into fixed-length embedding
//! vectors, stores them next to the entry record, and answers
//! similarity-ranked search queries scoped to a single owner.
//!
//! # Architecture
//!
//! - **Embeddings**: deterministic feature hashing, 384 dimensions,
//!   L2-normalized — no model files, identical text always maps to an
//!   identical vector
//! - **Storage**: the [`storage::EntryStore`] contract with two backends —
//!   SQLite with [sqlite-vec](https://github.com/asg017/sqlite-vec) vector
//!   columns, and an in-memory map for tests and throwaway sessions
//! - **Search**: brute-force cosine scan over the owner's entries, ranked by
//!   similarity with relevance and recency tie-breaks
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, and migrations
//! - [`embedding`] — Text-to-vector embedding pipeline
//! - [`knowledge`] — Entry lifecycle, validation, and similarity search
//! - [`storage`] — Storage contract and its backends

pub mod config;
pub mod db;
pub mod embedding;
pub mod knowledge;
pub mod storage;
