//! Engine abstraction for the external full-text search service
//!
//! The search core never talks to the engine's HTTP API outside this
//! module. `SearchEngine` is the seam: the production implementation is
//! `MeiliClient`; tests substitute a recording double.
//!
//! Engine writes (document add/delete, settings) are asynchronous tasks on
//! the engine side - this module does not wait for task completion. The
//! index is allowed to trail the relational store; consumers tolerate
//! eventual consistency.

pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

pub use client::{MeiliClient, MeiliClientBuilder};
pub use types::{IndexSettings, IndexStats, SearchRequest, SearchResponse};

/// Operations the search core assumes of the engine
///
/// All errors propagate unchanged - suppression, where allowed at all,
/// belongs to the callers of the indexing pipeline, never this layer.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Create the index if it does not exist yet
    async fn ensure_index(&self, uid: &str, primary_key: &str) -> Result<()>;

    /// Apply searchable/filterable/sortable attributes and ranking rules
    async fn apply_settings(&self, uid: &str, settings: &IndexSettings) -> Result<()>;

    /// Execute a search against one index
    async fn search(&self, uid: &str, request: &SearchRequest) -> Result<SearchResponse>;

    /// Add documents, replacing any existing document with the same id
    async fn add_or_replace(&self, uid: &str, documents: Vec<Value>) -> Result<()>;

    /// Add documents, merging fields into any existing document
    async fn add_or_update(&self, uid: &str, documents: Vec<Value>) -> Result<()>;

    /// Delete one document by id (no-op if absent)
    async fn delete_document(&self, uid: &str, id: &str) -> Result<()>;

    /// Delete every document in the index
    async fn delete_all(&self, uid: &str) -> Result<()>;

    /// Document count and indexing state for one index
    async fn stats(&self, uid: &str) -> Result<IndexStats>;
}
