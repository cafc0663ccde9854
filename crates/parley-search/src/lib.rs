//! Parley search subsystem
//!
//! This crate provides the search and indexing core for Parley, including:
//! - Authorized search over messages, users and conversations
//! - Engine-agnostic gateway over a MeiliSearch-compatible service
//! - Index synchronization (single-entity sync and bulk reindex)
//! - Background index queue for fire-and-forget sync
//! - Search suggestions from recent messages and contacts
//!
//! Authorization is derived from relational membership/blocking state on
//! every request; the engine's index is treated as an eventually
//! consistent projection of the relational store.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod search;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SearchConfig;
    pub use crate::error::{Error, Result};
    pub use crate::search::{
        IndexingPipeline, MessageSearchRequest, SearchGateway, SearchService, SuggestionEngine,
    };
    pub use crate::storage::{Database, SqliteEntityReader};
}
