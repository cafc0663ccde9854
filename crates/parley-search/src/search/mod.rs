//! Search domain module
//!
//! Authorized search, index synchronization and suggestions over the
//! engine-agnostic gateway.
//!
//! # Architecture
//!
//! - **Documents**: `MessageDocument`, `UserDocument`,
//!   `ConversationDocument` - flat, denormalized engine records
//! - **Filter**: tagged-union filter clauses with a single serializer
//! - **Access**: `AccessResolver` derives the per-request authorized scope
//!   from membership/blocking state
//! - **Gateway**: `SearchGateway` hides the engine behind per-kind indexes
//! - **Service**: `SearchService` orchestrates the three search operations
//! - **Indexer**: `IndexingPipeline` for single-entity sync and bulk
//!   reindex; `IndexQueue` for fire-and-forget sync
//! - **Suggest**: `SuggestionEngine` blends recent terms with contacts
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use parley_search::engine::MeiliClient;
//! use parley_search::search::{SearchGateway, SearchService, MessageSearchRequest};
//! use parley_search::storage::{Database, SqliteEntityReader};
//!
//! // Bootstrap: one gateway, configured once
//! let engine = Arc::new(MeiliClient::from_config(&config.engine)?);
//! let gateway = Arc::new(SearchGateway::new(engine));
//! gateway.configure_indexes().await?;
//!
//! let reader = Arc::new(SqliteEntityReader::new(db.pool().clone()));
//! let service = SearchService::new(gateway.clone(), reader.clone());
//!
//! let page = service
//!     .search_messages(&MessageSearchRequest::new("hello", user_id))
//!     .await?;
//! ```

pub mod access;
pub mod document;
pub mod filter;
pub mod gateway;
pub mod indexer;
pub mod query;
pub mod service;
pub mod suggest;
pub mod tasks;

// Re-export main types
pub use access::{AccessResolver, AccessScope};
pub use document::{
    ConversationDocument, DocumentKind, IndexedDocument, MessageDocument, UserDocument,
};
pub use filter::{render_all, Filter};
pub use gateway::{SearchGateway, SearchStats};
pub use indexer::IndexingPipeline;
pub use query::{
    ConversationSearchRequest, Hit, MessageSearchRequest, SearchPage, UserSearchRequest,
};
pub use service::SearchService;
pub use suggest::{Suggestion, SuggestionEngine, SuggestionKind};
pub use tasks::{IndexJob, IndexQueue};
