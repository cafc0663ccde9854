//! Search gateway - the engine-agnostic index surface
//!
//! One gateway instance is constructed at process bootstrap around the
//! engine client and passed by reference to the orchestrator and the
//! indexing pipeline. `configure_indexes` runs once during bootstrap; the
//! index configuration never changes afterwards.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::engine::{IndexSettings, IndexStats, SearchEngine, SearchRequest};
use crate::error::{Error, Result};

use super::document::{DocumentKind, IndexedDocument};
use super::query::SearchPage;

/// Primary key shared by all document kinds
const PRIMARY_KEY: &str = "id";

/// Aggregated statistics across all indexes
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    pub messages: IndexStats,
    pub users: IndexStats,
    pub conversations: IndexStats,
}

/// Engine-agnostic access to the three per-kind indexes
#[derive(Clone)]
pub struct SearchGateway {
    engine: Arc<dyn SearchEngine>,
}

impl SearchGateway {
    pub fn new(engine: Arc<dyn SearchEngine>) -> Self {
        Self { engine }
    }

    /// Create and configure every index. Called once at bootstrap.
    pub async fn configure_indexes(&self) -> Result<()> {
        for kind in DocumentKind::all() {
            let uid = kind.index_uid();
            self.engine.ensure_index(uid, PRIMARY_KEY).await?;
            self.engine.apply_settings(uid, &settings_for(kind)).await?;
            info!(index = uid, "Configured search index");
        }
        Ok(())
    }

    /// Execute a typed search, applying engine-side paging defaults when
    /// the caller supplied none (messages 50/0, users/conversations 20/0)
    pub async fn search<T: IndexedDocument>(
        &self,
        mut request: SearchRequest,
    ) -> Result<SearchPage<T>> {
        let kind = T::KIND;
        request.limit = Some(request.limit.unwrap_or_else(|| kind.default_limit()));
        request.offset = Some(request.offset.unwrap_or(0));

        let response = self.engine.search(kind.index_uid(), &request).await?;
        SearchPage::from_response(response)
    }

    /// Upsert one document
    pub async fn index_one<T: IndexedDocument>(&self, document: &T) -> Result<()> {
        let value = to_value(document)?;
        self.engine
            .add_or_replace(T::KIND.index_uid(), vec![value])
            .await
    }

    /// Merge one document's fields into its existing engine document,
    /// creating it when absent
    pub async fn update_one<T: IndexedDocument>(&self, document: &T) -> Result<()> {
        let value = to_value(document)?;
        self.engine
            .add_or_update(T::KIND.index_uid(), vec![value])
            .await
    }

    /// Upsert a batch of documents with a single engine call
    pub async fn index_batch<T: IndexedDocument>(&self, documents: &[T]) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let values = documents.iter().map(to_value).collect::<Result<Vec<_>>>()?;
        self.engine
            .add_or_replace(T::KIND.index_uid(), values)
            .await
    }

    /// Delete one document by id
    pub async fn delete_one(&self, kind: DocumentKind, id: &str) -> Result<()> {
        self.engine.delete_document(kind.index_uid(), id).await
    }

    /// Delete every document of one kind
    pub async fn clear(&self, kind: DocumentKind) -> Result<()> {
        self.engine.delete_all(kind.index_uid()).await
    }

    /// Document counts and indexing state across all kinds
    pub async fn get_stats(&self) -> Result<SearchStats> {
        Ok(SearchStats {
            messages: self.engine.stats(DocumentKind::Message.index_uid()).await?,
            users: self.engine.stats(DocumentKind::User.index_uid()).await?,
            conversations: self
                .engine
                .stats(DocumentKind::Conversation.index_uid())
                .await?,
        })
    }
}

fn to_value<T: IndexedDocument>(document: &T) -> Result<Value> {
    serde_json::to_value(document)
        .map_err(|e| Error::InvalidInput(format!("unserializable document: {}", e)))
}

/// Index configuration per document kind
///
/// Searchable attributes are the free-text fields, filterable attributes
/// are everything the filter builder emits, sortable attributes back the
/// orchestrator's sort choices. Message ranking appends a recency
/// tie-breaker after the engine's default rules.
fn settings_for(kind: DocumentKind) -> IndexSettings {
    fn owned(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    match kind {
        DocumentKind::Message => IndexSettings {
            searchable_attributes: owned(&[
                "content",
                "senderName",
                "senderUsername",
                "attachmentNames",
                "replyToContent",
            ]),
            filterable_attributes: owned(&[
                "conversationId",
                "senderId",
                "type",
                "createdAt",
                "hasAttachments",
                "isReply",
            ]),
            sortable_attributes: owned(&["createdAt"]),
            ranking_rules: owned(&[
                "words",
                "typo",
                "proximity",
                "attribute",
                "sort",
                "exactness",
                "createdAt:desc",
            ]),
        },
        DocumentKind::User => IndexSettings {
            searchable_attributes: owned(&["username", "name", "bio"]),
            filterable_attributes: owned(&["id", "isActive", "createdAt"]),
            sortable_attributes: owned(&["createdAt", "username"]),
            ranking_rules: Vec::new(),
        },
        DocumentKind::Conversation => IndexSettings {
            searchable_attributes: owned(&["title", "memberNames", "memberUsernames"]),
            filterable_attributes: owned(&["id", "type", "isActive", "updatedAt"]),
            sortable_attributes: owned(&["updatedAt", "createdAt"]),
            ranking_rules: Vec::new(),
        },
    }
}
