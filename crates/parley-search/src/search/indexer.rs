//! Indexing pipeline - keeps engine documents synchronized with the store
//!
//! Single-entity sync reads the current entity state, rebuilds the
//! document and upserts it. An entity that disappeared or was
//! soft-deleted/deactivated before the call landed is a normal race, not
//! an error. The bulk reindex walks the whole message corpus in
//! creation-time order, one bounded page at a time.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::storage::EntityReader;

use super::document::{ConversationDocument, DocumentKind, MessageDocument, UserDocument};
use super::gateway::SearchGateway;

/// Entity-to-index synchronization
#[derive(Clone)]
pub struct IndexingPipeline {
    reader: Arc<dyn EntityReader>,
    gateway: Arc<SearchGateway>,
}

impl IndexingPipeline {
    pub fn new(reader: Arc<dyn EntityReader>, gateway: Arc<SearchGateway>) -> Self {
        Self { reader, gateway }
    }

    /// Sync one message into the index
    ///
    /// Missing or soft-deleted messages are a no-op: the caller raced a
    /// deletion and the index is reconciled by the delete path instead.
    pub async fn index_message(&self, id: &str) -> Result<()> {
        let Some(entity) = self.reader.find_message_with_relations(id).await? else {
            debug!(message_id = id, "Message gone before indexing; skipping");
            return Ok(());
        };

        if entity.message.is_deleted() {
            debug!(message_id = id, "Message soft-deleted; skipping");
            return Ok(());
        }

        let document = MessageDocument::from_entity(&entity);
        self.gateway.index_one(&document).await
    }

    /// Sync one user into the index
    ///
    /// A deactivated account must never stay searchable, so deactivation
    /// deletes the document rather than leaving a stale one behind.
    pub async fn index_user(&self, id: &str) -> Result<()> {
        let Some(user) = self.reader.find_user_by_id(id).await? else {
            debug!(user_id = id, "User gone before indexing; skipping");
            return Ok(());
        };

        if !user.is_active {
            debug!(user_id = id, "User deactivated; removing document");
            return self.gateway.delete_one(DocumentKind::User, id).await;
        }

        let document = UserDocument::from_entity(&user);
        self.gateway.index_one(&document).await
    }

    /// Sync one conversation into the index
    pub async fn index_conversation(&self, id: &str) -> Result<()> {
        let Some(entity) = self.reader.find_conversation_with_active_members(id).await? else {
            debug!(conversation_id = id, "Conversation gone before indexing; skipping");
            return Ok(());
        };

        if !entity.conversation.is_active {
            debug!(conversation_id = id, "Conversation inactive; removing document");
            return self
                .gateway
                .delete_one(DocumentKind::Conversation, id)
                .await;
        }

        let document = ConversationDocument::from_entity(&entity);
        self.gateway.index_one(&document).await
    }

    /// Remove a hard-deleted message from the index
    pub async fn remove_message(&self, id: &str) -> Result<()> {
        self.gateway.delete_one(DocumentKind::Message, id).await
    }

    /// Remove a deleted user from the index
    pub async fn remove_user(&self, id: &str) -> Result<()> {
        self.gateway.delete_one(DocumentKind::User, id).await
    }

    /// Remove a deleted conversation from the index
    pub async fn remove_conversation(&self, id: &str) -> Result<()> {
        self.gateway.delete_one(DocumentKind::Conversation, id).await
    }

    /// Re-derive every message document from the store
    ///
    /// Pages strictly in creation-time order; batch N+1 is not read before
    /// batch N's engine write returned, which bounds memory to one page
    /// and serializes load on the engine. Not transactional: a crash
    /// leaves a partially reindexed corpus, and rerunning is safe because
    /// every write is an idempotent upsert. There is no persisted cursor -
    /// a restart begins again at offset 0.
    pub async fn bulk_index_messages(&self, batch_size: usize) -> Result<u64> {
        if batch_size == 0 {
            return Err(Error::InvalidInput(
                "bulk reindex batch size must be positive".to_string(),
            ));
        }

        let mut offset: u32 = 0;
        let mut total: u64 = 0;

        loop {
            let page = self
                .reader
                .page_non_deleted_messages(offset, batch_size as u32)
                .await?;
            if page.is_empty() {
                break;
            }

            let documents: Vec<MessageDocument> =
                page.iter().map(MessageDocument::from_entity).collect();
            self.gateway.index_batch(&documents).await?;

            total += documents.len() as u64;
            debug!(
                batch = documents.len(),
                offset, total, "Indexed message batch"
            );

            // A short page means the corpus is exhausted
            if page.len() < batch_size {
                break;
            }
            offset += batch_size as u32;
        }

        info!(total, "Bulk message reindex complete");
        Ok(total)
    }
}
