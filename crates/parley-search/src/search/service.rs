//! Search orchestration
//!
//! Composes the access resolver, filter builder and gateway into the three
//! search operations. Authorization failures and empty scopes are decided
//! before the engine is ever called.

use std::sync::Arc;

use tracing::debug;

use crate::engine::SearchRequest;
use crate::error::Result;
use crate::storage::EntityReader;

use super::access::{AccessResolver, AccessScope};
use super::document::{ConversationDocument, DocumentKind, MessageDocument, UserDocument};
use super::filter::{render_all, Filter};
use super::gateway::SearchGateway;
use super::query::{
    ConversationSearchRequest, MessageSearchRequest, SearchPage, UserSearchRequest,
};

/// Crop length for highlighted message content
const MESSAGE_CROP_LENGTH: usize = 50;

/// Authorized search over messages, users and conversations
#[derive(Clone)]
pub struct SearchService {
    gateway: Arc<SearchGateway>,
    access: AccessResolver,
}

impl SearchService {
    pub fn new(gateway: Arc<SearchGateway>, reader: Arc<dyn EntityReader>) -> Self {
        Self {
            gateway,
            access: AccessResolver::new(reader),
        }
    }

    /// Search messages across the requester's conversations
    ///
    /// A target conversation outside the requester's membership fails with
    /// `Error::Forbidden`. A requester with no conversations at all gets
    /// an empty page without an engine round-trip.
    pub async fn search_messages(
        &self,
        request: &MessageSearchRequest,
    ) -> Result<SearchPage<MessageDocument>> {
        let scope = self
            .access
            .message_scope(&request.user_id, request.conversation_id.as_deref())
            .await?;

        let conversation_ids = match scope {
            AccessScope::Empty => {
                debug!(user_id = %request.user_id, "No active conversations; skipping engine");
                return Ok(empty_page(
                    &request.query,
                    DocumentKind::Message,
                    request.limit,
                    request.offset,
                ));
            }
            AccessScope::Member(ids) => ids,
        };

        let mut filters = vec![Filter::any_of("conversationId", conversation_ids)];
        if let Some(from) = request.date_from {
            filters.push(Filter::gte("createdAt", from.div_euclid(1000)));
        }
        if let Some(to) = request.date_to {
            filters.push(Filter::lte("createdAt", to.div_euclid(1000)));
        }
        if !request.kinds.is_empty() {
            let tags = request
                .kinds
                .iter()
                .map(|kind| kind.as_str().to_string())
                .collect();
            filters.push(Filter::any_of("type", tags));
        }
        if let Some(has_attachments) = request.has_attachments {
            filters.push(Filter::flag("hasAttachments", has_attachments));
        }

        let engine_request = paged(
            SearchRequest::new(&request.query)
                .with_filters(render_all(&filters))
                .with_sort(vec!["createdAt:desc".to_string()])
                .with_highlight(vec!["content".to_string(), "senderName".to_string()])
                .with_crop(vec!["content".to_string()], MESSAGE_CROP_LENGTH),
            request.limit,
            request.offset,
        );

        self.gateway.search(engine_request).await
    }

    /// Search user accounts
    ///
    /// Deactivated accounts are always filtered out; accounts the
    /// requester blocked are excluded on request. An empty blocked set
    /// adds no exclusion clause.
    pub async fn search_users(
        &self,
        request: &UserSearchRequest,
    ) -> Result<SearchPage<UserDocument>> {
        let mut filters = vec![Filter::flag("isActive", true)];

        if request.exclude_blocked {
            let blocked = self.access.blocked_user_ids(&request.user_id).await?;
            filters.push(Filter::none_of("id", blocked));
        }

        let engine_request = paged(
            SearchRequest::new(&request.query)
                .with_filters(render_all(&filters))
                .with_highlight(vec!["username".to_string(), "name".to_string()]),
            request.limit,
            request.offset,
        );

        self.gateway.search(engine_request).await
    }

    /// Search the requester's conversations
    pub async fn search_conversations(
        &self,
        request: &ConversationSearchRequest,
    ) -> Result<SearchPage<ConversationDocument>> {
        let scope = self.access.conversation_scope(&request.user_id).await?;

        let conversation_ids = match scope {
            AccessScope::Empty => {
                debug!(user_id = %request.user_id, "No active conversations; skipping engine");
                return Ok(empty_page(
                    &request.query,
                    DocumentKind::Conversation,
                    request.limit,
                    request.offset,
                ));
            }
            AccessScope::Member(ids) => ids,
        };

        let filters = vec![
            Filter::any_of("id", conversation_ids),
            Filter::flag("isActive", true),
        ];

        let engine_request = paged(
            SearchRequest::new(&request.query)
                .with_filters(render_all(&filters))
                .with_sort(vec!["updatedAt:desc".to_string()])
                .with_highlight(vec!["title".to_string(), "memberNames".to_string()]),
            request.limit,
            request.offset,
        );

        self.gateway.search(engine_request).await
    }
}

fn paged(
    mut request: SearchRequest,
    limit: Option<usize>,
    offset: Option<usize>,
) -> SearchRequest {
    if let Some(limit) = limit {
        request = request.with_limit(limit);
    }
    if let Some(offset) = offset {
        request = request.with_offset(offset);
    }
    request
}

fn empty_page<T>(
    query: &str,
    kind: DocumentKind,
    limit: Option<usize>,
    offset: Option<usize>,
) -> SearchPage<T> {
    SearchPage::empty(
        query,
        limit.unwrap_or_else(|| kind.default_limit()),
        offset.unwrap_or(0),
    )
}
