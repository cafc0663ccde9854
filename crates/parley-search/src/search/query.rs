//! Search request and result page types

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::SearchResponse;
use crate::error::{Error, Result};
use crate::model::MessageKind;

/// A message search request
///
/// Date bounds are epoch milliseconds as supplied by API clients; the
/// orchestrator floors them to the epoch seconds stored in documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSearchRequest {
    pub query: String,
    /// The requesting user - authorization is derived from their
    /// membership state, never trusted from the request
    pub user_id: String,
    /// Restrict to one conversation the user must be a member of
    pub conversation_id: Option<String>,
    /// Epoch milliseconds, inclusive lower bound
    pub date_from: Option<i64>,
    /// Epoch milliseconds, inclusive upper bound
    pub date_to: Option<i64>,
    /// Restrict to these message kinds (empty = all)
    pub kinds: Vec<MessageKind>,
    /// Only set when the caller explicitly asked either way
    pub has_attachments: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl MessageSearchRequest {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            conversation_id: None,
            date_from: None,
            date_to: None,
            kinds: Vec::new(),
            has_attachments: None,
            limit: None,
            offset: None,
        }
    }

    pub fn in_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn since(mut self, epoch_ms: i64) -> Self {
        self.date_from = Some(epoch_ms);
        self
    }

    pub fn until(mut self, epoch_ms: i64) -> Self {
        self.date_to = Some(epoch_ms);
        self
    }

    pub fn with_kinds(mut self, kinds: Vec<MessageKind>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn with_attachments(mut self, has_attachments: bool) -> Self {
        self.has_attachments = Some(has_attachments);
        self
    }

    pub fn paged(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// A user search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSearchRequest {
    pub query: String,
    pub user_id: String,
    /// Exclude accounts the requester has blocked
    pub exclude_blocked: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl UserSearchRequest {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            exclude_blocked: false,
            limit: None,
            offset: None,
        }
    }

    pub fn excluding_blocked(mut self) -> Self {
        self.exclude_blocked = true;
        self
    }

    pub fn paged(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// A conversation search request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSearchRequest {
    pub query: String,
    pub user_id: String,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ConversationSearchRequest {
    pub fn new(query: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            user_id: user_id.into(),
            limit: None,
            offset: None,
        }
    }

    pub fn paged(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// One ranked hit: the document plus the engine's highlight payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit<T> {
    #[serde(flatten)]
    pub document: T,
    /// Highlighted/cropped rendition of the searchable fields, when the
    /// request asked for one
    #[serde(rename = "_formatted", skip_serializing_if = "Option::is_none")]
    pub formatted: Option<Value>,
}

/// A ranked, paginated result page
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage<T> {
    pub hits: Vec<Hit<T>>,
    pub query: String,
    pub processing_time_ms: u64,
    pub limit: usize,
    pub offset: usize,
    pub estimated_total_hits: u64,
}

impl<T> SearchPage<T> {
    /// An empty page produced without an engine round-trip
    pub fn empty(query: impl Into<String>, limit: usize, offset: usize) -> Self {
        Self {
            hits: Vec::new(),
            query: query.into(),
            processing_time_ms: 0,
            limit,
            offset,
            estimated_total_hits: 0,
        }
    }
}

impl<T: DeserializeOwned> SearchPage<T> {
    /// Build a typed page from an engine response
    pub fn from_response(response: SearchResponse) -> Result<Self> {
        let mut hits = Vec::with_capacity(response.hits.len());
        for value in response.hits {
            let hit: Hit<T> = serde_json::from_value(value).map_err(|e| {
                Error::InvalidInput(format!("malformed engine hit: {}", e))
            })?;
            hits.push(hit);
        }

        Ok(Self {
            hits,
            query: response.query,
            processing_time_ms: response.processing_time_ms,
            limit: response.limit,
            offset: response.offset,
            estimated_total_hits: response.estimated_total_hits,
        })
    }
}
