//! Denormalized search documents
//!
//! Flat records stored in the engine, one kind per index. Documents are
//! snapshots: denormalized fields (sender name, reply content) reflect the
//! source entities at index time and are only refreshed by an explicit
//! re-index of the owning entity.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{
    ConversationKind, ConversationWithMembers, MessageKind, MessageWithRelations, User,
};

/// The three indexed document kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Message,
    User,
    Conversation,
}

impl DocumentKind {
    /// Index uid in the engine
    pub fn index_uid(&self) -> &'static str {
        match self {
            Self::Message => "messages",
            Self::User => "users",
            Self::Conversation => "conversations",
        }
    }

    /// Engine-side default page size when the caller supplies none
    pub fn default_limit(&self) -> usize {
        match self {
            Self::Message => 50,
            Self::User | Self::Conversation => 20,
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Message, Self::User, Self::Conversation]
    }
}

/// A document type stored in one of the engine's indexes
pub trait IndexedDocument: Serialize + DeserializeOwned + Send + Sync {
    const KIND: DocumentKind;

    /// Primary key in the engine
    fn id(&self) -> &str;
}

/// Search document for a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDocument {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub sender_username: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Epoch seconds
    pub created_at: i64,
    pub has_attachments: bool,
    pub attachment_types: Vec<String>,
    /// File names, space-joined for full-text matching
    pub attachment_names: String,
    pub is_reply: bool,
    /// Content snapshot of the reply target; empty if not a reply
    pub reply_to_content: String,
}

impl MessageDocument {
    /// Build the document from a message aggregate
    ///
    /// Callers guarantee the message is not soft-deleted; the indexing
    /// pipeline checks before building.
    pub fn from_entity(entity: &MessageWithRelations) -> Self {
        let attachment_types = entity
            .attachments
            .iter()
            .map(|a| a.mime_type.clone())
            .collect::<Vec<_>>();
        let attachment_names = entity
            .attachments
            .iter()
            .map(|a| a.file_name.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: entity.message.id.clone(),
            conversation_id: entity.message.conversation_id.clone(),
            sender_id: entity.message.sender_id.clone(),
            sender_name: entity.sender.display_name.clone(),
            sender_username: entity.sender.username.clone(),
            content: entity.message.content.clone(),
            kind: entity.message.kind,
            created_at: entity.message.created_at.timestamp(),
            has_attachments: !entity.attachments.is_empty(),
            attachment_types,
            attachment_names,
            is_reply: entity.message.reply_to_id.is_some(),
            reply_to_content: entity.reply_to_content.clone().unwrap_or_default(),
        }
    }
}

impl IndexedDocument for MessageDocument {
    const KIND: DocumentKind = DocumentKind::Message;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Search document for a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub id: String,
    pub username: String,
    pub name: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    /// Epoch seconds
    pub created_at: i64,
    pub is_active: bool,
}

impl UserDocument {
    pub fn from_entity(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.display_name.clone(),
            bio: user.bio.clone(),
            avatar_url: user.avatar_url.clone(),
            created_at: user.created_at.timestamp(),
            is_active: user.is_active,
        }
    }
}

impl IndexedDocument for UserDocument {
    const KIND: DocumentKind = DocumentKind::User;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Search document for a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub title: String,
    pub member_ids: Vec<String>,
    /// Display names, space-joined for full-text matching
    pub member_names: String,
    /// Usernames, space-joined for full-text matching
    pub member_usernames: String,
    /// Epoch seconds
    pub created_at: i64,
    /// Epoch seconds
    pub updated_at: i64,
    pub is_active: bool,
}

impl ConversationDocument {
    pub fn from_entity(entity: &ConversationWithMembers) -> Self {
        let member_ids = entity
            .members
            .iter()
            .map(|m| m.id.clone())
            .collect::<Vec<_>>();
        let member_names = entity
            .members
            .iter()
            .map(|m| m.display_name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let member_usernames = entity
            .members
            .iter()
            .map(|m| m.username.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            id: entity.conversation.id.clone(),
            kind: entity.conversation.kind,
            title: entity.conversation.title.clone(),
            member_ids,
            member_names,
            member_usernames,
            created_at: entity.conversation.created_at.timestamp(),
            updated_at: entity.conversation.updated_at.timestamp(),
            is_active: entity.conversation.is_active,
        }
    }
}

impl IndexedDocument for ConversationDocument {
    const KIND: DocumentKind = DocumentKind::Conversation;

    fn id(&self) -> &str {
        &self.id
    }
}
