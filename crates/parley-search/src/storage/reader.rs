//! Read-only entity access for the search core
//!
//! `EntityReader` is the seam between the search core and the relational
//! store: membership and blocking state for authorization, and entity
//! aggregates for document building. The SQLite implementation maps rows
//! by hand; all queries are scoped to live data (active memberships,
//! non-deleted messages).

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::model::{
    Attachment, Contact, Conversation, ConversationKind, ConversationWithMembers, Membership,
    Message, MessageKind, MessageWithRelations, User,
};
use crate::Result;

/// Read-only queries against the relational store
#[async_trait]
pub trait EntityReader: Send + Sync {
    /// Find the requesting user's active membership in one conversation
    async fn find_active_membership(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Membership>>;

    /// All conversation ids where the user holds an active membership
    async fn find_active_conversation_ids(&self, user_id: &str) -> Result<Vec<String>>;

    /// All user ids blocked by the given user
    async fn find_blocked_user_ids(&self, user_id: &str) -> Result<Vec<String>>;

    /// Accepted contacts whose username or display name matches the query
    async fn find_accepted_contacts(&self, user_id: &str, query: &str) -> Result<Vec<Contact>>;

    /// A message with sender, attachments and reply-target snapshot
    async fn find_message_with_relations(&self, id: &str)
        -> Result<Option<MessageWithRelations>>;

    /// A user by id
    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>>;

    /// A conversation together with its currently active members
    async fn find_conversation_with_active_members(
        &self,
        id: &str,
    ) -> Result<Option<ConversationWithMembers>>;

    /// Contents of the most recent non-deleted messages visible to the
    /// user (across their active conversations) matching the query
    async fn find_recent_visible_messages(
        &self,
        user_id: &str,
        content_contains: &str,
        limit: u32,
    ) -> Result<Vec<String>>;

    /// One page of non-deleted messages with relations, ordered by
    /// creation time ascending
    async fn page_non_deleted_messages(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<MessageWithRelations>>;
}

/// SQLite implementation of the entity reader
#[derive(Debug, Clone)]
pub struct SqliteEntityReader {
    pool: SqlitePool,
}

impl SqliteEntityReader {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &SqliteRow) -> User {
        User {
            id: row.get("id"),
            username: row.get("username"),
            display_name: row.get("display_name"),
            bio: row.get("bio"),
            avatar_url: row.get("avatar_url"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_conversation(row: &SqliteRow) -> Conversation {
        let kind: String = row.get("kind");
        Conversation {
            id: row.get("id"),
            kind: ConversationKind::parse(&kind).unwrap_or(ConversationKind::Dm),
            title: row.get("title"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_message(row: &SqliteRow) -> Message {
        let kind: String = row.get("kind");
        Message {
            id: row.get("id"),
            conversation_id: row.get("conversation_id"),
            sender_id: row.get("sender_id"),
            content: row.get("content"),
            kind: MessageKind::parse(&kind).unwrap_or_default(),
            reply_to_id: row.get("reply_to_id"),
            created_at: row.get("created_at"),
            edited_at: row.get("edited_at"),
            deleted_at: row.get("deleted_at"),
        }
    }

    async fn attachments_for(&self, message_id: &str) -> Result<Vec<Attachment>> {
        let rows = sqlx::query(
            "SELECT id, message_id, file_name, mime_type, size_bytes FROM attachments WHERE message_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Attachment {
                id: row.get("id"),
                message_id: row.get("message_id"),
                file_name: row.get("file_name"),
                mime_type: row.get("mime_type"),
                size_bytes: row.get("size_bytes"),
            })
            .collect())
    }

    /// Content snapshot of a reply target. Soft-deleted targets yield no
    /// snapshot.
    async fn reply_content_for(&self, reply_to_id: Option<&str>) -> Result<Option<String>> {
        let Some(target_id) = reply_to_id else {
            return Ok(None);
        };

        let row = sqlx::query(
            "SELECT content FROM messages WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get("content")))
    }

    /// Assemble the relations for one already-loaded message + sender pair
    async fn assemble_relations(
        &self,
        message: Message,
        sender: User,
    ) -> Result<MessageWithRelations> {
        let attachments = self.attachments_for(&message.id).await?;
        let reply_to_content = self.reply_content_for(message.reply_to_id.as_deref()).await?;

        Ok(MessageWithRelations {
            message,
            sender,
            attachments,
            reply_to_content,
        })
    }
}

#[async_trait]
impl EntityReader for SqliteEntityReader {
    async fn find_active_membership(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> Result<Option<Membership>> {
        let row = sqlx::query(
            "SELECT conversation_id, user_id, role, joined_at, left_at FROM conversation_members WHERE user_id = ? AND conversation_id = ? AND left_at IS NULL",
        )
        .bind(user_id)
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Membership {
            conversation_id: r.get("conversation_id"),
            user_id: r.get("user_id"),
            role: r.get("role"),
            joined_at: r.get("joined_at"),
            left_at: r.get("left_at"),
        }))
    }

    async fn find_active_conversation_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT cm.conversation_id
            FROM conversation_members cm
            JOIN conversations c ON c.id = cm.conversation_id
            WHERE cm.user_id = ? AND cm.left_at IS NULL AND c.is_active = 1
            ORDER BY cm.joined_at ASC, cm.conversation_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("conversation_id")).collect())
    }

    async fn find_blocked_user_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT blocked_id FROM user_blocks WHERE blocker_id = ? ORDER BY created_at ASC, blocked_id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("blocked_id")).collect())
    }

    async fn find_accepted_contacts(&self, user_id: &str, query: &str) -> Result<Vec<Contact>> {
        let pattern = format!("%{}%", query.to_lowercase());

        let rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.display_name
            FROM user_contacts uc
            JOIN users u ON u.id = uc.contact_id
            WHERE uc.user_id = ?
              AND uc.status = 'accepted'
              AND u.is_active = 1
              AND (LOWER(u.username) LIKE ? OR LOWER(u.display_name) LIKE ?)
            ORDER BY u.username ASC
            LIMIT 20
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Contact {
                id: r.get("id"),
                username: r.get("username"),
                name: r.get("display_name"),
            })
            .collect())
    }

    async fn find_message_with_relations(
        &self,
        id: &str,
    ) -> Result<Option<MessageWithRelations>> {
        let row = sqlx::query(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.content, m.kind,
                   m.reply_to_id, m.created_at, m.edited_at, m.deleted_at,
                   u.id AS sender_pk, u.username, u.display_name, u.bio,
                   u.avatar_url, u.is_active,
                   u.created_at AS sender_created_at, u.updated_at AS sender_updated_at
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let message = Self::row_to_message(&row);
        let sender = User {
            id: row.get("sender_pk"),
            username: row.get("username"),
            display_name: row.get("display_name"),
            bio: row.get("bio"),
            avatar_url: row.get("avatar_url"),
            is_active: row.get("is_active"),
            created_at: row.get("sender_created_at"),
            updated_at: row.get("sender_updated_at"),
        };

        Ok(Some(self.assemble_relations(message, sender).await?))
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, display_name, bio, avatar_url, is_active, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Self::row_to_user(&r)))
    }

    async fn find_conversation_with_active_members(
        &self,
        id: &str,
    ) -> Result<Option<ConversationWithMembers>> {
        let row = sqlx::query(
            "SELECT id, kind, title, is_active, created_at, updated_at FROM conversations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let conversation = Self::row_to_conversation(&row);

        let member_rows = sqlx::query(
            r#"
            SELECT u.id, u.username, u.display_name, u.bio, u.avatar_url,
                   u.is_active, u.created_at, u.updated_at
            FROM conversation_members cm
            JOIN users u ON u.id = cm.user_id
            WHERE cm.conversation_id = ? AND cm.left_at IS NULL
            ORDER BY cm.joined_at ASC, u.id ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let members = member_rows.iter().map(Self::row_to_user).collect();

        Ok(Some(ConversationWithMembers {
            conversation,
            members,
        }))
    }

    async fn find_recent_visible_messages(
        &self,
        user_id: &str,
        content_contains: &str,
        limit: u32,
    ) -> Result<Vec<String>> {
        let pattern = format!("%{}%", content_contains.to_lowercase());

        let rows = sqlx::query(
            r#"
            SELECT m.content
            FROM messages m
            JOIN conversation_members cm
              ON cm.conversation_id = m.conversation_id
             AND cm.user_id = ?
             AND cm.left_at IS NULL
            WHERE m.deleted_at IS NULL AND LOWER(m.content) LIKE ?
            ORDER BY m.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("content")).collect())
    }

    async fn page_non_deleted_messages(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<MessageWithRelations>> {
        let rows = sqlx::query(
            r#"
            SELECT m.id, m.conversation_id, m.sender_id, m.content, m.kind,
                   m.reply_to_id, m.created_at, m.edited_at, m.deleted_at,
                   u.id AS sender_pk, u.username, u.display_name, u.bio,
                   u.avatar_url, u.is_active,
                   u.created_at AS sender_created_at, u.updated_at AS sender_updated_at
            FROM messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.deleted_at IS NULL
            ORDER BY m.created_at ASC, m.id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            let message = Self::row_to_message(&row);
            let sender = User {
                id: row.get("sender_pk"),
                username: row.get("username"),
                display_name: row.get("display_name"),
                bio: row.get("bio"),
                avatar_url: row.get("avatar_url"),
                is_active: row.get("is_active"),
                created_at: row.get("sender_created_at"),
                updated_at: row.get("sender_updated_at"),
            };
            result.push(self.assemble_relations(message, sender).await?);
        }

        Ok(result)
    }
}
