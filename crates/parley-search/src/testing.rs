//! Shared test fixtures
//!
//! Seeds the in-memory schema with chat entities. Message timestamps are
//! assigned from a process-wide monotonic counter so creation order is
//! deterministic regardless of wall-clock resolution.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::SqlitePool;

use crate::storage::Database;

/// Create a migrated in-memory pool
pub async fn test_pool() -> SqlitePool {
    let db = Database::in_memory()
        .await
        .expect("Failed to create test database");
    db.pool().clone()
}

/// Opt-in tracing output while debugging a test
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("parley_search=debug")
        .try_init();
}

/// Monotonic timestamps, one second apart
fn next_timestamp() -> DateTime<Utc> {
    static TICK: AtomicI64 = AtomicI64::new(0);
    let tick = TICK.fetch_add(1, Ordering::Relaxed);
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(tick)
}

pub mod fixtures {
    use super::*;

    pub async fn user(pool: &SqlitePool, id: &str, username: &str, display_name: &str) {
        let now = next_timestamp();
        sqlx::query(
            "INSERT INTO users (id, username, display_name, bio, is_active, created_at, updated_at) VALUES (?, ?, ?, '', 1, ?, ?)",
        )
        .bind(id)
        .bind(username)
        .bind(display_name)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("Failed to insert user");
    }

    pub async fn deactivate_user(pool: &SqlitePool, id: &str) {
        sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ?")
            .bind(next_timestamp())
            .bind(id)
            .execute(pool)
            .await
            .expect("Failed to deactivate user");
    }

    pub async fn conversation(pool: &SqlitePool, id: &str, kind: &str, title: &str) {
        let now = next_timestamp();
        sqlx::query(
            "INSERT INTO conversations (id, kind, title, is_active, created_at, updated_at) VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(id)
        .bind(kind)
        .bind(title)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("Failed to insert conversation");
    }

    pub async fn member(pool: &SqlitePool, conversation_id: &str, user_id: &str) {
        sqlx::query(
            "INSERT INTO conversation_members (conversation_id, user_id, role, joined_at) VALUES (?, ?, 'member', ?)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(next_timestamp())
        .execute(pool)
        .await
        .expect("Failed to insert membership");
    }

    pub async fn leave(pool: &SqlitePool, conversation_id: &str, user_id: &str) {
        sqlx::query(
            "UPDATE conversation_members SET left_at = ? WHERE conversation_id = ? AND user_id = ?",
        )
        .bind(next_timestamp())
        .bind(conversation_id)
        .bind(user_id)
        .execute(pool)
        .await
        .expect("Failed to end membership");
    }

    pub async fn message(
        pool: &SqlitePool,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
    ) {
        message_with_kind(pool, id, conversation_id, sender_id, content, "text").await;
    }

    pub async fn message_with_kind(
        pool: &SqlitePool,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
        kind: &str,
    ) {
        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, content, kind, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(kind)
        .bind(next_timestamp())
        .execute(pool)
        .await
        .expect("Failed to insert message");
    }

    pub async fn reply(
        pool: &SqlitePool,
        id: &str,
        conversation_id: &str,
        sender_id: &str,
        content: &str,
        reply_to_id: &str,
    ) {
        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, content, kind, reply_to_id, created_at) VALUES (?, ?, ?, ?, 'text', ?, ?)",
        )
        .bind(id)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(reply_to_id)
        .bind(next_timestamp())
        .execute(pool)
        .await
        .expect("Failed to insert reply");
    }

    pub async fn delete_message(pool: &SqlitePool, id: &str) {
        sqlx::query("UPDATE messages SET deleted_at = ? WHERE id = ?")
            .bind(next_timestamp())
            .bind(id)
            .execute(pool)
            .await
            .expect("Failed to soft-delete message");
    }

    pub async fn attachment(
        pool: &SqlitePool,
        id: &str,
        message_id: &str,
        file_name: &str,
        mime_type: &str,
    ) {
        sqlx::query(
            "INSERT INTO attachments (id, message_id, file_name, mime_type, size_bytes, created_at) VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(id)
        .bind(message_id)
        .bind(file_name)
        .bind(mime_type)
        .bind(next_timestamp())
        .execute(pool)
        .await
        .expect("Failed to insert attachment");
    }

    pub async fn block(pool: &SqlitePool, blocker_id: &str, blocked_id: &str) {
        sqlx::query(
            "INSERT INTO user_blocks (blocker_id, blocked_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(blocker_id)
        .bind(blocked_id)
        .bind(next_timestamp())
        .execute(pool)
        .await
        .expect("Failed to insert block");
    }

    pub async fn contact(pool: &SqlitePool, user_id: &str, contact_id: &str, status: &str) {
        let now = next_timestamp();
        sqlx::query(
            "INSERT INTO user_contacts (user_id, contact_id, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(contact_id)
        .bind(status)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("Failed to insert contact");
    }
}
