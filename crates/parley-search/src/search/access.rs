//! Access control resolution
//!
//! Every search is narrowed to the slice of data the requesting user may
//! see before the engine is involved. The scope is recomputed from
//! membership/blocking state on every request and never cached.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::storage::EntityReader;

/// The conversations a user is allowed to search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessScope {
    /// Restrict to these conversation ids
    Member(Vec<String>),
    /// The user has no active conversations; callers return an empty
    /// result without touching the engine
    Empty,
}

/// Resolves per-request authorization from relational state
#[derive(Clone)]
pub struct AccessResolver {
    reader: Arc<dyn EntityReader>,
}

impl AccessResolver {
    pub fn new(reader: Arc<dyn EntityReader>) -> Self {
        Self { reader }
    }

    /// Scope for message search
    ///
    /// With a target conversation: active membership is required, and its
    /// absence is an authorization failure, not an empty result. Without
    /// one: all active memberships; none at all short-circuits to `Empty`.
    pub async fn message_scope(
        &self,
        user_id: &str,
        conversation_id: Option<&str>,
    ) -> Result<AccessScope> {
        if let Some(conversation_id) = conversation_id {
            return match self
                .reader
                .find_active_membership(user_id, conversation_id)
                .await?
            {
                Some(_) => Ok(AccessScope::Member(vec![conversation_id.to_string()])),
                None => Err(Error::Forbidden(format!(
                    "not a member of conversation '{}'",
                    conversation_id
                ))),
            };
        }

        self.membership_scope(user_id).await
    }

    /// Scope for conversation search: always the full active membership set
    pub async fn conversation_scope(&self, user_id: &str) -> Result<AccessScope> {
        self.membership_scope(user_id).await
    }

    /// User ids the requester has blocked, for exclusion clauses
    pub async fn blocked_user_ids(&self, user_id: &str) -> Result<Vec<String>> {
        self.reader.find_blocked_user_ids(user_id).await
    }

    async fn membership_scope(&self, user_id: &str) -> Result<AccessScope> {
        let ids = self.reader.find_active_conversation_ids(user_id).await?;
        if ids.is_empty() {
            Ok(AccessScope::Empty)
        } else {
            Ok(AccessScope::Member(ids))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteEntityReader;
    use crate::testing::{fixtures, test_pool};

    async fn resolver() -> (AccessResolver, sqlx::SqlitePool) {
        let pool = test_pool().await;
        let reader = Arc::new(SqliteEntityReader::new(pool.clone()));
        (AccessResolver::new(reader), pool)
    }

    #[tokio::test]
    async fn test_scoped_search_requires_membership() {
        let (resolver, pool) = resolver().await;
        fixtures::user(&pool, "u1", "alice", "Alice").await;
        fixtures::conversation(&pool, "c1", "group", "General").await;

        let result = resolver.message_scope("u1", Some("c1")).await;
        let err = result.expect_err("expected authorization failure");
        assert!(err.is_forbidden());
    }

    #[tokio::test]
    async fn test_scoped_search_with_membership() {
        let (resolver, pool) = resolver().await;
        fixtures::user(&pool, "u1", "alice", "Alice").await;
        fixtures::conversation(&pool, "c1", "group", "General").await;
        fixtures::member(&pool, "c1", "u1").await;

        let scope = resolver.message_scope("u1", Some("c1")).await.unwrap();
        assert_eq!(scope, AccessScope::Member(vec!["c1".to_string()]));
    }

    #[tokio::test]
    async fn test_no_memberships_is_empty_scope_not_error() {
        let (resolver, pool) = resolver().await;
        fixtures::user(&pool, "u1", "alice", "Alice").await;

        let scope = resolver.message_scope("u1", None).await.unwrap();
        assert_eq!(scope, AccessScope::Empty);

        let scope = resolver.conversation_scope("u1").await.unwrap();
        assert_eq!(scope, AccessScope::Empty);
    }

    #[tokio::test]
    async fn test_unscoped_search_collects_memberships() {
        let (resolver, pool) = resolver().await;
        fixtures::user(&pool, "u1", "alice", "Alice").await;
        fixtures::conversation(&pool, "c1", "group", "First").await;
        fixtures::conversation(&pool, "c2", "dm", "").await;
        fixtures::member(&pool, "c1", "u1").await;
        fixtures::member(&pool, "c2", "u1").await;

        let scope = resolver.message_scope("u1", None).await.unwrap();
        assert_eq!(
            scope,
            AccessScope::Member(vec!["c1".to_string(), "c2".to_string()])
        );
    }

    #[tokio::test]
    async fn test_blocked_ids_empty_without_blocks() {
        let (resolver, pool) = resolver().await;
        fixtures::user(&pool, "u1", "alice", "Alice").await;

        let blocked = resolver.blocked_user_ids("u1").await.unwrap();
        assert!(blocked.is_empty());
    }
}
