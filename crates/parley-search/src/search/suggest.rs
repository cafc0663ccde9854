//! Search suggestions
//!
//! Blends tokens from the user's recent messages with matching contact
//! names. Suggestions are a non-critical enhancement: every failure in
//! this path degrades to an empty list and is logged, never propagated.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::model::Contact;
use crate::storage::EntityReader;

/// Queries shorter than this never touch the store
const MIN_QUERY_CHARS: usize = 2;

/// Default number of recent messages scanned for term candidates
const RECENT_SCAN_LIMIT: u32 = 50;

/// Cap on recent-term candidates
const MAX_RECENT_TERMS: usize = 3;

/// Cap on contact candidates
const MAX_CONTACTS: usize = 2;

/// Tokens longer than this are noise, not suggestions
const MAX_TOKEN_CHARS: usize = 20;

/// Where a suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Recent,
    Contact,
}

/// One completion candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    /// Contact metadata, present on `contact` suggestions only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Suggestion {
    fn recent(text: String) -> Self {
        Self {
            text,
            kind: SuggestionKind::Recent,
            user_id: None,
            name: None,
        }
    }

    fn contact(contact: &Contact) -> Self {
        Self {
            text: contact.name.clone(),
            kind: SuggestionKind::Contact,
            user_id: Some(contact.id.clone()),
            name: Some(contact.name.clone()),
        }
    }
}

/// Produces completion candidates for a partial query
#[derive(Clone)]
pub struct SuggestionEngine {
    reader: Arc<dyn EntityReader>,
    scan_limit: u32,
}

impl SuggestionEngine {
    pub fn new(reader: Arc<dyn EntityReader>) -> Self {
        Self {
            reader,
            scan_limit: RECENT_SCAN_LIMIT,
        }
    }

    /// Override how many recent messages are scanned (config-driven)
    pub fn with_scan_limit(mut self, scan_limit: u32) -> Self {
        self.scan_limit = scan_limit;
        self
    }

    /// Suggestions for a partial query, recent terms first
    ///
    /// Returns an empty list for queries under two characters without any
    /// store access, and degrades to an empty list on any failure.
    pub async fn suggestions(
        &self,
        user_id: &str,
        partial_query: &str,
        limit: usize,
    ) -> Vec<Suggestion> {
        if partial_query.chars().count() < MIN_QUERY_CHARS || limit == 0 {
            return Vec::new();
        }

        match self.collect(user_id, partial_query, limit).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                warn!(user_id, error = %e, "Suggestion lookup failed; returning none");
                Vec::new()
            }
        }
    }

    async fn collect(
        &self,
        user_id: &str,
        partial_query: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>> {
        let query = partial_query.to_lowercase();

        let contents = self
            .reader
            .find_recent_visible_messages(user_id, partial_query, self.scan_limit)
            .await?;
        let mut suggestions: Vec<Suggestion> = recent_terms(&contents, &query)
            .into_iter()
            .map(Suggestion::recent)
            .collect();

        let contacts = self
            .reader
            .find_accepted_contacts(user_id, partial_query)
            .await?;
        suggestions.extend(contacts.iter().take(MAX_CONTACTS).map(Suggestion::contact));

        suggestions.truncate(limit);
        Ok(suggestions)
    }
}

/// Extract prefix-matching tokens from message contents, newest first
///
/// Tokens are lower-cased whitespace splits stripped of non-word
/// characters; kept when they extend the query and stay within the length
/// cap. First occurrence wins.
fn recent_terms(contents: &[String], query: &str) -> Vec<String> {
    let query_chars = query.chars().count();
    let mut seen = HashSet::new();
    let mut terms = Vec::new();

    for content in contents {
        for raw in content.to_lowercase().split_whitespace() {
            let token: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_')
                .collect();

            let token_chars = token.chars().count();
            if token.starts_with(query)
                && token_chars > query_chars
                && token_chars <= MAX_TOKEN_CHARS
                && seen.insert(token.clone())
            {
                terms.push(token);
                if terms.len() == MAX_RECENT_TERMS {
                    return terms;
                }
            }
        }
    }

    terms
}
