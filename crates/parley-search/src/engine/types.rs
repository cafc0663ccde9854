//! Wire types for the MeiliSearch-compatible engine API
//!
//! Field names follow the engine's camelCase JSON convention.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A search request against one index
///
/// Entries in `filter` are ANDed by the engine; a single entry may encode
/// a disjunction with parentheses (see `search::filter`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_highlight: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes_to_crop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_length: Option<usize>,
}

impl SearchRequest {
    /// Create a request with the given query text
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            q: query.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_filters(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_sort(mut self, sort: Vec<String>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_highlight(mut self, attributes: Vec<String>) -> Self {
        self.attributes_to_highlight = attributes;
        self
    }

    pub fn with_crop(mut self, attributes: Vec<String>, length: usize) -> Self {
        self.attributes_to_crop = attributes;
        self.crop_length = Some(length);
        self
    }
}

/// A search response from one index
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub hits: Vec<Value>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub processing_time_ms: u64,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub estimated_total_hits: u64,
}

/// Per-index statistics
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default)]
    pub number_of_documents: u64,
    #[serde(default)]
    pub is_indexing: bool,
}

/// Index settings applied once at startup
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    pub searchable_attributes: Vec<String>,
    pub filterable_attributes: Vec<String>,
    pub sortable_attributes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranking_rules: Vec<String>,
}

/// Error payload returned by the engine on non-success responses
#[derive(Debug, Clone, Deserialize)]
pub struct EngineErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
}
