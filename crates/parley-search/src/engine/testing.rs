//! Recording engine double for tests
//!
//! Records every call, keeps documents in a map keyed by (index, id) so
//! upsert semantics match the real engine, and serves canned search
//! responses. A failure message can be injected to exercise error paths.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Error, Result};

use super::types::{IndexSettings, IndexStats, SearchRequest, SearchResponse};
use super::SearchEngine;

#[derive(Debug, Clone)]
pub(crate) enum EngineCall {
    EnsureIndex { uid: String },
    ApplySettings { uid: String },
    Search { uid: String, request: SearchRequest },
    AddOrReplace { uid: String, ids: Vec<String> },
    AddOrUpdate { uid: String, ids: Vec<String> },
    DeleteDocument { uid: String, id: String },
    DeleteAll { uid: String },
    Stats { uid: String },
}

#[derive(Default)]
pub(crate) struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    responses: Mutex<HashMap<String, SearchResponse>>,
    documents: Mutex<HashMap<(String, String), Value>>,
    stats: Mutex<HashMap<String, IndexStats>>,
    fail_message: Mutex<Option<String>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this response for searches against the given index
    pub fn set_response(&self, uid: &str, response: SearchResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(uid.to_string(), response);
    }

    /// Serve these stats for the given index
    pub fn set_stats(&self, uid: &str, stats: IndexStats) {
        self.stats.lock().unwrap().insert(uid.to_string(), stats);
    }

    /// Make every subsequent call fail with an engine error
    pub fn set_failure(&self, message: &str) {
        *self.fail_message.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<(String, SearchRequest)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Search { uid, request } => Some((uid, request)),
                _ => None,
            })
            .collect()
    }

    pub fn batch_sizes(&self, for_uid: &str) -> Vec<usize> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::AddOrReplace { uid, ids } if uid == for_uid => Some(ids.len()),
                _ => None,
            })
            .collect()
    }

    pub fn document(&self, uid: &str, id: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap()
            .get(&(uid.to_string(), id.to_string()))
            .cloned()
    }

    pub fn document_count(&self, uid: &str) -> usize {
        self.documents
            .lock()
            .unwrap()
            .keys()
            .filter(|(index, _)| index == uid)
            .count()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn maybe_fail(&self) -> Result<()> {
        if let Some(message) = self.fail_message.lock().unwrap().clone() {
            return Err(Error::Engine {
                status: 500,
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SearchEngine for RecordingEngine {
    async fn ensure_index(&self, uid: &str, _primary_key: &str) -> Result<()> {
        self.record(EngineCall::EnsureIndex {
            uid: uid.to_string(),
        });
        self.maybe_fail()
    }

    async fn apply_settings(&self, uid: &str, _settings: &IndexSettings) -> Result<()> {
        self.record(EngineCall::ApplySettings {
            uid: uid.to_string(),
        });
        self.maybe_fail()
    }

    async fn search(&self, uid: &str, request: &SearchRequest) -> Result<SearchResponse> {
        self.record(EngineCall::Search {
            uid: uid.to_string(),
            request: request.clone(),
        });
        self.maybe_fail()?;

        let canned = self.responses.lock().unwrap().get(uid).cloned();
        Ok(canned.unwrap_or_else(|| SearchResponse {
            hits: Vec::new(),
            query: request.q.clone(),
            processing_time_ms: 1,
            limit: request.limit.unwrap_or(20),
            offset: request.offset.unwrap_or(0),
            estimated_total_hits: 0,
        }))
    }

    async fn add_or_replace(&self, uid: &str, documents: Vec<Value>) -> Result<()> {
        let ids: Vec<String> = documents
            .iter()
            .filter_map(|doc| doc.get("id").and_then(Value::as_str).map(String::from))
            .collect();
        self.record(EngineCall::AddOrReplace {
            uid: uid.to_string(),
            ids: ids.clone(),
        });
        self.maybe_fail()?;

        let mut store = self.documents.lock().unwrap();
        for doc in documents {
            if let Some(id) = doc.get("id").and_then(Value::as_str) {
                store.insert((uid.to_string(), id.to_string()), doc.clone());
            }
        }
        Ok(())
    }

    async fn add_or_update(&self, uid: &str, documents: Vec<Value>) -> Result<()> {
        let ids: Vec<String> = documents
            .iter()
            .filter_map(|doc| doc.get("id").and_then(Value::as_str).map(String::from))
            .collect();
        self.record(EngineCall::AddOrUpdate {
            uid: uid.to_string(),
            ids,
        });
        self.maybe_fail()?;

        let mut store = self.documents.lock().unwrap();
        for doc in documents {
            let Some(id) = doc.get("id").and_then(Value::as_str).map(String::from) else {
                continue;
            };
            match store.entry((uid.to_string(), id)) {
                // Merge fields into the existing document
                Entry::Occupied(mut slot) => {
                    if let (Value::Object(existing), Value::Object(incoming)) =
                        (slot.get_mut(), doc)
                    {
                        for (field, value) in incoming {
                            existing.insert(field, value);
                        }
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(doc);
                }
            }
        }
        Ok(())
    }

    async fn delete_document(&self, uid: &str, id: &str) -> Result<()> {
        self.record(EngineCall::DeleteDocument {
            uid: uid.to_string(),
            id: id.to_string(),
        });
        self.maybe_fail()?;

        self.documents
            .lock()
            .unwrap()
            .remove(&(uid.to_string(), id.to_string()));
        Ok(())
    }

    async fn delete_all(&self, uid: &str) -> Result<()> {
        self.record(EngineCall::DeleteAll {
            uid: uid.to_string(),
        });
        self.maybe_fail()?;

        self.documents
            .lock()
            .unwrap()
            .retain(|(index, _), _| index != uid);
        Ok(())
    }

    async fn stats(&self, uid: &str) -> Result<IndexStats> {
        self.record(EngineCall::Stats {
            uid: uid.to_string(),
        });
        self.maybe_fail()?;

        let canned = self.stats.lock().unwrap().get(uid).cloned();
        Ok(canned.unwrap_or_else(|| IndexStats {
            number_of_documents: self.document_count(uid) as u64,
            is_indexing: false,
        }))
    }
}
