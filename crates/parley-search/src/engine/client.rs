//! MeiliSearch HTTP client
//!
//! Thin async client over the engine's REST API. Non-success responses map
//! to `Error::Engine` with the engine's own message; transport failures
//! surface as `Error::EngineTransport`. No retries here - retry policy
//! belongs to the indexing queue.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Error, Result};

use super::types::{EngineErrorBody, IndexSettings, IndexStats, SearchRequest, SearchResponse};
use super::SearchEngine;

/// HTTP client for a MeiliSearch-compatible engine
#[derive(Clone)]
pub struct MeiliClient {
    http_client: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for MeiliClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeiliClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.api_key.is_some())
            .finish()
    }
}

/// Builder for creating a MeiliClient
pub struct MeiliClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for MeiliClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeiliClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: None,
        }
    }

    /// Set the engine base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the API key used as a bearer token
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<MeiliClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::InvalidInput("engine base URL is required".to_string()))?;

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(self.timeout_secs.unwrap_or(30)))
            .build()
            .map_err(Error::EngineTransport)?;

        Ok(MeiliClient {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key,
        })
    }
}

impl MeiliClient {
    /// Create a client from the engine configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut builder = MeiliClientBuilder::new()
            .base_url(&config.base_url)
            .timeout_secs(config.timeout_secs);
        if let Some(key) = &config.api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }

    /// Create a new builder
    pub fn builder() -> MeiliClientBuilder {
        MeiliClientBuilder::new()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Map a non-success response to `Error::Engine`
    async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<EngineErrorBody>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => status
                .canonical_reason()
                .unwrap_or("unknown engine error")
                .to_string(),
        };

        Err(Error::Engine {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SearchEngine for MeiliClient {
    async fn ensure_index(&self, uid: &str, primary_key: &str) -> Result<()> {
        let lookup = self
            .request(self.http_client.get(self.url(&format!("/indexes/{}", uid))))
            .send()
            .await?;

        if lookup.status() == StatusCode::NOT_FOUND {
            debug!(index = uid, "Creating search index");
            let response = self
                .request(self.http_client.post(self.url("/indexes")))
                .json(&serde_json::json!({ "uid": uid, "primaryKey": primary_key }))
                .send()
                .await?;
            self.check(response).await?;
        } else {
            self.check(lookup).await?;
        }

        Ok(())
    }

    async fn apply_settings(&self, uid: &str, settings: &IndexSettings) -> Result<()> {
        let response = self
            .request(
                self.http_client
                    .patch(self.url(&format!("/indexes/{}/settings", uid))),
            )
            .json(settings)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn search(&self, uid: &str, request: &SearchRequest) -> Result<SearchResponse> {
        debug!(index = uid, query = %request.q, "Executing engine search");

        let response = self
            .request(
                self.http_client
                    .post(self.url(&format!("/indexes/{}/search", uid))),
            )
            .json(request)
            .send()
            .await?;

        let response = self.check(response).await?;
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed)
    }

    async fn add_or_replace(&self, uid: &str, documents: Vec<Value>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let response = self
            .request(
                self.http_client
                    .post(self.url(&format!("/indexes/{}/documents", uid))),
            )
            .json(&documents)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn add_or_update(&self, uid: &str, documents: Vec<Value>) -> Result<()> {
        if documents.is_empty() {
            return Ok(());
        }

        let response = self
            .request(
                self.http_client
                    .put(self.url(&format!("/indexes/{}/documents", uid))),
            )
            .json(&documents)
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete_document(&self, uid: &str, id: &str) -> Result<()> {
        let response = self
            .request(
                self.http_client
                    .delete(self.url(&format!("/indexes/{}/documents/{}", uid, id))),
            )
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn delete_all(&self, uid: &str) -> Result<()> {
        let response = self
            .request(
                self.http_client
                    .delete(self.url(&format!("/indexes/{}/documents", uid))),
            )
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    async fn stats(&self, uid: &str) -> Result<IndexStats> {
        let response = self
            .request(
                self.http_client
                    .get(self.url(&format!("/indexes/{}/stats", uid))),
            )
            .send()
            .await?;

        let response = self.check(response).await?;
        let stats: IndexStats = response.json().await?;
        Ok(stats)
    }
}
