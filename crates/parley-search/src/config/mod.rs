//! Configuration for the search subsystem

use std::env;

use serde::{Deserialize, Serialize};

/// Default MeiliSearch endpoint for local development
const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:7700";

/// Search subsystem configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub engine: EngineConfig,
    /// Page size for the bulk message reindex job
    pub bulk_batch_size: usize,
    /// How many recent messages the suggestion engine scans
    pub suggestion_scan_limit: u32,
}

/// Connection settings for the external search engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub base_url: String,
    /// API key. Never persisted - resolved from the environment only.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            bulk_batch_size: 1000,
            suggestion_scan_limit: 50,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENGINE_URL.to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl SearchConfig {
    /// Build a configuration from the environment, falling back to defaults
    ///
    /// Recognized variables: `PARLEY_SEARCH_URL`, `PARLEY_SEARCH_KEY`,
    /// `PARLEY_SEARCH_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("PARLEY_SEARCH_URL") {
            config.engine.base_url = url;
        }
        config.engine.api_key = env::var("PARLEY_SEARCH_KEY").ok();
        if let Some(secs) = env::var("PARLEY_SEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.engine.timeout_secs = secs;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.engine.base_url, DEFAULT_ENGINE_URL);
        assert_eq!(config.bulk_batch_size, 1000);
        assert_eq!(config.suggestion_scan_limit, 50);
        assert!(config.engine.api_key.is_none());
    }

    #[test]
    fn test_api_key_never_serialized() {
        let mut config = EngineConfig::default();
        config.api_key = Some("secret".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
