//! Retrieval and embedding configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chunk::ModalityFilter;
use crate::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::embedding::DEFAULT_BATCH_SIZE;
use crate::error::{RetrievalError, Result};

/// Default number of results per query
pub const DEFAULT_TOP_K: usize = 4;

pub const DEFAULT_EMBEDDING_MODEL: &str = "jina-embeddings-v4";
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.jina.ai/v1/embeddings";
pub const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(60);

/// Chunking and query settings for one retrieval session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Window size in whitespace-separated words
    pub chunk_size: usize,
    /// Words shared by neighbouring windows
    pub chunk_overlap: usize,
    /// Texts per embedding request
    pub batch_size: usize,
    /// Results returned per query
    pub top_k: usize,
    pub modality_filter: ModalityFilter,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            batch_size: DEFAULT_BATCH_SIZE,
            top_k: DEFAULT_TOP_K,
            modality_filter: ModalityFilter::Both,
        }
    }
}

/// Remote embedding provider settings
#[derive(Clone)]
pub struct EmbedderConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl fmt::Debug for EmbedderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedderConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            endpoint: DEFAULT_EMBEDDING_ENDPOINT.to_string(),
            timeout: DEFAULT_EMBEDDING_TIMEOUT,
        }
    }
}

impl EmbedderConfig {
    /// Read settings from the process environment:
    /// - `JINA_API_KEY`
    /// - `MMRAG_EMBEDDING_MODEL`
    /// - `MMRAG_EMBEDDING_ENDPOINT`
    /// - `MMRAG_EMBEDDING_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(key) = lookup("JINA_API_KEY") {
            config.api_key = key.trim().to_string();
        }

        if let Some(model) = lookup("MMRAG_EMBEDDING_MODEL").filter(|m| !m.trim().is_empty()) {
            log::info!("Using MMRAG_EMBEDDING_MODEL: {}", model.trim());
            config.model = model.trim().to_string();
        }

        if let Some(endpoint) =
            lookup("MMRAG_EMBEDDING_ENDPOINT").filter(|e| !e.trim().is_empty())
        {
            log::info!("Using MMRAG_EMBEDDING_ENDPOINT: {}", endpoint.trim());
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(raw) = lookup("MMRAG_EMBEDDING_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => log::warn!(
                    "MMRAG_EMBEDDING_TIMEOUT_SECS set but not a positive integer: {}",
                    raw
                ),
            }
        }

        config
    }

    /// The API key, or a configuration error when it is blank
    pub fn api_key(&self) -> Result<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(RetrievalError::config(
                "JINA_API_KEY is required for remote embeddings",
            ));
        }
        Ok(key)
    }
}
