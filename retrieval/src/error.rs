//! Error types for mmrag-retrieval

use thiserror::Error;

/// Errors that can occur while building or querying the retrieval index
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// `build()` called with no accumulated chunks
    #[error("No chunks available to build index")]
    EmptyIndex,

    /// Provider response was not a well-formed, non-empty matrix
    #[error("Invalid embeddings shape from provider: {0}")]
    InvalidEmbeddingShape(String),

    /// Search or index access before a successful build
    #[error("Index is not built")]
    NotBuilt,

    /// Network or protocol failure from the embedding provider
    #[error("Embedding provider error{}: {detail}", status_suffix(.status))]
    ProviderTransport {
        status: Option<u16>,
        detail: String,
    },

    /// Unknown modality or modality filter name
    #[error("Invalid modality: {0} (expected one of: both, text, image)")]
    InvalidModality(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local model loading or inference error
    #[error("Model error: {0}")]
    Model(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl RetrievalError {
    /// Create an invalid embedding shape error
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::InvalidEmbeddingShape(msg.into())
    }

    /// Create a provider transport error
    pub fn transport(status: Option<u16>, detail: impl Into<String>) -> Self {
        Self::ProviderTransport {
            status,
            detail: detail.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }
}

impl From<reqwest::Error> for RetrievalError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.status().map(|s| s.as_u16()), err.to_string())
    }
}

/// Result type for retrieval operations
pub type Result<T> = std::result::Result<T, RetrievalError>;
