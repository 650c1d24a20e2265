//! Embedding providers
//!
//! The store only depends on the [`EmbeddingProvider`] capability. Remote
//! (Jina), cached and on-device (fastembed) implementations live here.

mod cache;
mod jina;
#[cfg(feature = "local-embeddings")]
mod local;

use async_trait::async_trait;

use crate::error::Result;

pub use cache::{CachedEmbedder, DEFAULT_CACHE_CAPACITY};
pub use jina::JinaEmbedder;
#[cfg(feature = "local-embeddings")]
pub use local::LocalEmbedder;

/// Default number of texts sent to a provider per request
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Text → vector capability
///
/// Implementations return one vector per non-blank input, in input order.
/// Batching is a transport detail: whatever order a batch comes back in,
/// the concatenated output must line up with the inputs.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>>;

    /// Model identifier, for logs and stats
    fn model_name(&self) -> &str;
}

/// Inputs a provider actually embeds
pub(crate) fn non_blank(texts: &[String]) -> Vec<String> {
    texts
        .iter()
        .filter(|t| !t.trim().is_empty())
        .cloned()
        .collect()
}
