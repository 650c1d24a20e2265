//! On-device embeddings via fastembed (BGE-Small-EN-v1.5)

use std::sync::Arc;

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::{non_blank, EmbeddingProvider};
use crate::error::{RetrievalError, Result};

const MODEL_NAME: &str = "BAAI/bge-small-en-v1.5";

/// Local ONNX embedding model; inference runs on the blocking thread pool
pub struct LocalEmbedder {
    model: Arc<TextEmbedding>,
}

impl LocalEmbedder {
    /// Load the model, downloading it into the fastembed cache on first use
    pub fn new() -> Result<Self> {
        log::info!("Loading local embedding model {}", MODEL_NAME);
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::BGESmallENV15))
            .map_err(|e| RetrievalError::model(format!("Failed to load {MODEL_NAME}: {e}")))?;
        Ok(Self {
            model: Arc::new(model),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    async fn embed(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        let items = non_blank(texts);
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed(items, Some(batch_size.max(1))))
            .await
            .map_err(|e| RetrievalError::model(format!("Embedding task failed: {e}")))?
            .map_err(|e| RetrievalError::model(format!("Failed to encode texts: {e}")))
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}
