//! Jina embeddings over HTTP

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::{non_blank, EmbeddingProvider};
use crate::config::EmbedderConfig;
use crate::error::{RetrievalError, Result};

/// Remote embedding provider for Jina's `/v1/embeddings` endpoint
pub struct JinaEmbedder {
    client: reqwest::Client,
    api_key: Secret<String>,
    endpoint: String,
    model: String,
}

impl JinaEmbedder {
    /// Build a provider from config; fails when no API key is configured
    pub fn from_config(config: &EmbedderConfig) -> Result<Self> {
        let api_key = config.api_key()?.to_string();
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        log::info!(
            "Jina embedder ready (model {}, endpoint {}, timeout {}s)",
            config.model,
            config.endpoint,
            config.timeout.as_secs()
        );

        Ok(Self {
            client,
            api_key: Secret::new(api_key),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    /// Provider with default model, endpoint and timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&EmbedderConfig {
            api_key: api_key.into(),
            ..EmbedderConfig::default()
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    async fn embed_one_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let req = EmbeddingRequest {
            model: &self.model,
            input: batch,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.as_u16() >= 400 {
            return Err(RetrievalError::transport(Some(status.as_u16()), body));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body).map_err(|e| {
            RetrievalError::transport(
                Some(status.as_u16()),
                format!("malformed embedding response: {e}"),
            )
        })?;

        Ok(into_input_order(parsed.data))
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

/// Sort a batch response by its per-item index
fn into_input_order(mut data: Vec<EmbeddingData>) -> Vec<Vec<f32>> {
    data.sort_by_key(|d| d.index);
    data.into_iter().map(|d| d.embedding).collect()
}

#[async_trait]
impl EmbeddingProvider for JinaEmbedder {
    async fn embed(&self, texts: &[String], batch_size: usize) -> Result<Vec<Vec<f32>>> {
        let items = non_blank(texts);
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = batch_size.max(1);
        let mut vectors = Vec::with_capacity(items.len());
        for (n, batch) in items.chunks(batch_size).enumerate() {
            log::debug!("Embedding batch {} ({} texts)", n, batch.len());
            vectors.extend(self.embed_one_batch(batch).await?);
        }

        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn embedder(server: &mockito::Server) -> JinaEmbedder {
        JinaEmbedder::new("test-key")
            .unwrap()
            .with_endpoint(format!("{}/v1/embeddings", server.url()))
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_into_input_order_sorts_by_index() {
        let data = vec![
            EmbeddingData { index: 2, embedding: vec![2.0] },
            EmbeddingData { index: 0, embedding: vec![0.0] },
            EmbeddingData { index: 1, embedding: vec![1.0] },
        ];
        assert_eq!(into_input_order(data), vec![vec![0.0], vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_new_requires_api_key() {
        assert!(matches!(
            JinaEmbedder::new("  "),
            Err(RetrievalError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_embed_reorders_shuffled_batches() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("POST", "/v1/embeddings")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "jina-embeddings-v4",
                "input": ["alpha", "beta"]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]})
                .to_string(),
            )
            .create_async()
            .await;
        let second = server
            .mock("POST", "/v1/embeddings")
            .match_body(Matcher::PartialJson(json!({"input": ["gamma"]})))
            .with_status(200)
            .with_body(json!({"data": [{"index": 0, "embedding": [0.5, 0.5]}]}).to_string())
            .create_async()
            .await;

        let vectors = embedder(&server)
            .embed(&strings(&["alpha", "  ", "beta", "gamma"]), 2)
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_embed_surfaces_http_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = embedder(&server)
            .embed(&strings(&["alpha"]), 8)
            .await
            .unwrap_err();

        match err {
            RetrievalError::ProviderTransport { status, detail } => {
                assert_eq!(status, Some(429));
                assert_eq!(detail, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_rejects_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = embedder(&server)
            .embed(&strings(&["alpha"]), 8)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::ProviderTransport { status: Some(200), .. }
        ));
    }

    #[tokio::test]
    async fn test_embed_blank_inputs_skip_network() {
        let server = mockito::Server::new_async().await;
        let vectors = embedder(&server)
            .embed(&strings(&["", "   "]), 8)
            .await
            .unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_embed_connection_refused_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let embedder = JinaEmbedder::new("test-key")
            .unwrap()
            .with_endpoint(format!("http://127.0.0.1:{port}/v1/embeddings"));

        let err = embedder.embed(&strings(&["alpha"]), 8).await.unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::ProviderTransport { status: None, .. }
        ));
    }
}
