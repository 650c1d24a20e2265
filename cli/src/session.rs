//! Per-run retrieval session.
//!
//! Owns the store, the reranker and the conversation so far. Each run of
//! the CLI builds exactly one session; nothing is shared between runs.

use std::path::Path;
use std::time::Instant;

use mmrag_retrieval::{
    build_prompt, ChatTurn, Chunk, GroundedPrompt, ModalityFilter, Reranker, RetrievalConfig,
    RetrievalStore, NO_ANSWER,
};
use serde::Serialize;

use crate::error::{CliError, CliResult};
use crate::ingest::{extract_text_from_file, source_name};

/// Prior user/assistant exchanges included in each prompt.
pub const DEFAULT_MAX_HISTORY: usize = 4;

/// Per-query settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuerySettings {
    pub top_k: usize,
    pub modality_filter: ModalityFilter,
    pub max_history: usize,
}

impl From<&RetrievalConfig> for QuerySettings {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            top_k: config.top_k,
            modality_filter: config.modality_filter,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

/// Outcome of building the index.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub chunks: usize,
    pub text_chunks: usize,
    pub image_chunks: usize,
    pub dimension: usize,
    pub latency_secs: f64,
}

/// Retrieved, reranked context for one question.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query: String,
    pub contexts: Vec<Chunk>,
    /// Prompt for the answer generator; `None` when nothing was retrieved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<GroundedPrompt>,
    pub latency_secs: f64,
}

impl Answer {
    /// Reply to give without calling a generator, if any
    pub fn fallback(&self) -> Option<&'static str> {
        self.prompt.is_none().then_some(NO_ANSWER)
    }
}

pub struct Session {
    store: RetrievalStore,
    reranker: Reranker,
    settings: QuerySettings,
    history: Vec<ChatTurn>,
}

impl Session {
    pub fn new(store: RetrievalStore, settings: QuerySettings) -> Self {
        Self {
            store,
            reranker: Reranker::default(),
            settings,
            history: Vec::new(),
        }
    }

    pub fn store(&self) -> &RetrievalStore {
        &self.store
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    /// Chunk a text document into the store; returns chunks added.
    pub fn ingest_text_file(&mut self, path: &Path) -> CliResult<usize> {
        let text = extract_text_from_file(path)?;
        let source = source_name(path);
        let added = self.store.add_text(&text, &source);
        tracing::info!("Ingested {} text chunks from {}", added, source);
        Ok(added)
    }

    /// Chunk a saved image caption into the store; returns chunks added.
    pub fn ingest_caption_file(&mut self, path: &Path) -> CliResult<usize> {
        let caption = extract_text_from_file(path)?;
        let source = source_name(path);
        let added = self.store.add_image_caption(&caption, &source);
        tracing::info!("Ingested {} image chunks from {}", added, source);
        Ok(added)
    }

    pub async fn build(&mut self) -> CliResult<BuildSummary> {
        if self.store.total_chunks() == 0 {
            return Err(CliError::NoChunks);
        }

        let start = Instant::now();
        self.store.build().await?;
        let latency_secs = round_secs(start);

        let stats = self.store.stats();
        tracing::info!(
            "Index ready with {} chunks in {:.3} sec",
            stats.total_chunks,
            latency_secs
        );

        Ok(BuildSummary {
            chunks: stats.total_chunks,
            text_chunks: stats.text_chunks,
            image_chunks: stats.image_chunks,
            dimension: stats.dimension.unwrap_or_default(),
            latency_secs,
        })
    }

    /// Retrieve, rerank and assemble the grounded prompt for `query`.
    pub async fn ask(&mut self, query: &str) -> CliResult<Answer> {
        let start = Instant::now();
        let QuerySettings {
            top_k,
            modality_filter,
            max_history,
        } = self.settings;

        self.history.push(ChatTurn::user(query));
        let hits = self.store.search(query, top_k, modality_filter).await?;
        let contexts = self.reranker.rank_top(query, &hits, top_k);
        let prompt = build_prompt(query, &contexts, &self.history, max_history);

        if prompt.is_none() {
            self.history.push(ChatTurn::assistant(NO_ANSWER));
        }

        tracing::debug!(
            "Query {:?}: {} hits, {} contexts",
            query,
            hits.len(),
            contexts.len()
        );

        Ok(Answer {
            query: query.to_string(),
            contexts,
            prompt,
            latency_secs: round_secs(start),
        })
    }
}

fn round_secs(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 1000.0).round() / 1000.0
}
