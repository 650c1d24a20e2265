//! Retrieval store
//!
//! Owns the chunk sequence and, once built, the normalized vector index.
//! A chunk's position in the sequence is its row in the index, from the
//! first `add_*` call through every search.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, Modality, ModalityFilter};
use crate::chunker::ChunkSplitter;
use crate::config::RetrievalConfig;
use crate::embedding::{EmbeddingProvider, DEFAULT_BATCH_SIZE};
use crate::error::{RetrievalError, Result};
use crate::index::{ensure_finite, l2_normalize, EmbeddingMatrix, VectorIndex};

/// Candidates fetched per requested result, to absorb modality filtering
pub const OVERFETCH_FACTOR: usize = 4;

/// Number of nearest neighbours to scan for a `top_k` request
pub fn scan_depth(top_k: usize, total_chunks: usize) -> usize {
    top_k
        .saturating_mul(OVERFETCH_FACTOR)
        .max(top_k)
        .min(total_chunks)
}

/// Summary of a store's contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_chunks: usize,
    pub text_chunks: usize,
    pub image_chunks: usize,
    /// Vector width, once built
    pub dimension: Option<usize>,
    pub built_at: Option<DateTime<Utc>>,
}

struct BuiltIndex {
    index: VectorIndex,
    built_at: DateTime<Utc>,
}

/// In-memory flat retrieval index over text and image-caption chunks
///
/// Not internally synchronized: one store per session, `build` and
/// `search` never run at the same time.
pub struct RetrievalStore {
    embedder: Arc<dyn EmbeddingProvider>,
    splitter: ChunkSplitter,
    batch_size: usize,
    items: Vec<Chunk>,
    built: Option<BuiltIndex>,
}

impl RetrievalStore {
    /// Store with default chunking (300 words, 60 overlap)
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            splitter: ChunkSplitter::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            items: Vec::new(),
            built: None,
        }
    }

    pub fn with_config(embedder: Arc<dyn EmbeddingProvider>, config: &RetrievalConfig) -> Self {
        Self {
            splitter: ChunkSplitter::new(config.chunk_size, config.chunk_overlap),
            batch_size: config.batch_size.max(1),
            ..Self::new(embedder)
        }
    }

    pub fn with_splitter(mut self, splitter: ChunkSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Chunk document text and append it; returns the number of chunks added
    pub fn add_text(&mut self, text: &str, source: &str) -> usize {
        self.add_chunks(text, source, Modality::Text)
    }

    /// Chunk an image caption and append it; returns the number of chunks added
    pub fn add_image_caption(&mut self, caption: &str, source: &str) -> usize {
        self.add_chunks(caption, source, Modality::Image)
    }

    fn add_chunks(&mut self, text: &str, source: &str, modality: Modality) -> usize {
        let pieces = self.splitter.split(text);
        let added = pieces.len();
        self.items.extend(
            pieces
                .into_iter()
                .map(|piece| Chunk::new(piece, source, modality)),
        );

        if self.built.is_some() && added > 0 {
            log::warn!(
                "Added {} {} chunks from {} after build; they are not searchable until the next build()",
                added,
                modality,
                source
            );
        }
        added
    }

    /// Number of chunks accumulated so far
    pub fn total_chunks(&self) -> usize {
        self.items.len()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.items
    }

    pub fn is_built(&self) -> bool {
        self.built.is_some()
    }

    /// Normalized embedding matrix, once built
    pub fn embeddings(&self) -> Option<&EmbeddingMatrix> {
        self.built.as_ref().map(|b| b.index.vectors())
    }

    pub fn stats(&self) -> IndexStats {
        let image_chunks = self
            .items
            .iter()
            .filter(|c| c.modality == Modality::Image)
            .count();
        IndexStats {
            total_chunks: self.items.len(),
            text_chunks: self.items.len() - image_chunks,
            image_chunks,
            dimension: self.built.as_ref().map(|b| b.index.dimension()),
            built_at: self.built.as_ref().map(|b| b.built_at),
        }
    }

    /// Embed every chunk and (re)build the index from scratch
    ///
    /// All-or-nothing: on error the store keeps whatever index it had.
    pub async fn build(&mut self) -> Result<()> {
        if self.items.is_empty() {
            return Err(RetrievalError::EmptyIndex);
        }

        let texts: Vec<String> = self.items.iter().map(|c| c.text.clone()).collect();
        let vectors = self.embedder.embed(&texts, self.batch_size).await?;

        if vectors.len() != self.items.len() {
            return Err(RetrievalError::shape(format!(
                "expected {} vectors, provider returned {}",
                self.items.len(),
                vectors.len()
            )));
        }

        let mut matrix = EmbeddingMatrix::from_rows(vectors)?;
        matrix.normalize_rows();
        let dimension = matrix.dimension();

        let mut index = VectorIndex::new(dimension);
        index.add(&matrix)?;
        self.built = Some(BuiltIndex {
            index,
            built_at: Utc::now(),
        });

        log::info!(
            "Built index: {} chunks, {}d ({})",
            self.items.len(),
            dimension,
            self.embedder.model_name()
        );
        Ok(())
    }

    /// Top `top_k` chunks by cosine similarity, filtered by modality
    ///
    /// Scans `scan_depth(top_k, total_chunks)` neighbours and keeps those
    /// that pass the filter, so a heavily filtered query can return fewer
    /// than `top_k` results.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: ModalityFilter,
    ) -> Result<Vec<Chunk>> {
        let built = self.built.as_ref().ok_or(RetrievalError::NotBuilt)?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embed_query(query).await?;
        let scan_k = scan_depth(top_k, self.items.len());
        let candidates = built.index.search(&query_vector, scan_k)?;

        let mut results = Vec::with_capacity(top_k);
        for candidate in candidates {
            let Some(item) = self.items.get(candidate.position) else {
                log::warn!(
                    "Skipping out-of-range candidate {} ({} chunks)",
                    candidate.position,
                    self.items.len()
                );
                continue;
            };
            if !filter.matches(item.modality) {
                continue;
            }
            results.push(item.with_score(candidate.score));
            if results.len() >= top_k {
                break;
            }
        }

        log::debug!(
            "Search scanned {} candidates, kept {} (filter {}, top_k {})",
            scan_k,
            results.len(),
            filter,
            top_k
        );
        Ok(results)
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embedder.embed(&[query.to_string()], 1).await?;
        if vectors.len() != 1 {
            return Err(RetrievalError::shape(format!(
                "expected 1 query vector, provider returned {}",
                vectors.len()
            )));
        }
        let mut vector = vectors.remove(0);
        ensure_finite(&vector, "query vector")?;
        l2_normalize(&mut vector);
        Ok(vector)
    }
}
