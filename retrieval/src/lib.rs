//! Multimodal retrieval core
//!
//! In-memory retrieval index over text documents and image captions:
//! overlapping word-window chunking, pluggable embedding providers,
//! cosine similarity search with modality filtering, and a lexical
//! rerank pass before results reach an answer generator.
//!
//! ## Features
//!
//! - **Positional alignment** - a chunk's insertion order is its row in the embedding matrix
//! - **Cosine via inner product** - rows and queries are L2-normalized before a flat scan
//! - **Over-fetch then filter** - 4x candidates absorb modality filtering losses
//! - **Deterministic rerank** - capped token-overlap bonus with a stable sort
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use mmrag_retrieval::{EmbedderConfig, JinaEmbedder, ModalityFilter, Reranker, RetrievalStore};
//!
//! let embedder = JinaEmbedder::from_config(&EmbedderConfig::from_env())?;
//! let mut store = RetrievalStore::new(Arc::new(embedder));
//!
//! store.add_text(&report_text, "report.txt");
//! store.add_image_caption(&caption, "chart.png");
//! store.build().await?;
//!
//! let hits = store.search("q3 revenue", 4, ModalityFilter::Both).await?;
//! let ranked = Reranker::default().rank("q3 revenue", &hits);
//! ```

pub mod chunk;
pub mod chunker;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod index;
pub mod rerank;
pub mod store;

// Re-exports for convenience
pub use chunk::{Chunk, Modality, ModalityFilter};
pub use chunker::{chunk_text, ChunkSplitter};
pub use config::{EmbedderConfig, RetrievalConfig};
pub use context::{build_prompt, format_context_block, ChatTurn, GroundedPrompt, Role, NO_ANSWER};
pub use embedding::{CachedEmbedder, EmbeddingProvider, JinaEmbedder};
#[cfg(feature = "local-embeddings")]
pub use embedding::LocalEmbedder;
pub use error::{Result, RetrievalError};
pub use index::{EmbeddingMatrix, Neighbor, VectorIndex};
pub use rerank::Reranker;
pub use store::{IndexStats, RetrievalStore};
