//! Error types for the mmrag command-line session.

use std::path::PathBuf;

use mmrag_retrieval::RetrievalError;
use thiserror::Error;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unsupported file type: {} (use .txt or .pdf)", .0.display())]
    UnsupportedFileType(PathBuf),

    #[error("Failed to read PDF {}: {detail}", .path.display())]
    Pdf { path: PathBuf, detail: String },

    #[error("Provide at least one input file (--text or --caption)")]
    NoInput,

    #[error("No chunks were created. Check your files.")]
    NoChunks,

    #[error("Local embeddings are not available in this build (enable the local-embeddings feature)")]
    LocalEmbeddingsUnavailable,

    #[error("{failed} of {total} queries failed")]
    QueriesFailed { failed: usize, total: usize },

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
