//! mmrag command-line session
//!
//! Ingests text documents and saved image captions into a retrieval store,
//! builds the index once, then answers queries with reranked, grounded
//! context ready for an answer generator.

pub mod error;
pub mod ingest;
pub mod output;
pub mod session;

pub use error::{CliError, CliResult};
pub use session::{Answer, BuildSummary, QuerySettings, Session};

/// Crates whose events the binary logs by default
const LOG_TARGETS: [&str; 3] = ["mmrag", "mmrag_cli", "mmrag_retrieval"];

/// `EnvFilter` directives used when `RUST_LOG` is unset
pub fn default_log_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
