//! mmrag entry point
//!
//! Indexes the given text documents and image captions, then answers each
//! `--query` (or each line read from stdin) with reranked context.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use mmrag_retrieval::chunker::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use mmrag_retrieval::config::DEFAULT_TOP_K;
use mmrag_retrieval::embedding::DEFAULT_BATCH_SIZE;
use mmrag_retrieval::{
    CachedEmbedder, EmbedderConfig, EmbeddingProvider, JinaEmbedder, ModalityFilter,
    RetrievalConfig, RetrievalStore,
};
use mmrag_cli::output::{render_answer, render_build, render_json};
use mmrag_cli::{default_log_filter, CliError, CliResult, QuerySettings, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mmrag")]
#[command(about = "Grounded retrieval over text documents and image captions")]
#[command(version)]
struct Args {
    /// Text document to index (.txt or .pdf); repeatable
    #[arg(long = "text", value_name = "FILE")]
    texts: Vec<PathBuf>,

    /// Image caption to index, saved as a .txt file; repeatable
    #[arg(long = "caption", value_name = "FILE")]
    captions: Vec<PathBuf>,

    /// Words per chunk
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Words shared by neighbouring chunks
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    chunk_overlap: usize,

    /// Texts per embedding request
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Results per query
    #[arg(long, short = 'k', default_value_t = DEFAULT_TOP_K, value_parser = parse_top_k)]
    top_k: usize,

    /// Restrict results to one modality: both, text or image
    #[arg(long, default_value = "both")]
    modality: ModalityFilter,

    /// Question to ask; repeatable. Reads one question per stdin line when absent
    #[arg(long, short)]
    query: Vec<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Include the assembled answer prompt in text output
    #[arg(long)]
    show_prompt: bool,

    /// Embed on-device instead of calling the remote provider
    #[arg(long)]
    local: bool,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn parse_top_k(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(k) if k >= 1 => Ok(k),
        _ => Err(format!("top-k must be a positive integer, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_filter = default_log_filter(args.verbose);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> CliResult<()> {
    if args.texts.is_empty() && args.captions.is_empty() {
        return Err(CliError::NoInput);
    }

    let config = RetrievalConfig {
        chunk_size: args.chunk_size,
        chunk_overlap: args.chunk_overlap,
        batch_size: args.batch_size,
        top_k: args.top_k,
        modality_filter: args.modality,
    };

    let embedder = embedder(args.local)?;
    tracing::info!("Using embedding model {}", embedder.model_name());

    let store = RetrievalStore::with_config(embedder, &config);
    let mut session = Session::new(store, QuerySettings::from(&config));

    for path in &args.texts {
        session.ingest_text_file(path)?;
    }
    for path in &args.captions {
        session.ingest_caption_file(path)?;
    }

    let summary = session.build().await?;
    if args.json {
        println!("{}", render_json(&summary)?);
    } else {
        println!("{}", render_build(&summary));
    }

    let mut total = 0;
    let mut failed = 0;
    if args.query.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let query = line.trim();
            if query.is_empty() {
                continue;
            }
            total += 1;
            if !answer(&mut session, query, &args).await? {
                failed += 1;
            }
        }
    } else {
        for query in &args.query {
            total += 1;
            if !answer(&mut session, query, &args).await? {
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::QueriesFailed { failed, total });
    }
    Ok(())
}

/// Print the answer for one query; a failed query is reported and skipped.
async fn answer(session: &mut Session, query: &str, args: &Args) -> CliResult<bool> {
    match session.ask(query).await {
        Ok(answer) => {
            if args.json {
                println!("{}", render_json(&answer)?);
            } else {
                println!("{}\n", render_answer(&answer, args.show_prompt));
            }
            Ok(true)
        }
        Err(e) => {
            tracing::error!("Query {:?} failed: {}", query, e);
            Ok(false)
        }
    }
}

fn embedder(local: bool) -> CliResult<Arc<dyn EmbeddingProvider>> {
    if local {
        return local_embedder();
    }
    let remote = JinaEmbedder::from_config(&EmbedderConfig::from_env())?;
    Ok(Arc::new(CachedEmbedder::new(remote)))
}

#[cfg(feature = "local-embeddings")]
fn local_embedder() -> CliResult<Arc<dyn EmbeddingProvider>> {
    let local = mmrag_retrieval::LocalEmbedder::new()?;
    Ok(Arc::new(CachedEmbedder::new(local)))
}

#[cfg(not(feature = "local-embeddings"))]
fn local_embedder() -> CliResult<Arc<dyn EmbeddingProvider>> {
    Err(CliError::LocalEmbeddingsUnavailable)
}
