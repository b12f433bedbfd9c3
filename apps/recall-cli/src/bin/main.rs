//! # recall — chunk text into a local store and query it
//!
//! Usage:
//!   recall ingest notes/ report.txt        # chunk files or directories
//!   recall ingest --text "Quick brown fox. Jumps high."
//!   recall query "brown fox" --top-k 3     # compose an answer from the store
//!   recall chunk report.txt                # print chunks as JSON, persist nothing

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use recall_core::config::{Config, Settings};
use recall_core::traits::ChunkSink;
use recall_core::types::ChunkRecord;
use recall_core::{Chunker, DataProcessor};
use recall_text::{Composer, JsonChunkStore, NoPrimary, Retriever};

#[derive(Parser)]
#[command(name = "recall", version, about = "Sentence-aware chunking and lexical recall over a local chunk store")]
struct Cli {
    /// Configuration environment (dev, prod, test); overrides RUST_ENV
    #[arg(long, global = true)]
    config_env: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk text, files or directories and persist the chunks
    Ingest {
        /// Inline text to ingest
        #[arg(long, conflicts_with = "paths")]
        text: Option<String>,

        /// Source id for --text (generated when omitted)
        #[arg(long, requires = "text")]
        source_id: Option<String>,

        /// Files or directories (.txt / .md) to ingest
        paths: Vec<PathBuf>,
    },
    /// Answer a query from the stored chunks
    Query {
        query: String,

        /// Number of chunks to retrieve (defaults to retrieval.top_k)
        #[arg(long)]
        top_k: Option<usize>,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the chunks of a file as JSON without persisting them
    Chunk { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "recall=debug,recall_core=debug,recall_text=debug" } else { "recall=info,recall_core=info,recall_text=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let config = match cli.config_env.as_deref() {
        Some(env_name) => Config::load_for_env(env_name),
        None => Config::load(),
    }
    .context("loading configuration")?;
    let settings = config.settings()?;
    let processor = DataProcessor::new(Chunker::new(settings.chunking.clone())?);

    match cli.command {
        Command::Ingest { text, source_id, paths } => {
            let chunks = match text {
                Some(text) => processor.process_text(&text, source_id.as_deref()),
                None if paths.is_empty() => bail!("provide --text or at least one PATH"),
                None => collect_paths(&processor, &paths)?,
            };
            let store = JsonChunkStore::new(settings.chunks_dir());
            store.persist(&chunks)?;
            println!("✅ Ingest complete ({} chunks) into {}", chunks.len(), store.dir().display());
        }
        Command::Query { query, top_k, json } => run_query(&settings, &query, top_k, json)?,
        Command::Chunk { path } => {
            let chunks = processor.process_file(&path, &file_source_id(&path))?;
            println!("{}", serde_json::to_string_pretty(&chunks)?);
        }
    }
    Ok(())
}

fn collect_paths(processor: &DataProcessor, paths: &[PathBuf]) -> Result<Vec<ChunkRecord>> {
    let mut chunks = Vec::new();
    for path in paths {
        if path.is_dir() {
            tracing::info!(dir = %path.display(), "ingesting directory");
            chunks.extend(processor.process_directory(path)?);
        } else {
            chunks.extend(processor.process_file(path, &file_source_id(path))?);
        }
    }
    Ok(chunks)
}

fn file_source_id(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn run_query(settings: &Settings, query: &str, top_k: Option<usize>, json: bool) -> Result<()> {
    if query.trim().is_empty() {
        bail!("query is required");
    }
    let k = top_k.unwrap_or(settings.retrieval.top_k);
    let retriever = Retriever::new(NoPrimary, JsonChunkStore::new(settings.chunks_dir()));
    let hits = retriever.retrieve(query, k)?;
    let answer = Composer::new(settings.retrieval.max_context_chars).compose(&hits);

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }
    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for (hit, source) in hits.iter().zip(&answer.sources) {
            let page = source.page.map(|p| format!(" page={p}")).unwrap_or_default();
            println!("  score={:<4} {}:{}{}  ({})", hit.score, source.source_id, source.chunk_index, page, source.chunk_id);
        }
    }
    Ok(())
}
