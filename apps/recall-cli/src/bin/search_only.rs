use std::path::PathBuf;

use clap::Parser;
use recall_core::traits::CorpusProvider;
use recall_text::{rank_top_k, JsonChunkStore};

/// Rank stored chunks lexically, without composing an answer.
#[derive(Parser)]
#[command(name = "recall-search-only", version)]
struct Args {
    query: String,

    /// Chunks directory
    #[arg(default_value = "data/chunks")]
    chunks_dir: PathBuf,

    /// Maximum number of hits
    #[arg(short, long, default_value = "10")]
    limit: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_target(false).init();
    println!("🔍 recall-search-only\n==================");
    println!("Query: {}", args.query); println!("Chunks directory: {}", args.chunks_dir.display());
    let store = JsonChunkStore::new(args.chunks_dir);
    let Some(corpus) = store.load_all()? else {
        println!("\nNo chunk store at {}", store.dir().display());
        return Ok(());
    };
    let hits = rank_top_k(&args.query, &corpus, args.limit);
    println!("\n🔍 Found {} results for: \"{}\" ({} chunks scanned)", hits.len(), args.query, corpus.len());
    for (i, hit) in hits.iter().enumerate() {
        println!("\n  {}. score={}  id={}  source={}  chunk={}", i + 1, hit.score, hit.chunk_id, hit.source_id, hit.chunk_index);
        println!("     📝 Context: {}", hit.text);
    }
    Ok(())
}
