use recall_core::{Chunker, ChunkingConfig};
use recall_text::{rank_top_k, Composer};

// Chunk a small built-in corpus in memory, rank it and print the hits.
// Usage:
//   cargo run -p recall-text --example search -- ["your query"]

const NOTES: &[(&str, &str)] = &[
    ("rivers", "Rivers carry sediment toward the sea. A slow river drops its load and builds a delta. \
        Fast water cuts canyons instead. Flooding spreads fine silt over the plain."),
    ("orchard", "Apple trees need cold winters to fruit well. Prune them in late winter. \
        A river nearby keeps the orchard from drying out in August."),
    ("bees", "Honey bees forage within a few kilometres of the hive. They favour orchards in bloom. \
        Smoke calms a colony before the hive is opened."),
];

fn main() -> anyhow::Result<()> {
    let query = std::env::args().nth(1).unwrap_or_else(|| "slow river".to_string());
    let chunker = Chunker::new(ChunkingConfig { chunk_size_chars: 120, min_chunk_chars: 40 })?;
    let corpus: Vec<_> = NOTES.iter().flat_map(|(source, text)| chunker.segment(text, source, None)).collect();

    println!("Lexical search\n==============");
    println!("Corpus: {} chunks from {} notes", corpus.len(), NOTES.len());
    println!("Query: {query}\n");

    let hits = rank_top_k(&query, &corpus, 3);
    if hits.is_empty() {
        println!("No matches.");
        return Ok(());
    }
    for (i, h) in hits.iter().enumerate() {
        println!("{:>2}. score={} source={} chunk={}\n    {}", i + 1, h.score, h.source_id, h.chunk_index, h.text);
    }
    println!("\n{}", Composer::default().compose(&hits).answer);
    Ok(())
}
