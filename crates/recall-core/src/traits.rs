use crate::types::{ChunkRecord, RankedHit};

/// Receives freshly chunked records and stores them.
pub trait ChunkSink: Send + Sync {
    fn persist(&self, chunks: &[ChunkRecord]) -> anyhow::Result<()>;
}

/// Yields the stored corpus in a stable order.
///
/// `Ok(None)` means the corpus source does not exist (yet); callers treat it
/// like an empty corpus.
pub trait CorpusProvider: Send + Sync {
    fn load_all(&self) -> anyhow::Result<Option<Vec<ChunkRecord>>>;
}

/// A primary similarity search consulted before the lexical fallback.
pub trait PrimarySearch: Send + Sync {
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<RankedHit>>;
}
