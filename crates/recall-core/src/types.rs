//! Domain types shared by the chunker, the store and the ranker.

use serde::{Deserialize, Serialize};

pub type ChunkId = String;

/// Positional metadata attached to every chunk.
///
/// - `source_id`: identity of the document or text blob the chunk came from
/// - `chunk_index`: 0-based emission index within the source (or page);
///   indices absorbed by the merge pass are dropped, never reassigned
/// - `page`: page position for paginated sources, `None` otherwise
/// - `char_len`: number of characters (not bytes) in the chunk text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub source_id: String,
    pub chunk_index: usize,
    pub page: Option<u32>,
    pub char_len: usize,
}

/// A bounded slice of a source text, ready to be embedded or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: ChunkId,
    pub text: String,
    pub meta: ChunkMeta,
}

impl ChunkRecord {
    pub fn source_id(&self) -> &str {
        &self.meta.source_id
    }
}

/// A single query result. `score` is engine-specific but higher is always
/// better; the lexical ranker fills it with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedHit {
    pub text: String,
    pub source_id: String,
    pub chunk_index: usize,
    pub page: Option<u32>,
    pub chunk_id: ChunkId,
    pub score: u64,
}

impl RankedHit {
    pub fn from_record(record: &ChunkRecord, score: u64) -> Self {
        Self {
            text: record.text.clone(),
            source_id: record.meta.source_id.clone(),
            chunk_index: record.meta.chunk_index,
            page: record.meta.page,
            chunk_id: record.id.clone(),
            score,
        }
    }
}

/// Number of characters in `text`; chunk bounds are measured this way.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}
