//! Lexical top-k scoring used when the primary similarity search comes back empty.
//!
//! Score of an item: `10 × occurrences of the whole normalized query` plus the
//! occurrences of every query token, all counted case-insensitively as
//! non-overlapping substrings. Items scoring zero are dropped.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use recall_core::types::{ChunkRecord, RankedHit};

/// Weight of a whole-query (phrase) occurrence relative to a single token.
pub const PHRASE_WEIGHT: u64 = 10;

/// Trimmed, lower-cased query plus its word tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedQuery {
    pub phrase: String,
    pub tokens: Vec<String>,
}

impl NormalizedQuery {
    /// `None` when nothing is left after trimming.
    pub fn parse(query: &str) -> Option<Self> {
        let phrase = query.trim().to_lowercase();
        if phrase.is_empty() {
            return None;
        }
        let tokens = tokenize(&phrase);
        Some(Self { phrase, tokens })
    }

    pub fn score(&self, text: &str) -> u64 {
        let text = text.to_lowercase();
        let phrase_hits = count(&text, &self.phrase) * PHRASE_WEIGHT;
        let token_hits: u64 = self.tokens.iter().map(|t| count(&text, t)).sum();
        phrase_hits + token_hits
    }
}

/// Runs of alphanumeric or `_` characters; everything else separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn count(haystack: &str, needle: &str) -> u64 {
    haystack.matches(needle).count() as u64
}

/// Heap entry. Ordered by score, then by *reverse* encounter sequence, so the
/// minimum of a full heap is the lowest score and, among equal scores, the
/// most recently seen candidate.
struct Candidate<'a> {
    score: u64,
    seq: u64,
    record: &'a ChunkRecord,
}

impl Candidate<'_> {
    fn key(&self) -> (u64, Reverse<u64>) {
        (self.score, Reverse(self.seq))
    }
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Rank `corpus` against `query` and keep the `k` best hits.
///
/// Output is sorted by score descending; equal scores keep corpus order.
/// An empty query, an empty corpus or `k == 0` yield no hits.
pub fn rank_top_k<'a, I>(query: &str, corpus: I, k: usize) -> Vec<RankedHit>
where
    I: IntoIterator<Item = &'a ChunkRecord>,
{
    let Some(query) = NormalizedQuery::parse(query) else {
        return Vec::new();
    };
    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate<'a>>> = BinaryHeap::with_capacity(k + 1);
    let mut seq = 0u64;
    for record in corpus {
        if record.text.is_empty() {
            continue;
        }
        let score = query.score(&record.text);
        if score == 0 {
            continue;
        }
        heap.push(Reverse(Candidate { score, seq, record }));
        seq += 1;
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut kept: Vec<Candidate<'a>> = heap.into_iter().map(|Reverse(c)| c).collect();
    kept.sort_unstable_by(|a, b| b.cmp(a));
    kept.into_iter().map(|c| RankedHit::from_record(c.record, c.score)).collect()
}
