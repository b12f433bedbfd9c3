//! Sentence-aware chunking with a hard character bound.
//!
//! Text is split at sentence terminators, sentences are packed greedily into
//! chunks of at most `chunk_size_chars` characters, sentences that alone
//! exceed the bound are sliced at word boundaries, and a final fold absorbs
//! undersized chunks into their predecessor when the bound allows it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{char_len, ChunkMeta, ChunkRecord};

/// Bounds applied by [`Chunker`]; both are measured in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Hard upper bound for every emitted chunk.
    pub chunk_size_chars: usize,
    /// Chunks shorter than this are merged into their successor when the
    /// result stays within `chunk_size_chars`. May exceed the bound, in which
    /// case every chunk is a merge candidate.
    pub min_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size_chars: 800, min_chunk_chars: 200 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size_chars == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size_chars must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

/// A chunk under construction; ids are only minted once merging is done.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Draft {
    chunk_index: usize,
    text: String,
    char_len: usize,
}

impl Draft {
    fn new(chunk_index: usize, text: String) -> Self {
        let char_len = char_len(&text);
        Self { chunk_index, text, char_len }
    }

    fn fits_with(&self, next: &Draft, max: usize) -> bool {
        self.char_len + 1 + next.char_len <= max
    }

    /// Absorb `next`, keeping this draft's index.
    fn join(self, next: Draft) -> Draft {
        Draft {
            chunk_index: self.chunk_index,
            text: format!("{} {}", self.text, next.text),
            char_len: self.char_len + 1 + next.char_len,
        }
    }

    fn into_record(self, source_id: &str, page: Option<u32>) -> ChunkRecord {
        ChunkRecord {
            id: chunk_id(source_id, page, self.chunk_index),
            text: self.text,
            meta: ChunkMeta {
                source_id: source_id.to_string(),
                chunk_index: self.chunk_index,
                page,
                char_len: self.char_len,
            },
        }
    }
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Chunk one logical unit of text (a whole blob or a single page).
    ///
    /// Never fails: text without any sentence content comes back verbatim as a
    /// single chunk with index 0.
    pub fn segment(&self, text: &str, source_id: &str, page: Option<u32>) -> Vec<ChunkRecord> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return vec![Draft::new(0, text.to_string()).into_record(source_id, page)];
        }
        let drafts = self.aggregate(&sentences);
        let merged = self.merge_small(drafts);
        tracing::debug!(source_id, ?page, sentences = sentences.len(), chunks = merged.len(), "segmented text");
        merged.into_iter().map(|d| d.into_record(source_id, page)).collect()
    }

    /// Chunk every non-blank page independently. Indices restart at 0 on each
    /// page and `meta.page` carries the page position.
    pub fn segment_pages<S: AsRef<str>>(&self, pages: &[S], source_id: &str) -> Vec<ChunkRecord> {
        pages
            .iter()
            .enumerate()
            .filter(|(_, page)| !page.as_ref().trim().is_empty())
            .flat_map(|(position, page)| {
                let page_no = u32::try_from(position).unwrap_or(u32::MAX);
                self.segment(page.as_ref(), source_id, Some(page_no))
            })
            .collect()
    }

    fn aggregate(&self, sentences: &[&str]) -> Vec<Draft> {
        let max = self.config.chunk_size_chars;
        let mut drafts = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut buffer_len = 0usize;

        for &sentence in sentences {
            let len = char_len(sentence);
            if len > max {
                flush(&mut drafts, &mut buffer);
                buffer_len = 0;
                for slice in split_long(sentence, max) {
                    let index = drafts.len();
                    drafts.push(Draft::new(index, slice));
                }
                continue;
            }
            if buffer_len + len + 1 <= max {
                buffer.push(sentence);
                buffer_len += len + 1;
            } else {
                flush(&mut drafts, &mut buffer);
                buffer.push(sentence);
                buffer_len = len + 1;
            }
        }
        flush(&mut drafts, &mut buffer);
        drafts
    }

    /// Single look-back fold: a draft shorter than `min_chunk_chars` absorbs
    /// its successor while the joined text stays within `chunk_size_chars`.
    /// The grown draft is compared again against the next one, so runs of
    /// small drafts collapse.
    fn merge_small(&self, drafts: Vec<Draft>) -> Vec<Draft> {
        let max = self.config.chunk_size_chars;
        let min = self.config.min_chunk_chars;
        drafts.into_iter().fold(Vec::new(), |mut merged: Vec<Draft>, current| {
            match merged.pop() {
                Some(prev) if prev.char_len < min && prev.fits_with(&current, max) => {
                    merged.push(prev.join(current));
                }
                Some(prev) => {
                    merged.push(prev);
                    merged.push(current);
                }
                None => merged.push(current),
            }
            merged
        })
    }
}

fn flush(drafts: &mut Vec<Draft>, buffer: &mut Vec<&str>) {
    if buffer.is_empty() {
        return;
    }
    let text = buffer.join(" ");
    buffer.clear();
    if !text.is_empty() {
        let index = drafts.len();
        drafts.push(Draft::new(index, text));
    }
}

/// `{source_id}::chunk::{index}::{rand8}`, with a `p{page}` segment for paged
/// input so indices that restart per page stay distinct.
fn chunk_id(source_id: &str, page: Option<u32>, chunk_index: usize) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let salt = &salt[..8];
    match page {
        Some(page) => format!("{source_id}::p{page}::chunk::{chunk_index}::{salt}"),
        None => format!("{source_id}::chunk::{chunk_index}::{salt}"),
    }
}

/// Split `text` after `.`, `!` or `?` followed by whitespace. The input and
/// every piece are trimmed; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let mut resume = i + c.len_utf8();
            while let Some(&(j, w)) = chars.peek() {
                if !w.is_whitespace() {
                    break;
                }
                resume = j + w.len_utf8();
                chars.next();
            }
            push_trimmed(&mut sentences, &text[start..i]);
            start = resume;
            prev = None;
            continue;
        }
        prev = Some(c);
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}

/// Slice an oversized sentence into pieces of at most `max` characters. A
/// slice ends at the last space inside its window (words stay whole) unless
/// the window holds no space after its first character, in which case the
/// hard boundary is used.
fn split_long(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    if n <= max {
        return vec![text.to_string()];
    }
    let mut parts = Vec::new();
    let mut start = 0;
    while start < n {
        let mut end = (start + max).min(n);
        if end < n {
            if let Some(space) = chars[start..end].iter().rposition(|&c| c == ' ') {
                if space > 0 {
                    end = start + space;
                }
            }
        }
        let part: String = chars[start..end].iter().collect();
        let part = part.trim();
        if !part.is_empty() {
            parts.push(part.to_string());
        }
        start = end;
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(chunk_size_chars: usize, min_chunk_chars: usize) -> Chunker {
        Chunker::new(ChunkingConfig { chunk_size_chars, min_chunk_chars }).unwrap()
    }

    fn texts(chunks: &[ChunkRecord]) -> Vec<&str> {
        chunks.iter().map(|c| c.text.as_str()).collect()
    }

    fn indices(chunks: &[ChunkRecord]) -> Vec<usize> {
        chunks.iter().map(|c| c.meta.chunk_index).collect()
    }

    fn non_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn sentences_split_on_terminal_punctuation_and_whitespace() {
        let got = split_sentences("  Hello world. This is a test!  Next?\nLast one  ");
        assert_eq!(got, vec!["Hello world.", "This is a test!", "Next?", "Last one"]);
    }

    #[test]
    fn punctuation_without_whitespace_is_not_a_boundary() {
        assert_eq!(split_sentences("Version 1.2 shipped.Then 3.0"), vec!["Version 1.2 shipped.Then 3.0"]);
        assert!(split_sentences(" \n\t ").is_empty());
    }

    #[test]
    fn rejects_zero_bound_only() {
        assert!(Chunker::new(ChunkingConfig { chunk_size_chars: 0, min_chunk_chars: 0 }).is_err());
        assert!(Chunker::new(ChunkingConfig { chunk_size_chars: 10, min_chunk_chars: 11 }).is_ok());
        assert!(Chunker::new(ChunkingConfig { chunk_size_chars: 10, ..ChunkingConfig::default() }).is_ok());
    }

    #[test]
    fn minimum_above_bound_merges_whenever_it_fits() {
        let drafts = vec![
            Draft::new(0, "ab".to_string()),
            Draft::new(1, "cd".to_string()),
            Draft::new(2, "efghij".to_string()),
        ];
        let merged = chunker(10, 200).merge_small(drafts);
        assert_eq!(merged.iter().map(|d| d.text.as_str()).collect::<Vec<_>>(), vec!["ab cd", "efghij"]);
        assert!(merged.iter().all(|d| d.char_len <= 10));
    }

    #[test]
    fn small_bound_example_respects_limit() {
        let text = "Hello world. This is a test. We will chunk this text into small pieces.";
        let chunks = chunker(10, 200).segment(text, "doc", None);
        assert!(chunks.len() >= 2);
        for c in &chunks {
            assert!(c.meta.char_len <= 10, "chunk too long: {:?}", c.text);
            assert_eq!(c.meta.char_len, char_len(&c.text));
        }
        assert_eq!(chunks[0].text, "Hello");
        assert_eq!(chunks[1].text, "world.");
    }

    #[test]
    fn whitespace_only_input_is_returned_verbatim() {
        let chunks = chunker(10, 2).segment("   \n ", "blank", None);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "   \n ");
        assert_eq!(chunks[0].meta.chunk_index, 0);
        assert_eq!(chunks[0].meta.char_len, 5);

        let empty = chunker(10, 2).segment("", "empty", None);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].text, "");
    }

    #[test]
    fn sentences_are_packed_greedily() {
        let text = "One two. Three four. Five six seven eight nine.";
        let chunks = chunker(30, 0).segment(text, "doc", None);
        assert_eq!(texts(&chunks), vec!["One two. Three four.", "Five six seven eight nine."]);
        assert_eq!(indices(&chunks), vec![0, 1]);
    }

    #[test]
    fn sentence_of_exactly_the_bound_stays_whole() {
        let chunks = chunker(10, 0).segment("abcdefghi.", "doc", None);
        assert_eq!(texts(&chunks), vec!["abcdefghi."]);
    }

    #[test]
    fn oversized_sentence_splits_at_word_boundaries() {
        let chunks = chunker(10, 0).segment("alpha beta gamma delta", "doc", None);
        assert_eq!(texts(&chunks), vec!["alpha", "beta", "gamma", "delta"]);
        assert_eq!(indices(&chunks), vec![0, 1, 2, 3]);
    }

    #[test]
    fn oversized_word_falls_back_to_hard_cut() {
        let chunks = chunker(10, 0).segment("abcdefghijklmnopqrstuvwxy", "doc", None);
        assert_eq!(texts(&chunks), vec!["abcdefghij", "klmnopqrst", "uvwxy"]);
    }

    #[test]
    fn buffer_is_flushed_before_oversized_sentence() {
        let text = "Tiny. Supercalifragilistic word here. End.";
        let chunks = chunker(12, 0).segment(text, "doc", None);
        assert_eq!(
            texts(&chunks),
            vec!["Tiny.", "Supercalifra", "gilistic", "word here.", "End."]
        );
        assert_eq!(indices(&chunks), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn small_chunk_absorbs_successor_and_keeps_its_index() {
        let text = "Supercalifragilisticexpialidocious. Yes.";
        let chunks = chunker(20, 16).segment(text, "doc", None);
        assert_eq!(texts(&chunks), vec!["Supercalifragilistic", "expialidocious. Yes."]);
        assert_eq!(indices(&chunks), vec![0, 1]);
        assert_eq!(chunks[1].meta.char_len, 20);
    }

    #[test]
    fn three_small_drafts_cascade_into_one() {
        let drafts = vec![
            Draft::new(0, "aaa".to_string()),
            Draft::new(1, "bbb".to_string()),
            Draft::new(2, "ccc".to_string()),
            Draft::new(3, "d".repeat(20)),
        ];
        let merged = chunker(40, 10).merge_small(drafts);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].text, "aaa bbb ccc");
        assert_eq!(merged[0].char_len, 11);
        assert_eq!(merged[0].chunk_index, 0);
        assert_eq!(merged[1].chunk_index, 3);
    }

    #[test]
    fn merge_never_crosses_the_bound() {
        let drafts = vec![
            Draft::new(0, "a".repeat(5)),
            Draft::new(1, "b".repeat(5)),
            Draft::new(2, "c".repeat(9)),
        ];
        let merged = chunker(15, 12).merge_small(drafts);
        assert_eq!(merged.iter().map(|d| d.char_len).collect::<Vec<_>>(), vec![11, 9]);
    }

    #[test]
    fn every_chunk_respects_bound_and_content_is_preserved() {
        let text = "Rust is a systems language! It guarantees memory safety without a garbage collector. \
                    Ownership rules are checked at compile time?   Pneumonoultramicroscopicsilicovolcanoconiosis \
                    is a very long word. Short. Tiny. End.";
        for (size, min) in [(12, 0), (20, 8), (40, 30), (80, 20), (500, 200)] {
            let chunks = chunker(size, min).segment(text, "doc", None);
            for c in &chunks {
                assert!(c.meta.char_len <= size, "size={size}: {:?}", c.text);
                assert!(!c.text.is_empty());
            }
            let joined: String = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
            assert_eq!(non_whitespace(&joined), non_whitespace(text), "size={size}");
            for pair in chunks.windows(2) {
                let (a, b) = (pair[0].meta.char_len, pair[1].meta.char_len);
                assert!(!(a < min && a + 1 + b <= size), "unmerged pair at size={size}");
            }
        }
    }

    #[test]
    fn rechunking_a_chunk_is_a_no_op() {
        let text = "First sentence here. Second one follows. Third closes the paragraph.";
        let c = chunker(45, 10);
        for chunk in c.segment(text, "doc", None) {
            let again = c.segment(&chunk.text, "doc", None);
            assert_eq!(texts(&again), vec![chunk.text.as_str()]);
        }
    }

    #[test]
    fn unicode_is_bounded_by_characters() {
        let text = "Ärger über Öl. Größe zählt nicht.";
        let chunks = chunker(16, 0).segment(text, "umlaut", None);
        assert_eq!(texts(&chunks), vec!["Ärger über Öl.", "Größe zählt", "nicht."]);
        assert_eq!(chunks[0].meta.char_len, 14);
    }

    #[test]
    fn ids_embed_source_index_and_salt() {
        let chunks = chunker(30, 0).segment("One two. Three four. Five six seven eight nine.", "notes.txt", None);
        let parts: Vec<&str> = chunks[1].id.split("::").collect();
        assert_eq!(&parts[..3], &["notes.txt", "chunk", "1"]);
        assert_eq!(parts[3].len(), 8);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn pages_are_chunked_independently() {
        let pages = ["First page. Has two sentences.", "   ", "Third page text."];
        let chunks = chunker(20, 0).segment_pages(&pages, "book.pdf");
        assert_eq!(
            chunks.iter().map(|c| (c.meta.page, c.meta.chunk_index)).collect::<Vec<_>>(),
            vec![(Some(0), 0), (Some(0), 1), (Some(2), 0)]
        );
        assert!(chunks[0].id.starts_with("book.pdf::p0::chunk::0::"));
        assert!(chunks[2].id.starts_with("book.pdf::p2::chunk::0::"));
        let mut ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), chunks.len());
    }
}
