use anyhow::Result;
use recall_core::traits::{CorpusProvider, PrimarySearch};
use recall_core::types::RankedHit;

use crate::rank::rank_top_k;

/// Primary search that never finds anything, leaving every query to the
/// lexical fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrimary;

impl PrimarySearch for NoPrimary {
	fn search(&self, _query: &str, _k: usize) -> Result<Vec<RankedHit>> { Ok(Vec::new()) }
}

/// Primary similarity search first, lexical ranking over the corpus second.
pub struct Retriever<P, C> where P: PrimarySearch, C: CorpusProvider {
	primary: P,
	corpus: C,
}

impl<P, C> Retriever<P, C> where P: PrimarySearch, C: CorpusProvider {
	pub fn new(primary: P, corpus: C) -> Self { Self { primary, corpus } }

	/// Primary hits win when there are any. A failing primary is logged and
	/// treated as empty. Corpus load errors are returned so callers can tell
	/// them apart from "no matches".
	pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RankedHit>> {
		match self.primary.search(query, k) {
			Ok(hits) if !hits.is_empty() => return Ok(hits),
			Ok(_) => {}
			Err(e) => tracing::warn!(error = %e, "primary search failed, using lexical fallback"),
		}
		self.lexical(query, k)
	}

	/// Lexical ranking only. A missing corpus yields no hits.
	pub fn lexical(&self, query: &str, k: usize) -> Result<Vec<RankedHit>> {
		let Some(corpus) = self.corpus.load_all()? else {
			tracing::debug!("corpus unavailable, no lexical hits");
			return Ok(Vec::new());
		};
		let hits = rank_top_k(query, &corpus, k);
		tracing::debug!(query, candidates = corpus.len(), hits = hits.len(), "lexical ranking");
		Ok(hits)
	}
}
