//! Deterministic answer composition from ranked hits.
//!
//! No language model is involved: the answer is the opening of the assembled
//! context, and every hit is listed as a source.

use serde::{Deserialize, Serialize};

use recall_core::types::RankedHit;

pub const NO_ANSWER: &str = "I couldn't find relevant information in your memory.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
	pub chunk_id: String,
	pub source_id: String,
	pub chunk_index: usize,
	pub page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
	pub answer: String,
	pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone)]
pub struct Composer {
	max_context_chars: usize,
}

impl Default for Composer {
	fn default() -> Self { Self { max_context_chars: 2000 } }
}

impl Composer {
	pub fn new(max_context_chars: usize) -> Self { Self { max_context_chars } }

	/// Hit texts in rank order until `max_context_chars` is spent; the hit that
	/// crosses the budget is truncated and the rest are dropped.
	pub fn build_context(&self, hits: &[RankedHit]) -> String {
		let mut parts = Vec::new();
		let mut total = 0usize;
		for hit in hits {
			if hit.text.is_empty() { continue; }
			let len = hit.text.chars().count();
			let text = if total + len > self.max_context_chars {
				let remaining = self.max_context_chars.saturating_sub(total);
				if remaining == 0 { break; }
				hit.text.chars().take(remaining).collect::<String>()
			} else {
				hit.text.clone()
			};
			total += text.chars().count();
			parts.push(format!("Source ({}:{}): {}", hit.source_id, hit.chunk_index, text));
		}
		parts.join("\n\n")
	}

	pub fn compose(&self, hits: &[RankedHit]) -> Answer {
		let context = self.build_context(hits);
		let answer = if context.is_empty() {
			NO_ANSWER.to_string()
		} else {
			let mut fragments = context.split('.');
			let first = fragments.next().unwrap_or_default().trim();
			let second = fragments.next().unwrap_or_default().trim();
			format!("{first}. {second}").trim().to_string()
		};
		let sources = hits
			.iter()
			.map(|h| SourceRef {
				chunk_id: h.chunk_id.clone(),
				source_id: h.source_id.clone(),
				chunk_index: h.chunk_index,
				page: h.page,
			})
			.collect();
		Answer { answer, sources }
	}
}
