use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use recall_core::traits::{ChunkSink, CorpusProvider};
use recall_core::types::ChunkRecord;
use twox_hash::XxHash64;

/// Directory of `<source_id>.json` files, each a JSON array of chunk records.
///
/// Enumeration is sorted by file name, which fixes the corpus order the
/// lexical ranker relies on for tie-breaking.
pub struct JsonChunkStore {
	dir: PathBuf,
}

impl JsonChunkStore {
	pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

	pub fn dir(&self) -> &Path { &self.dir }

	/// File that holds the chunks of `source_id`. Characters outside
	/// `[A-Za-z0-9._-]` are replaced by `_`; when that changes the id, an
	/// xxhash of the raw id is appended so distinct sources never share a file.
	pub fn path_for(&self, source_id: &str) -> PathBuf {
		let stem: String = source_id
			.chars()
			.map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
			.collect();
		if stem == source_id { return self.dir.join(format!("{stem}.json")); }
		let mut hasher = XxHash64::with_seed(0);
		hasher.write(source_id.as_bytes());
		self.dir.join(format!("{stem}-{:016x}.json", hasher.finish()))
	}

	/// Write the chunks of each source to its own file, replacing earlier content.
	/// Sources are written in first-seen order; returns the written paths.
	pub fn write_sources(&self, chunks: &[ChunkRecord]) -> Result<Vec<PathBuf>> {
		fs::create_dir_all(&self.dir).with_context(|| format!("creating {}", self.dir.display()))?;
		let mut sources: Vec<&str> = Vec::new();
		for c in chunks {
			if !sources.contains(&c.source_id()) { sources.push(c.source_id()); }
		}
		let mut written = Vec::with_capacity(sources.len());
		for source_id in sources {
			let records: Vec<&ChunkRecord> = chunks.iter().filter(|c| c.source_id() == source_id).collect();
			let path = self.path_for(source_id);
			let json = serde_json::to_string_pretty(&records)?;
			fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
			tracing::info!(source_id, chunks = records.len(), path = %path.display(), "persisted chunks");
			written.push(path);
		}
		Ok(written)
	}

	/// Records of a single source, `None` when it was never persisted.
	pub fn load_source(&self, source_id: &str) -> Result<Option<Vec<ChunkRecord>>> {
		let path = self.path_for(source_id);
		if !path.exists() { return Ok(None); }
		Ok(Some(read_records(&path)?))
	}

	fn json_files(&self) -> Vec<PathBuf> {
		walkdir::WalkDir::new(&self.dir)
			.min_depth(1)
			.max_depth(1)
			.sort_by_file_name()
			.into_iter()
			.filter_map(|e| e.ok())
			.filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "json"))
			.map(|e| e.into_path())
			.collect()
	}
}

fn read_records(path: &Path) -> Result<Vec<ChunkRecord>> {
	let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

impl ChunkSink for JsonChunkStore {
	fn persist(&self, chunks: &[ChunkRecord]) -> Result<()> {
		self.write_sources(chunks).map(|_| ())
	}
}

impl CorpusProvider for JsonChunkStore {
	/// Unreadable or malformed files are skipped with a warning.
	fn load_all(&self) -> Result<Option<Vec<ChunkRecord>>> {
		if !self.dir.is_dir() { return Ok(None); }
		let mut corpus = Vec::new();
		let mut files = 0usize;
		for path in self.json_files() {
			match read_records(&path) {
				Ok(records) => { corpus.extend(records); files += 1; }
				Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping corpus file"),
			}
		}
		tracing::debug!(files, chunks = corpus.len(), dir = %self.dir.display(), "loaded corpus");
		Ok(Some(corpus))
	}
}
