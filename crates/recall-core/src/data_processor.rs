use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::chunker::Chunker;
use crate::error::{Error, Result};
use crate::types::ChunkRecord;

/// Coarse content type of an uploaded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Text,
    Pdf,
}

/// `%PDF` magic or a `.pdf` extension marks a PDF; everything else is text.
pub fn detect_kind(bytes: &[u8], filename: &str) -> ContentKind {
    if bytes.starts_with(b"%PDF") || filename.to_lowercase().ends_with(".pdf") {
        ContentKind::Pdf
    } else {
        ContentKind::Text
    }
}

/// Decode bytes as UTF-8, replacing invalid sequences.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Turns raw inputs (text blobs, uploads, files, directories) into chunk records.
#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    chunker: Chunker,
}

impl DataProcessor {
    pub fn new(chunker: Chunker) -> Self { Self { chunker } }

    /// Chunk a text blob. A `txt-<rand8>` source id is generated when none is given.
    pub fn process_text(&self, text: &str, source_id: Option<&str>) -> Vec<ChunkRecord> {
        let source_id = source_id.map_or_else(|| generated_id("txt"), str::to_string);
        self.chunker.segment(text, &source_id, None)
    }

    /// Chunk pre-extracted pages; blank pages are skipped.
    pub fn process_pages<S: AsRef<str>>(&self, pages: &[S], source_id: &str) -> Vec<ChunkRecord> {
        self.chunker.segment_pages(pages, source_id)
    }

    /// Chunk an uploaded payload. The filename doubles as source id
    /// (`file-<rand8>` when empty). PDF payloads need an external text
    /// extractor and are rejected here.
    pub fn process_bytes(&self, bytes: &[u8], filename: &str) -> Result<Vec<ChunkRecord>> {
        if detect_kind(bytes, filename) == ContentKind::Pdf {
            return Err(Error::Unsupported(format!(
                "'{filename}' is a PDF; extract its pages and use process_pages"
            )));
        }
        let source_id = if filename.is_empty() { generated_id("file") } else { filename.to_string() };
        Ok(self.chunker.segment(&decode_text(bytes), &source_id, None))
    }

    pub fn process_file(&self, file_path: &Path, source_id: &str) -> Result<Vec<ChunkRecord>> {
        if !file_path.is_file() {
            return Err(Error::NotFound(file_path.display().to_string()));
        }
        let bytes = fs::read(file_path)?;
        self.process_bytes(&bytes, source_id)
    }

    pub fn process_directory(&self, data_dir: &Path) -> Result<Vec<ChunkRecord>> {
        self.process_files(data_dir, self.list_text_files(data_dir))
    }

    pub fn process_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<ChunkRecord>> {
        let mut files = self.list_text_files(data_dir);
        if files.len() > limit {
            files.truncate(limit);
            tracing::info!(limit, "limited to first {} files", limit);
        }
        self.process_files(data_dir, files)
    }

    fn process_files(&self, data_dir: &Path, files: Vec<PathBuf>) -> Result<Vec<ChunkRecord>> {
        if files.is_empty() {
            tracing::info!(dir = %data_dir.display(), "no .txt or .md files found");
            return Ok(vec![]);
        }
        let mut all_chunks = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(file = %file_path.display(), "processing file {}/{}", file_index + 1, files.len());
            let source_id = self.source_id_for(file_path, data_dir);
            all_chunks.extend(self.process_file(file_path, &source_id)?);
        }
        tracing::info!(files = files.len(), chunks = all_chunks.len(), "processed directory");
        Ok(all_chunks)
    }

    /// Path relative to the ingested directory, `/`-separated.
    fn source_id_for(&self, file_path: &Path, data_dir: &Path) -> String {
        let relative_path = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn list_text_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if matches!(path.extension().and_then(|s| s.to_str()), Some("txt" | "md")) { files.push(path.to_path_buf()); }
        }
        files.sort(); files
    }
}

fn generated_id(prefix: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &salt[..8])
}
