use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{ChunkingSettings, Settings};
use crate::error::Result;
use crate::types::{Chunk, Corpus, Domain};

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "pdf"];

/// Builds per-domain corpora from directories of `.txt`, `.md` and `.pdf` files.
#[derive(Debug, Clone, Default)]
pub struct DataProcessor {
    chunking_config: ChunkingSettings,
    min_chunks_warning: usize,
}

impl DataProcessor {
    pub fn new() -> Self { Self::default() }

    pub fn with_chunking(chunking_config: ChunkingSettings) -> Self {
        Self { chunking_config, min_chunks_warning: 0 }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self { chunking_config: settings.chunking.clone(), min_chunks_warning: settings.retrieval.min_chunks_warning }
    }

    /// Loads every configured domain directory, in domain declaration order.
    pub fn load_all(&self, settings: &Settings) -> Result<Vec<Corpus>> {
        Domain::ALL.iter().map(|d| self.load_corpus(*d, &settings.data.dir_for(*d))).collect()
    }

    /// A missing directory yields an empty corpus rather than an error.
    pub fn load_corpus(&self, domain: Domain, data_dir: &Path) -> Result<Corpus> {
        if !data_dir.exists() {
            warn!(domain = %domain, dir = %data_dir.display(), "corpus directory does not exist; using empty corpus");
            return Ok(Corpus::empty(domain));
        }
        let files = self.list_source_files(data_dir);
        if files.is_empty() {
            warn!(domain = %domain, dir = %data_dir.display(), "no .txt, .md or .pdf files found");
        }
        let mut chunks = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(domain = %domain, "processing file {}/{}: {}", file_index + 1, files.len(), file_path.display());
            let Some(content) = self.read_file_content(file_path)? else { continue };
            let source_id = self.source_id(file_path, data_dir);
            chunks.extend(self.chunk_content(domain, &source_id, &content));
        }
        info!(domain = %domain, collection = domain.collection(), files = files.len(), chunks = chunks.len(), "loaded corpus");
        if chunks.len() < self.min_chunks_warning {
            warn!(
                domain = %domain,
                "only {} chunks found for {}; at least {} recommended",
                chunks.len(),
                domain.collection(),
                self.min_chunks_warning
            );
        }
        Corpus::new(domain, chunks)
    }

    /// `None` for a PDF whose text cannot be extracted; the file is skipped.
    fn read_file_content(&self, file_path: &Path) -> Result<Option<String>> {
        if is_pdf(file_path) {
            return match pdf_extract::extract_text(file_path) {
                Ok(text) => Ok(Some(text)),
                Err(e) => {
                    warn!(file = %file_path.display(), "skipping unreadable PDF: {}", e);
                    Ok(None)
                }
            };
        }
        match fs::read_to_string(file_path) {
            Ok(content) => Ok(Some(content)),
            Err(_) => Ok(Some(String::from_utf8_lossy(&fs::read(file_path)?).to_string())),
        }
    }

    fn source_id(&self, file_path: &Path, data_dir: &Path) -> String {
        let relative_path = file_path.strip_prefix(data_dir).unwrap_or(file_path);
        relative_path.to_string_lossy().replace('\\', "/")
    }

    /// Splits `content` with an overlapping character window. Content no longer
    /// than one window becomes a single chunk.
    pub fn chunk_content(&self, domain: Domain, source_id: &str, content: &str) -> Vec<Chunk> {
        let size = self.chunking_config.chunk_size.max(1);
        let step = size.saturating_sub(self.chunking_config.chunk_overlap).max(1);
        let boundaries: Vec<usize> = content.char_indices().map(|(i, _)| i).chain(std::iter::once(content.len())).collect();
        let char_len = boundaries.len() - 1;

        let mut chunks = Vec::new();
        if char_len <= size {
            if !content.trim().is_empty() {
                chunks.push(Chunk::new(domain, source_id, 0, content));
            }
            return chunks;
        }
        let mut start = 0usize;
        while start < char_len {
            let end = (start + size).min(char_len);
            let segment = &content[boundaries[start]..boundaries[end]];
            if !segment.trim().is_empty() {
                chunks.push(Chunk::new(domain, source_id, chunks.len(), segment));
            }
            if end >= char_len { break; }
            start += step;
        }
        chunks
    }

    fn list_source_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            let supported = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
            if supported { files.push(path.to_path_buf()); }
        }
        files.sort(); files
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()).is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
