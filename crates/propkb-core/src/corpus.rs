//! Corpus loading: discover proposal files, segment them into sections and
//! attach filename metadata.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::sanitize::sanitize;
use crate::segment::segment_markdown;
use crate::types::{CorpusEntry, EntryId, ProposalMetadata};

/// Ordered corpus entries; `entries[i].id == i`.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub entries: Vec<CorpusEntry>,
    pub sources: Vec<PathBuf>,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&CorpusEntry> {
        self.entries.get(id)
    }

    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.content.clone()).collect()
    }

    /// Append the sections of one document, assigning the next dense ids.
    pub fn push_document(&mut self, source_name: &str, text: &str) -> usize {
        let source_name = sanitize(source_name);
        let metadata = parse_metadata(&source_name);
        let sections = segment_markdown(&sanitize(text));
        let added = sections.len();
        for (section_name, content) in sections {
            let id = self.entries.len();
            self.entries.push(CorpusEntry {
                id,
                source_name: source_name.clone(),
                section_name: sanitize(&section_name),
                content: sanitize(&content),
                metadata: metadata.clone(),
            });
        }
        added
    }
}

#[derive(Debug, Clone)]
pub struct CorpusLoader {
    extensions: Vec<String>,
    max_depth: usize,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self { extensions: vec!["md".to_string(), "txt".to_string()], max_depth: 1 }
    }
}

impl CorpusLoader {
    pub fn new(extensions: Vec<String>, max_depth: usize) -> Self {
        Self { extensions, max_depth: max_depth.max(1) }
    }

    /// Load every matching file under `root`. Unreadable files are skipped;
    /// a missing directory is an empty corpus.
    pub fn load_directory(&self, root: &Path) -> Corpus {
        let files = self.list_files(root);
        let mut corpus = Corpus::default();
        if files.is_empty() {
            info!(dir = %root.display(), "no proposal documents found");
            return corpus;
        }
        for path in files {
            let text = match read_file_content(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable document");
                    continue;
                }
            };
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let added = corpus.push_document(&name, &text);
            debug!(file = %name, sections = added, "segmented document");
            corpus.sources.push(path);
        }
        info!(documents = corpus.sources.len(), sections = corpus.len(), "loaded corpus");
        corpus
    }

    /// Matching files in sorted order.
    pub fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| self.has_extension(p))
            .collect();
        files.sort();
        files
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
    }
}

/// Read a file, decoding invalid UTF-8 lossily.
pub fn read_file_content(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

/// Parse `_industry_X_`, `_size_X_` and `_success_X_` markers from a file
/// name. The extension is ignored; missing markers keep their defaults.
pub fn parse_metadata(file_name: &str) -> ProposalMetadata {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let mut meta = ProposalMetadata::default();
    if let Some(v) = marker_value(&stem, "_success_") {
        meta.proposal_success = v.eq_ignore_ascii_case("true");
    }
    if let Some(v) = marker_value(&stem, "_industry_") {
        meta.client_industry = sanitize(v);
    }
    if let Some(v) = marker_value(&stem, "_size_") {
        meta.project_size = sanitize(v);
    }
    meta
}

fn marker_value<'a>(stem: &'a str, marker: &str) -> Option<&'a str> {
    let (_, rest) = stem.split_once(marker)?;
    Some(rest.split('_').next().unwrap_or(rest))
}
