//! Domain types shared by the segmenter, the index engines and the façade.

use serde::{Deserialize, Serialize};

/// Dense 0-based position of an entry in the corpus.
pub type EntryId = usize;

/// Attributes of a past proposal, parsed from its file name.
///
/// The field set is closed; absent attributes take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalMetadata {
    pub client_industry: String,
    pub proposal_success: bool,
    pub project_size: String,
    pub key_differentiators: Vec<String>,
}

impl Default for ProposalMetadata {
    fn default() -> Self {
        Self {
            client_industry: "general".to_string(),
            proposal_success: true,
            project_size: "medium".to_string(),
            key_differentiators: vec!["quality".to_string(), "experience".to_string()],
        }
    }
}

/// One retrievable section of a source document.
///
/// - `id`: dense index into the corpus; index rows map 1:1 to it
/// - `source_name`: sanitized file name the section came from
/// - `section_name`: sanitized heading; shared across documents
/// - `content`: sanitized body text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub id: EntryId,
    pub source_name: String,
    pub section_name: String,
    pub content: String,
    pub metadata: ProposalMetadata,
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Dense,
    Sparse,
}

/// The minimal surface returned by both engines.
///
/// `id` matches `CorpusEntry::id`. `score` is engine-specific but
/// higher is always better. `source` labels the origin engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: EntryId,
    pub score: f32,
    pub source: SourceKind,
}

/// A hit resolved against the corpus. Scores are only meaningful within
/// a single result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub score: f32,
    pub entry: CorpusEntry,
}

/// How dense and sparse hit lists are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    /// Merge both lists and sort on the raw scores.
    #[default]
    ScoreSort,
    /// Rescale each list to `[0, 1]` before merging.
    MinMax,
}

/// Sort hits by descending score. Stable, so equal scores keep their
/// insertion order.
pub fn sort_hits_desc(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}
