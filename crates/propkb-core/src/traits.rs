use crate::types::{EntryId, SearchHit};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    /// One L2-normalized vector of length `dim()` per input text.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Sparse (term-weighted) side of the hybrid index.
pub trait TextIndexer: Send + Sync {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Dense (embedding) side of the hybrid index.
pub trait VectorIndexer: Send + Sync {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn dim(&self) -> usize;
    fn vector(&self, id: EntryId) -> Option<&[f32]>;
    fn search_vec(&self, query_vec: &[f32], k: usize) -> anyhow::Result<Vec<SearchHit>>;
}

/// Anything that answers single-hop queries over a corpus it can read back.
pub trait SearchEngine: Send + Sync {
    fn query(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>>;
    fn content(&self, id: EntryId) -> Option<&str>;
}
