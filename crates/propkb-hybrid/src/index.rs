use tracing::{debug, info};

use propkb_core::error::{Error, Result};
use propkb_core::sanitize;
use propkb_core::traits::{TextIndexer, VectorIndexer};
use propkb_core::types::{FusionStrategy, SearchHit};
use propkb_embed::HierarchicalEncoder;
use propkb_text::index::TfidfIndex;
use propkb_vector::FlatL2Index;

use crate::fusion::fuse;

/// Dense and sparse indexes over the same ordered texts: row `i` of each
/// side is corpus entry `i`.
pub struct HybridIndex<TI = TfidfIndex, VI = FlatL2Index>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    text: TI,
    vector: VI,
}

impl HybridIndex {
    /// Encode every text at section level and fit TF-IDF on the same texts.
    pub fn build(texts: &[String], encoder: &HierarchicalEncoder) -> Result<Self> {
        let cleaned: Vec<String> = texts.iter().map(|t| sanitize(t)).collect();
        let embeddings = encoder.encode_sections(&cleaned)?;
        let vector = FlatL2Index::build(encoder.dim(), &embeddings).map_err(|e| Error::IndexBuild(format!("{e:#}")))?;
        let text = TfidfIndex::build(&cleaned);
        let index = Self::from_parts(text, vector)?;
        info!(rows = index.len(), dim = encoder.dim(), "built hybrid index");
        Ok(index)
    }
}

impl<TI, VI> HybridIndex<TI, VI>
where
    TI: TextIndexer,
    VI: VectorIndexer,
{
    pub fn from_parts(text: TI, vector: VI) -> Result<Self> {
        if text.len() != vector.len() {
            return Err(Error::IndexBuild(format!(
                "sparse index has {} rows but dense index has {}",
                text.len(),
                vector.len()
            )));
        }
        Ok(Self { text, vector })
    }

    pub fn len(&self) -> usize {
        self.vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vector.is_empty()
    }

    pub fn text(&self) -> &TI {
        &self.text
    }

    pub fn vector(&self) -> &VI {
        &self.vector
    }

    pub fn search(&self, encoder: &HierarchicalEncoder, query: &str, k: usize, fusion: FusionStrategy) -> Result<Vec<SearchHit>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if encoder.dim() != self.vector.dim() {
            return Err(Error::Encoding(format!(
                "encoder produces {}-dim vectors but the index holds {}",
                encoder.dim(),
                self.vector.dim()
            )));
        }
        let query = sanitize(query);
        let query_vec = encoder.encode_query(&query)?;
        let dense = self.vector.search_vec(&query_vec, k).map_err(|e| Error::Search(format!("{e:#}")))?;
        let sparse = self.text.search(&query, k).map_err(|e| Error::Search(format!("{e:#}")))?;
        debug!(query = %query, dense = dense.len(), sparse = sparse.len(), "hybrid candidates");
        Ok(fuse(dense, sparse, k, fusion))
    }
}
