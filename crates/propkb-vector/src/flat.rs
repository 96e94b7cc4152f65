use anyhow::{ensure, Result};

use propkb_core::traits::VectorIndexer;
use propkb_core::types::{EntryId, SearchHit, SourceKind};

/// Exact nearest-neighbour index over squared L2 distance.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dim: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dim: usize) -> Self {
        Self { dim, data: Vec::new() }
    }

    /// Build from one embedding per corpus entry; every vector must be `dim` long.
    pub fn build(dim: usize, embeddings: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dim);
        index.data.reserve(dim * embeddings.len());
        for (row, v) in embeddings.iter().enumerate() {
            ensure!(v.len() == dim, "row {row} has {} dims, index expects {dim}", v.len());
            index.data.extend_from_slice(v);
        }
        tracing::debug!(rows = embeddings.len(), dim, "built flat L2 index");
        Ok(index)
    }

    /// `(id, squared distance)` of the `k` nearest rows, closest first.
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<(EntryId, f32)>> {
        ensure!(query.len() == self.dim, "query has {} dims, index expects {}", query.len(), self.dim);
        if k == 0 || self.dim == 0 {
            return Ok(Vec::new());
        }
        let mut scored: Vec<(EntryId, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(id, row)| (id, squared_l2(row, query)))
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

/// Similarity derived from a squared L2 distance between unit vectors:
/// `1 - d²/2`, which is their cosine similarity.
pub fn distance_to_score(squared_distance: f32) -> f32 {
    1.0 - squared_distance / 2.0
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndexer for FlatL2Index {
    fn len(&self) -> usize {
        if self.dim == 0 { 0 } else { self.data.len() / self.dim }
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn vector(&self, id: EntryId) -> Option<&[f32]> {
        if self.dim == 0 {
            return None;
        }
        self.data.chunks_exact(self.dim).nth(id)
    }

    fn search_vec(&self, query_vec: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        Ok(self
            .nearest(query_vec, k)?
            .into_iter()
            .map(|(id, d)| SearchHit { id, score: distance_to_score(d), source: SourceKind::Dense })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(v: &[f32]) -> Vec<f32> {
        let n = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.iter().map(|x| x / n).collect()
    }

    #[test]
    fn nearest_rows_first() {
        let rows = vec![unit(&[1.0, 0.0]), unit(&[0.0, 1.0]), unit(&[1.0, 1.0])];
        let index = FlatL2Index::build(2, &rows).expect("build");
        let hits = index.search_vec(&unit(&[1.0, 0.1]), 2).expect("search");
        let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(hits[0].score > hits[1].score);
        assert!(hits.iter().all(|h| h.source == SourceKind::Dense));
    }

    #[test]
    fn score_is_cosine_for_unit_vectors() {
        let a = unit(&[3.0, 4.0]);
        let b = unit(&[4.0, 3.0]);
        let cos: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
        let index = FlatL2Index::build(2, &[a]).expect("build");
        let hits = index.search_vec(&b, 1).expect("search");
        assert!((hits[0].score - cos).abs() < 1e-5);
    }

    #[test]
    fn k_larger_than_rows_and_zero_k() {
        let index = FlatL2Index::build(2, &[vec![1.0, 0.0]]).expect("build");
        assert_eq!(index.search_vec(&[1.0, 0.0], 10).expect("search").len(), 1);
        assert!(index.search_vec(&[1.0, 0.0], 0).expect("search").is_empty());
    }

    #[test]
    fn rejects_dimension_mismatch() {
        assert!(FlatL2Index::build(3, &[vec![1.0, 0.0]]).is_err());
        let index = FlatL2Index::build(2, &[vec![1.0, 0.0]]).expect("build");
        assert!(index.search_vec(&[1.0, 0.0, 0.0], 1).is_err());
    }

    #[test]
    fn rows_are_addressable_by_id() {
        let index = FlatL2Index::build(2, &[vec![1.0, 0.0], vec![0.0, 1.0]]).expect("build");
        assert_eq!(index.len(), 2);
        assert_eq!(index.vector(1), Some(&[0.0f32, 1.0][..]));
        assert_eq!(index.vector(2), None);
        assert!(FlatL2Index::new(4).is_empty());
    }
}
