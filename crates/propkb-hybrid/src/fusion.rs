use std::collections::HashSet;

use propkb_core::types::{sort_hits_desc, FusionStrategy, SearchHit};

const FLAT_RANGE: f32 = 1e-9;

/// Merge dense and sparse hits into at most `k` results.
///
/// Dense hits are inserted first, so an id found by both engines keeps its
/// dense score and label. The sort is stable: equal scores keep dense hits
/// ahead of sparse ones.
pub fn fuse(dense: Vec<SearchHit>, sparse: Vec<SearchHit>, k: usize, strategy: FusionStrategy) -> Vec<SearchHit> {
    if k == 0 {
        return Vec::new();
    }
    let (dense, sparse) = match strategy {
        FusionStrategy::ScoreSort => (dense, sparse),
        FusionStrategy::MinMax => (min_max(dense), min_max(sparse)),
    };

    let mut seen = HashSet::with_capacity(dense.len() + sparse.len());
    let mut merged: Vec<SearchHit> = dense
        .into_iter()
        .chain(sparse)
        .filter(|hit| seen.insert(hit.id))
        .collect();
    sort_hits_desc(&mut merged);
    merged.truncate(k);
    merged
}

/// Rescale scores to `[0, 1]`; a list with a single distinct score maps to 1.0.
fn min_max(mut hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let Some(lo) = hits.iter().map(|h| h.score).reduce(f32::min) else {
        return hits;
    };
    let hi = hits.iter().map(|h| h.score).fold(lo, f32::max);
    let range = hi - lo;
    for hit in &mut hits {
        hit.score = if range <= FLAT_RANGE { 1.0 } else { (hit.score - lo) / range };
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use propkb_core::types::SourceKind;

    fn dense(id: usize, score: f32) -> SearchHit {
        SearchHit { id, score, source: SourceKind::Dense }
    }

    fn sparse(id: usize, score: f32) -> SearchHit {
        SearchHit { id, score, source: SourceKind::Sparse }
    }

    #[test]
    fn duplicate_ids_keep_the_dense_hit() {
        let out = fuse(vec![dense(1, 0.2), dense(2, 0.1)], vec![sparse(1, 0.9), sparse(3, 0.5)], 10, FusionStrategy::ScoreSort);
        let ids: Vec<_> = out.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        let one = out.iter().find(|h| h.id == 1).expect("id 1");
        assert_eq!(one.source, SourceKind::Dense);
        assert_eq!(one.score, 0.2);
    }

    #[test]
    fn equal_scores_keep_dense_first() {
        let out = fuse(vec![dense(4, 0.5)], vec![sparse(7, 0.5)], 2, FusionStrategy::ScoreSort);
        assert_eq!(out[0].id, 4);
        assert_eq!(out[1].id, 7);
    }

    #[test]
    fn truncates_to_k_in_descending_order() {
        let out = fuse(
            vec![dense(0, 0.3), dense(1, 0.8), dense(2, 0.1)],
            vec![sparse(3, 0.6), sparse(4, 0.05)],
            3,
            FusionStrategy::ScoreSort,
        );
        assert_eq!(out.len(), 3);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(fuse(vec![dense(0, 1.0)], vec![], 0, FusionStrategy::ScoreSort).is_empty());
    }

    #[test]
    fn min_max_rescales_each_side() {
        let out = fuse(vec![dense(0, 0.9), dense(1, 0.7)], vec![sparse(2, 0.02), sparse(3, 0.01)], 4, FusionStrategy::MinMax);
        let score = |id| out.iter().find(|h| h.id == id).map(|h| h.score).expect("hit");
        assert_eq!(score(0), 1.0);
        assert_eq!(score(1), 0.0);
        assert_eq!(score(2), 1.0);
        assert_eq!(score(3), 0.0);
        // dense wins the tie at 1.0
        assert_eq!(out[0].id, 0);
    }

    #[test]
    fn min_max_flat_list_is_all_ones() {
        let out = fuse(vec![dense(0, 0.4), dense(1, 0.4)], vec![], 2, FusionStrategy::MinMax);
        assert!(out.iter().all(|h| h.score == 1.0));
    }
}
