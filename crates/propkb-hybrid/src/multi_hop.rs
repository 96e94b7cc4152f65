//! Two-hop retrieval: the text of the best first-hop hits is appended to the
//! query and searched again.

use anyhow::Result;
use indexmap::IndexMap;
use tracing::debug;

use propkb_core::config::MultiHopSettings;
use propkb_core::sanitize;
use propkb_core::traits::SearchEngine;
use propkb_core::types::{sort_hits_desc, EntryId, SearchHit};

pub struct MultiHopRetriever<'a, S: SearchEngine + ?Sized> {
    engine: &'a S,
    settings: MultiHopSettings,
}

impl<'a, S: SearchEngine + ?Sized> MultiHopRetriever<'a, S> {
    pub fn new(engine: &'a S, settings: MultiHopSettings) -> Self {
        Self { engine, settings }
    }

    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let query = sanitize(query);
        let first_k = k.saturating_mul(self.settings.first_hop_factor.max(1));
        let first = self.engine.query(&query, first_k)?;
        if first.is_empty() {
            return Ok(Vec::new());
        }

        let refined = self.refine_query(&query, &first);
        let second = self.engine.query(&refined, k)?;
        debug!(first = first.len(), second = second.len(), "multi-hop candidates");
        Ok(merge_keep_best(first, second, k))
    }

    /// The query followed by the leading characters of the top seed hits.
    pub fn refine_query(&self, query: &str, first: &[SearchHit]) -> String {
        let mut refined = query.to_string();
        for hit in first.iter().take(self.settings.seed_results) {
            let Some(content) = self.engine.content(hit.id) else { continue };
            let snippet: String = content.chars().take(self.settings.snippet_chars).collect();
            refined.push(' ');
            refined.push_str(&snippet);
        }
        sanitize(&refined)
    }
}

/// Union of both hops by id. A repeated id keeps its higher score; on an
/// exact tie the earlier hit stays.
pub fn merge_keep_best(first: Vec<SearchHit>, second: Vec<SearchHit>, k: usize) -> Vec<SearchHit> {
    let mut best: IndexMap<EntryId, SearchHit> = IndexMap::with_capacity(first.len() + second.len());
    for hit in first.into_iter().chain(second) {
        best.entry(hit.id)
            .and_modify(|kept| {
                if hit.score > kept.score {
                    *kept = hit;
                }
            })
            .or_insert(hit);
    }
    let mut merged: Vec<SearchHit> = best.into_values().collect();
    sort_hits_desc(&mut merged);
    merged.truncate(k);
    merged
}
