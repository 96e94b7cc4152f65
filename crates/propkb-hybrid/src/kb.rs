//! The knowledge base façade.
//!
//! Searches run against an immutable [`Snapshot`]. A reload builds the next
//! snapshot without holding the read lock and then flips the active pointer,
//! so readers always see either the old or the new index, never a mix.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use tracing::{debug, error, info};

use propkb_core::config::KbSettings;
use propkb_core::corpus::{Corpus, CorpusLoader};
use propkb_core::error::{Error, Result};
use propkb_core::pricing;
use propkb_core::sanitize;
use propkb_core::traits::{Embedder, SearchEngine, VectorIndexer};
use propkb_core::types::{CorpusEntry, EntryId, FusionStrategy, SearchHit, SearchResult};
use propkb_embed::{get_default_embedder, weighted_document_pool, HierarchicalEncoder};

use crate::expand::expand_query;
use crate::index::HybridIndex;
use crate::multi_hop::MultiHopRetriever;
use crate::sections::SectionIndex;

/// One consistent build: corpus, section lookup and hybrid index.
pub struct Snapshot {
    corpus: Corpus,
    sections: SectionIndex,
    index: HybridIndex,
    encoder: Arc<HierarchicalEncoder>,
    fusion: FusionStrategy,
}

impl Snapshot {
    pub fn build(corpus: Corpus, encoder: Arc<HierarchicalEncoder>, fusion: FusionStrategy) -> Result<Self> {
        let index = HybridIndex::build(&corpus.texts(), &encoder)?;
        if index.len() != corpus.len() {
            return Err(Error::IndexBuild(format!("index has {} rows for {} entries", index.len(), corpus.len())));
        }
        let sections = SectionIndex::build(&corpus.entries);
        Ok(Self { corpus, sections, index, encoder, fusion })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn sections(&self) -> &SectionIndex {
        &self.sections
    }

    pub fn index(&self) -> &HybridIndex {
        &self.index
    }

    pub fn hybrid_hits(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.index.search(&self.encoder, query, k, self.fusion)
    }

    fn resolve(&self, hits: &[SearchHit]) -> Vec<SearchResult> {
        hits.iter()
            .filter_map(|hit| self.corpus.get(hit.id).map(|entry| SearchResult { score: hit.score, entry: entry.clone() }))
            .collect()
    }
}

impl SearchEngine for Snapshot {
    fn query(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> {
        Ok(self.hybrid_hits(query, k)?)
    }

    fn content(&self, id: EntryId) -> Option<&str> {
        self.corpus.get(id).map(|entry| entry.content.as_str())
    }
}

enum IndexState {
    /// Nothing has been built yet.
    Empty,
    Ready(Snapshot),
    /// The last rebuild failed; searches report the reason.
    Unusable(String),
}

impl IndexState {
    fn snapshot(&self) -> Result<Option<&Snapshot>> {
        match self {
            IndexState::Empty => Ok(None),
            IndexState::Ready(snapshot) => Ok(Some(snapshot)),
            IndexState::Unusable(reason) => Err(Error::Unusable(reason.clone())),
        }
    }
}

pub struct KnowledgeBase {
    settings: KbSettings,
    corpus_dir: PathBuf,
    loader: CorpusLoader,
    encoder: Arc<HierarchicalEncoder>,
    active: RwLock<Arc<IndexState>>,
    rebuild: Mutex<()>,
}

impl KnowledgeBase {
    /// Open the knowledge base with the configured embedder and build the
    /// first index.
    pub fn open(settings: KbSettings) -> Result<Self> {
        let embedder = get_default_embedder(&settings.embedding).map_err(Error::encoding)?;
        Self::with_embedder(settings, embedder)
    }

    pub fn with_embedder(settings: KbSettings, embedder: Box<dyn Embedder>) -> Result<Self> {
        let corpus_dir = settings.corpus_dir();
        if !corpus_dir.exists() {
            fs::create_dir_all(&corpus_dir).map_err(|source| Error::Io { path: corpus_dir.clone(), source })?;
            info!(dir = %corpus_dir.display(), "created corpus directory");
        }
        let loader = CorpusLoader::new(settings.extensions.clone(), settings.max_depth);
        let kb = Self {
            settings,
            corpus_dir,
            loader,
            encoder: Arc::new(HierarchicalEncoder::new(embedder)),
            active: RwLock::new(Arc::new(IndexState::Empty)),
            rebuild: Mutex::new(()),
        };
        kb.reload()?;
        Ok(kb)
    }

    /// Re-read the corpus directory and swap in a fresh index. Returns the
    /// number of indexed sections.
    pub fn reload(&self) -> Result<usize> {
        let _guard = self.rebuild.lock().unwrap_or_else(PoisonError::into_inner);
        let start = Instant::now();
        let corpus = self.loader.load_directory(&self.corpus_dir);
        let documents = corpus.sources.len();
        match Snapshot::build(corpus, Arc::clone(&self.encoder), self.settings.retrieval.fusion) {
            Ok(snapshot) => {
                let entries = snapshot.corpus.len();
                self.activate(IndexState::Ready(snapshot));
                info!(documents, entries, ms = start.elapsed().as_millis() as u64, "knowledge base ready");
                Ok(entries)
            }
            Err(err) => {
                error!(error = %err, "index rebuild failed; knowledge base unusable");
                self.activate(IndexState::Unusable(err.to_string()));
                Err(err)
            }
        }
    }

    fn activate(&self, state: IndexState) {
        let next = Arc::new(state);
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *active = next;
    }

    fn current(&self) -> Arc<IndexState> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn prepare_query(&self, query: &str) -> String {
        let query = sanitize(query);
        if self.settings.retrieval.expand_queries {
            expand_query(&query)
        } else {
            query
        }
    }

    pub fn hybrid_search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let state = self.current();
        let Some(snapshot) = state.snapshot()? else {
            return Ok(Vec::new());
        };
        let query = self.prepare_query(query);
        let hits = snapshot.hybrid_hits(&query, k)?;
        debug!(query = %query, k, hits = hits.len(), "hybrid search");
        Ok(snapshot.resolve(&hits))
    }

    pub fn multi_hop_search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let state = self.current();
        let Some(snapshot) = state.snapshot()? else {
            return Ok(Vec::new());
        };
        let query = self.prepare_query(query);
        let hits = MultiHopRetriever::new(snapshot, self.settings.retrieval.multi_hop)
            .search(&query, k)
            .map_err(into_core_error)?;
        debug!(query = %query, k, hits = hits.len(), "multi-hop search");
        Ok(snapshot.resolve(&hits))
    }

    /// Entries whose section name matches `name` exactly, in id order.
    pub fn section_documents(&self, name: &str) -> Result<Vec<CorpusEntry>> {
        self.with_snapshot(|s| {
            s.sections.ids(name).iter().filter_map(|&id| s.corpus.get(id).cloned()).collect()
        })
    }

    pub fn section_names(&self) -> Result<Vec<String>> {
        self.with_snapshot(|s| s.sections.names())
    }

    pub fn common_section_names(&self, top_n: usize) -> Result<Vec<String>> {
        self.with_snapshot(|s| s.sections.most_common(top_n).into_iter().map(|(name, _)| name).collect())
    }

    pub fn entry(&self, id: EntryId) -> Result<Option<CorpusEntry>> {
        self.with_snapshot(|s| s.corpus.get(id).cloned())
    }

    /// Indexed sections; 0 while empty or unusable.
    pub fn len(&self) -> usize {
        match self.current().as_ref() {
            IndexState::Ready(snapshot) => snapshot.corpus.len(),
            IndexState::Empty | IndexState::Unusable(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_usable(&self) -> bool {
        !matches!(self.current().as_ref(), IndexState::Unusable(_))
    }

    /// Pooled vector of one source document's stored section vectors.
    pub fn document_embedding(&self, source_name: &str) -> Result<Option<Vec<f32>>> {
        let source_name = sanitize(source_name);
        self.with_snapshot(|s| {
            let vectors: Vec<Vec<f32>> = s
                .corpus
                .entries
                .iter()
                .filter(|e| e.source_name == source_name)
                .filter_map(|e| s.index.vector().vector(e.id).map(<[f32]>::to_vec))
                .collect();
            if vectors.is_empty() {
                None
            } else {
                Some(weighted_document_pool(&vectors, s.index.vector().dim()))
            }
        })
    }

    /// Prices from the commercial section of every source document.
    pub fn extract_prices(&self) -> Vec<i64> {
        pricing::extract_prices(&self.corpus_dir, &self.loader)
    }

    pub fn settings(&self) -> &KbSettings {
        &self.settings
    }

    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// Run `f` on the active snapshot. Before the first build this yields
    /// the default; after a failed rebuild it is `Error::Unusable`.
    fn with_snapshot<T: Default>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T> {
        let state = self.current();
        Ok(state.snapshot()?.map(f).unwrap_or_default())
    }
}

fn into_core_error(err: anyhow::Error) -> Error {
    match err.downcast::<Error>() {
        Ok(err) => err,
        Err(other) => Error::Search(format!("{other:#}")),
    }
}
