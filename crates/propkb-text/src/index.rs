use propkb_core::traits::TextIndexer;
use propkb_core::types::{SearchHit, SourceKind};

use crate::tfidf::{SparseVector, TfidfVectorizer};

/// In-memory TF-IDF matrix, one row per corpus entry in id order.
#[derive(Clone)]
pub struct TfidfIndex {
	vectorizer: TfidfVectorizer,
	rows: Vec<SparseVector>,
}

impl TfidfIndex {
	pub fn build(texts: &[String]) -> Self {
		let (vectorizer, rows) = TfidfVectorizer::fit_transform(texts);
		tracing::debug!(rows = rows.len(), terms = vectorizer.vocabulary_len(), "built tf-idf matrix");
		Self { vectorizer, rows }
	}

	/// Cosine similarity of `query` against every row.
	pub fn similarities(&self, query: &str) -> Vec<f32> {
		let q = self.vectorizer.transform(query);
		self.rows.iter().map(|row| q.dot(row)).collect()
	}
}

impl TextIndexer for TfidfIndex {
	fn len(&self) -> usize {
		self.rows.len()
	}

	/// Top-`k` rows by cosine similarity; rows that share no term with the
	/// query are not hits. Equal scores rank by id.
	fn search(&self, query: &str, k: usize) -> anyhow::Result<Vec<SearchHit>> {
		if k == 0 || self.rows.is_empty() {
			return Ok(Vec::new());
		}
		let mut hits: Vec<SearchHit> = self
			.similarities(query)
			.into_iter()
			.enumerate()
			.filter(|(_, score)| *score > 0.0)
			.map(|(id, score)| SearchHit { id, score, source: SourceKind::Sparse })
			.collect();
		propkb_core::types::sort_hits_desc(&mut hits);
		hits.truncate(k);
		Ok(hits)
	}
}
