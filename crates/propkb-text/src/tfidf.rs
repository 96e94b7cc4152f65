//! TF-IDF vectorizer with smoothed idf and L2-normalized rows.
//!
//! `idf(t) = ln((1 + n) / (1 + df(t))) + 1`, term weight = raw count * idf.

use std::collections::{BTreeMap, HashMap};

use tantivy::tokenizer::TextAnalyzer;

use crate::tantivy_utils::{analyze, build_analyzer};

/// Sparse row: `(term index, weight)` sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
	entries: Vec<(u32, f32)>,
}

impl SparseVector {
	fn from_weights(weights: BTreeMap<u32, f32>) -> Self {
		let norm = weights.values().map(|w| w * w).sum::<f32>().sqrt();
		if norm == 0.0 {
			return Self::default();
		}
		Self { entries: weights.into_iter().map(|(t, w)| (t, w / norm)).collect() }
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn nnz(&self) -> usize {
		self.entries.len()
	}

	pub fn entries(&self) -> &[(u32, f32)] {
		&self.entries
	}

	/// Dot product; equals cosine similarity since rows are unit length.
	pub fn dot(&self, other: &SparseVector) -> f32 {
		let (mut i, mut j, mut sum) = (0, 0, 0.0f32);
		while i < self.entries.len() && j < other.entries.len() {
			let (a, wa) = self.entries[i];
			let (b, wb) = other.entries[j];
			match a.cmp(&b) {
				std::cmp::Ordering::Less => i += 1,
				std::cmp::Ordering::Greater => j += 1,
				std::cmp::Ordering::Equal => {
					sum += wa * wb;
					i += 1;
					j += 1;
				}
			}
		}
		sum
	}
}

#[derive(Clone)]
pub struct TfidfVectorizer {
	analyzer: TextAnalyzer,
	vocabulary: HashMap<String, u32>,
	idf: Vec<f32>,
}

impl TfidfVectorizer {
	/// Learn vocabulary and idf from `texts`, returning the fitted vectorizer
	/// and one row per text in input order.
	pub fn fit_transform(texts: &[String]) -> (Self, Vec<SparseVector>) {
		let mut analyzer = build_analyzer();
		let docs: Vec<Vec<String>> = texts.iter().map(|t| analyze(&mut analyzer, t)).collect();

		let mut df: BTreeMap<&str, usize> = BTreeMap::new();
		for terms in &docs {
			let mut seen: Vec<&str> = terms.iter().map(String::as_str).collect();
			seen.sort_unstable();
			seen.dedup();
			for term in seen {
				*df.entry(term).or_insert(0) += 1;
			}
		}

		let n = texts.len() as f32;
		let mut vocabulary = HashMap::with_capacity(df.len());
		let mut idf = Vec::with_capacity(df.len());
		for (index, (term, count)) in df.into_iter().enumerate() {
			vocabulary.insert(term.to_string(), index as u32);
			idf.push(((1.0 + n) / (1.0 + count as f32)).ln() + 1.0);
		}

		let vectorizer = Self { analyzer, vocabulary, idf };
		let rows = docs.iter().map(|terms| vectorizer.weigh(terms)).collect();
		(vectorizer, rows)
	}

	/// Vectorize `text` with the fitted vocabulary; unknown terms are ignored.
	pub fn transform(&self, text: &str) -> SparseVector {
		let mut analyzer = self.analyzer.clone();
		let terms = analyze(&mut analyzer, text);
		self.weigh(&terms)
	}

	pub fn vocabulary_len(&self) -> usize {
		self.vocabulary.len()
	}

	pub fn idf(&self, term: &str) -> Option<f32> {
		self.vocabulary.get(term).map(|&i| self.idf[i as usize])
	}

	fn weigh(&self, terms: &[String]) -> SparseVector {
		let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
		for term in terms {
			if let Some(&index) = self.vocabulary.get(term) {
				*counts.entry(index).or_insert(0.0) += 1.0;
			}
		}
		for (index, weight) in counts.iter_mut() {
			*weight *= self.idf[*index as usize];
		}
		SparseVector::from_weights(counts)
	}
}
