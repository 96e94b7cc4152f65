//! propkb-text
//!
//! Sparse retrieval: a tantivy analyzer pipeline feeding an in-memory TF-IDF
//! matrix searched by cosine similarity.

pub mod index;
pub mod tantivy_utils;
pub mod tfidf;

pub use index::TfidfIndex;
pub use tfidf::{SparseVector, TfidfVectorizer};
