//! Section- and document-level encoding around a black-box `Embedder`.
//!
//! Every text is sanitized before it reaches the encoder. Encoder failures
//! and malformed encoder output both surface as `Error::Encoding`.

use propkb_core::error::{Error, Result};
use propkb_core::sanitize;
use propkb_core::traits::Embedder;

use crate::pool::weighted_document_pool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeLevel {
    /// One vector per text.
    Section,
    /// The texts are the ordered sections of one document; pool them.
    Document,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Encoded {
    Sections(Vec<Vec<f32>>),
    Document(Vec<f32>),
}

pub struct HierarchicalEncoder {
    embedder: Box<dyn Embedder>,
}

impl HierarchicalEncoder {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    pub fn encode(&self, texts: &[String], level: EncodeLevel) -> Result<Encoded> {
        match level {
            EncodeLevel::Section => self.encode_sections(texts).map(Encoded::Sections),
            EncodeLevel::Document => self.encode_document(texts).map(Encoded::Document),
        }
    }

    pub fn encode_sections(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let cleaned: Vec<String> = texts.iter().map(|t| sanitize(t)).collect();
        let vectors = self.embedder.embed_batch(&cleaned).map_err(|e| Error::Encoding(format!("{e:#}")))?;
        if vectors.len() != texts.len() {
            return Err(Error::Encoding(format!("encoder returned {} vectors for {} texts", vectors.len(), texts.len())));
        }
        let dim = self.dim();
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::Encoding(format!("encoder returned a {}-dim vector, expected {dim}", bad.len())));
        }
        Ok(vectors)
    }

    /// Pooled document vector: later sections weigh more (0.1 up to 1.0).
    pub fn encode_document(&self, sections: &[String]) -> Result<Vec<f32>> {
        let vectors = self.encode_sections(sections)?;
        Ok(weighted_document_pool(&vectors, self.dim()))
    }

    pub fn encode_query(&self, query: &str) -> Result<Vec<f32>> {
        self.encode_sections(&[query.to_string()])?
            .pop()
            .ok_or_else(|| Error::Encoding("encoder returned no vector for query".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FakeEmbedder;

    struct Broken;
    impl Embedder for Broken {
        fn dim(&self) -> usize { 4 }
        fn max_len(&self) -> usize { 8 }
        fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { anyhow::bail!("device lost") }
    }

    struct Short;
    impl Embedder for Short {
        fn dim(&self) -> usize { 4 }
        fn max_len(&self) -> usize { 8 }
        fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|_| vec![1.0; 3]).collect()) }
    }

    /// Returns the sanitized input length in the first component.
    struct Echo;
    impl Embedder for Echo {
        fn dim(&self) -> usize { 2 }
        fn max_len(&self) -> usize { 8 }
        fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn section_level_is_one_vector_per_text() {
        let enc = HierarchicalEncoder::new(Box::new(FakeEmbedder::new(16)));
        let Encoded::Sections(v) = enc.encode(&texts(&["a b", "c d", "e"]), EncodeLevel::Section).expect("encode") else {
            panic!("expected section vectors");
        };
        assert_eq!(v.len(), 3);
        assert!(v.iter().all(|x| x.len() == 16));
    }

    #[test]
    fn document_level_weights_later_sections_more() {
        let enc = HierarchicalEncoder::new(Box::new(Echo));
        // lengths 1 and 3 with weights 0.1 and 1.0, averaged over two sections
        let doc = enc.encode_document(&texts(&["a", "abc"])).expect("encode");
        assert!((doc[0] - (0.1 * 1.0 + 1.0 * 3.0) / 2.0).abs() < 1e-6);
        assert!((doc[1] - (0.1 + 1.0) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn inputs_are_sanitized_before_encoding() {
        let enc = HierarchicalEncoder::new(Box::new(Echo));
        let v = enc.encode_query("\u{2026}\u{1F600}").expect("encode");
        assert_eq!(v[0], 3.0, "ellipsis becomes three dots, emoji is dropped");
    }

    #[test]
    fn encoder_failures_are_encoding_errors() {
        let enc = HierarchicalEncoder::new(Box::new(Broken));
        assert!(matches!(enc.encode_query("x"), Err(Error::Encoding(_))));
        let enc = HierarchicalEncoder::new(Box::new(Short));
        assert!(matches!(enc.encode_sections(&texts(&["x"])), Err(Error::Encoding(_))));
    }

    #[test]
    fn empty_document_pools_to_zero() {
        let enc = HierarchicalEncoder::new(Box::new(FakeEmbedder::new(8)));
        assert_eq!(enc.encode_document(&[]).expect("encode"), vec![0.0; 8]);
    }
}
