//! propkb-embed
//!
//! Sentence encoders behind the core `Embedder` trait and the hierarchical
//! (section / document) encoding policy built on top of them.

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use propkb_core::config::{expand_path, EmbeddingSettings};
use propkb_core::traits::Embedder;

pub mod device;
pub mod hierarchical;
pub mod pool;
pub mod tokenize;

pub use hierarchical::{EncodeLevel, Encoded, HierarchicalEncoder};
pub use pool::{document_weights, masked_mean_l2, weighted_document_pool};

/// BERT-family sentence encoder (e.g. `all-MiniLM-L6-v2`) loaded from a
/// local model directory.
pub struct EmbeddingModel { model: BertModel, tokenizer: Tokenizer, device: Device, dim: usize, max_len: usize }

impl EmbeddingModel {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir(settings)?;
        info!(model = %settings.model, dir = %model_dir.display(), "loading sentence encoder");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path).with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let dim = serde_json::from_str::<serde_json::Value>(&raw_config)?
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;
        let vb = load_weights(&model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;
        info!(dim, "sentence encoder loaded");
        Ok(Self { model, tokenizer, device, dim, max_len: settings.max_len })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self.model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_dtype(DType::F32)?.to_vec1()?;
        anyhow::ensure!(emb.len() == self.dim, "expected {} dims, got {}", self.dim, emb.len());
        if start.elapsed().as_millis() > 100 { debug!(ms = start.elapsed().as_millis() as u64, "slow embedding"); }
        Ok(emb)
    }
}

impl Embedder for EmbeddingModel {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { texts.iter().map(|t| self.embed_text(t)).collect() }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the weights file is not modified while the model is alive.
        return Ok(unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device)? });
    }
    let weights_path = model_dir.join("pytorch_model.bin");
    let weights = candle_core::pickle::read_all(&weights_path).with_context(|| format!("reading {}", weights_path.display()))?;
    let weights_map: std::collections::HashMap<String, Tensor> = weights.into_iter().collect();
    Ok(VarBuilder::from_tensors(weights_map, DTYPE, device))
}

/// Deterministic feature-hashing encoder: no model files, stable output.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder { pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } } }

impl FakeEmbedder {
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        let tokens = text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).map(str::to_lowercase);
        for token in tokens {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = 0.5 + (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { usize::MAX }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_text(t)).collect()) }
}

fn fake_requested(settings: &EmbeddingSettings) -> bool {
    settings.use_fake
        || std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Box<dyn Embedder>> {
    if fake_requested(settings) {
        info!(dim = settings.fake_dim, "using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(settings.fake_dim)));
    }
    Ok(Box::new(EmbeddingModel::new(settings)?))
}

fn resolve_model_dir(settings: &EmbeddingSettings) -> Result<PathBuf> {
    let mut candidates: Vec<(&str, PathBuf)> = Vec::new();
    if let Some(dir) = &settings.model_dir { candidates.push(("embedding.model_dir", expand_path(dir))); }
    if let Ok(dir) = std::env::var("APP_MODEL_DIR") { candidates.push(("APP_MODEL_DIR", PathBuf::from(dir))); }
    if let Ok(dir) = std::env::var("MODEL_DIR") { candidates.push(("MODEL_DIR", PathBuf::from(dir))); }
    candidates.push(("default", Path::new("models").join(&settings.model)));
    candidates.push(("default", Path::new("../models").join(&settings.model)));
    for (origin, path) in candidates {
        if path.exists() {
            debug!(origin, dir = %path.display(), "resolved model directory");
            return Ok(path);
        }
        if origin != "default" { warn!(origin, dir = %path.display(), "configured model directory does not exist"); }
    }
    Err(anyhow!("Could not locate model directory for {}", settings.model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_model_directory_is_an_error() {
        let settings = EmbeddingSettings { model: "no-such-model-here".into(), model_dir: Some("/nonexistent/propkb".into()), ..Default::default() };
        assert!(resolve_model_dir(&settings).is_err());
    }

    #[test]
    fn fake_embedder_ignores_case_and_punctuation() {
        let e = FakeEmbedder::new(64);
        assert_eq!(e.embed_text("Cloud, Migration!"), e.embed_text("cloud migration"));
    }
}
