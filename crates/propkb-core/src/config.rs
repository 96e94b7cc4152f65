//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_KNOWLEDGE_BASE__DIRECTORY`).
//! `expand_path` expands `~` and `${VAR}` in configured directories.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::types::FusionStrategy;

pub const SETTINGS_KEY: &str = "knowledge_base";

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::from_figment(Self::figment_for(&env_name))
    }

    /// Sources for `env_name`, lowest precedence first.
    pub fn figment_for(env_name: &str) -> Figment {
        let mut figment = Figment::new()
            .merge(Serialized::default(SETTINGS_KEY, KbSettings::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment.merge(Env::prefixed("APP_").split("__"))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<KbSettings> {
        self.get(SETTINGS_KEY)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        if settings.extensions.is_empty() {
            return Err(crate::Error::InvalidConfig("knowledge_base.extensions is empty".into()).into());
        }
        if settings.retrieval.default_k == 0 {
            return Err(crate::Error::InvalidConfig("retrieval.default_k must be > 0".into()).into());
        }
        if settings.embedding.use_fake && settings.embedding.fake_dim == 0 {
            return Err(crate::Error::InvalidConfig("embedding.fake_dim must be > 0".into()).into());
        }
        Ok(())
    }
}

/// Everything the knowledge base needs, under the `knowledge_base` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KbSettings {
    /// Directory of past proposals; `~` and env vars are expanded.
    pub directory: String,
    pub extensions: Vec<String>,
    pub max_depth: usize,
    pub embedding: EmbeddingSettings,
    pub retrieval: RetrievalSettings,
}

impl Default for KbSettings {
    fn default() -> Self {
        Self {
            directory: "markdown_responses".to_string(),
            extensions: vec!["md".to_string(), "txt".to_string()],
            max_depth: 1,
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
        }
    }
}

impl KbSettings {
    pub fn corpus_dir(&self) -> PathBuf {
        expand_path(&self.directory)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model: String,
    pub model_dir: Option<String>,
    pub use_fake: bool,
    pub fake_dim: usize,
    pub max_len: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            model_dir: None,
            use_fake: false,
            fake_dim: 384,
            max_len: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub default_k: usize,
    pub fusion: FusionStrategy,
    pub expand_queries: bool,
    pub multi_hop: MultiHopSettings,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { default_k: 5, fusion: FusionStrategy::default(), expand_queries: false, multi_hop: MultiHopSettings::default() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiHopSettings {
    /// First hop fetches `first_hop_factor * k` hits.
    pub first_hop_factor: usize,
    /// Number of top first-hop hits whose text refines the query.
    pub seed_results: usize,
    /// Characters taken from each seed hit.
    pub snippet_chars: usize,
}

impl Default for MultiHopSettings {
    fn default() -> Self {
        Self { first_hop_factor: 3, seed_results: 3, snippet_chars: 200 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
