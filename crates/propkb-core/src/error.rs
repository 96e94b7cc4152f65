use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The embedding model could not be initialised or failed mid-encode.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Index build failed: {0}")]
    IndexBuild(String),

    #[error("Search failed: {0}")]
    Search(String),

    /// A previous rebuild failed; the knowledge base refuses to serve.
    #[error("Knowledge base unusable: {0}")]
    Unusable(String),
}

impl Error {
    pub fn encoding(err: impl std::fmt::Display) -> Self {
        Self::Encoding(err.to_string())
    }

    /// True for failures that need reconfiguration or retry, as opposed to
    /// an empty answer.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Encoding(_) | Self::IndexBuild(_) | Self::Unusable(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
