//! propkb-core
//!
//! Leaf components of the proposal knowledge base: text sanitizing, section
//! segmentation, corpus loading with filename metadata, the pricing and RFP
//! analysis scanners, plus the shared types, traits, errors and configuration
//! used by the index crates.

#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod analysis;
pub mod config;
pub mod corpus;
pub mod error;
pub mod pricing;
pub mod sanitize;
pub mod segment;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use sanitize::sanitize;
pub use types::{
    CorpusEntry, EntryId, FusionStrategy, ProposalMetadata, SearchHit, SearchResult, SourceKind,
};
