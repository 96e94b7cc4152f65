//! propkb-hybrid
//!
//! Dense + sparse retrieval over the proposal corpus, multi-hop query
//! refinement, and the `KnowledgeBase` façade that owns the active index.

pub mod expand;
pub mod fusion;
pub mod index;
pub mod kb;
pub mod multi_hop;
pub mod sections;

pub use expand::expand_query;
pub use fusion::fuse;
pub use index::HybridIndex;
pub use kb::{KnowledgeBase, Snapshot};
pub use multi_hop::{merge_keep_best, MultiHopRetriever};
pub use sections::SectionIndex;
