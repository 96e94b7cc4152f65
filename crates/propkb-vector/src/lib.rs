//! propkb-vector
//!
//! Dense retrieval over section embeddings: an exact, in-memory flat L2
//! index. Rows are stored contiguously in corpus id order.

pub mod flat;

pub use flat::FlatL2Index;
