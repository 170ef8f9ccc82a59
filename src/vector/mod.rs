//! In-memory semantic index.
//!
//! This module provides brute-force cosine-similarity search over document
//! embeddings. At a few thousand short documents a linear scan is fast enough
//! and needs no index structure.

pub mod index;

pub use index::{cosine_similarity, normalize, VectorEntry, VectorHit, VectorIndex};
