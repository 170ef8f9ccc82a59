//! Caching utilities for the search engine.
//!
//! This module provides a bounded, content-keyed cache of embeddings so that
//! identical texts (shared tag sets, repeated queries) hit the provider once.

pub mod embedding_cache;

pub use embedding_cache::EmbeddingCache;
