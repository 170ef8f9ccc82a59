//! Bounded embedding cache keyed by content.
//!
//! Inserts of new keys stop once the capacity is reached; nothing is evicted.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Default maximum number of cached embeddings.
pub const DEFAULT_CAPACITY: usize = 1000;

/// A thread-safe, capacity-capped map from text to embedding.
///
/// The cache can be cloned cheaply (uses Arc internally); clones share entries.
#[derive(Clone)]
pub struct EmbeddingCache {
    cache: Arc<RwLock<HashMap<String, Arc<Vec<f32>>>>>,
    capacity: usize,
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Insert an embedding.
    ///
    /// Returns `false` when the cache is full and the key is not already
    /// present; existing keys are always updated.
    pub fn insert(&self, content: &str, embedding: Vec<f32>) -> bool {
        if let Ok(mut cache) = self.cache.write() {
            if cache.len() >= self.capacity && !cache.contains_key(content) {
                tracing::trace!(capacity = self.capacity, "Embedding cache full, not inserting");
                return false;
            }
            cache.insert(content.to_string(), Arc::new(embedding));
            return true;
        }
        false
    }

    /// Get a cached embedding.
    pub fn get(&self, content: &str) -> Option<Arc<Vec<f32>>> {
        self.cache.read().ok()?.get(content).cloned()
    }

    /// Check if a text has a cached embedding.
    pub fn contains_key(&self, content: &str) -> bool {
        self.get(content).is_some()
    }

    /// Clear all entries from the cache.
    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.write() {
            cache.clear();
        }
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if further inserts of new keys will be refused.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for EmbeddingCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingCache")
            .field("capacity", &self.capacity)
            .field("entries", &self.len())
            .finish()
    }
}
