//! Search engine metrics.
//!
//! Counters are shared atomics so a cloned tracker reports into the same totals.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Counters for the hybrid search service.
#[derive(Debug, Clone, Default)]
pub struct SearchMetrics {
    searches_total: Arc<AtomicU64>,
    degraded_searches_total: Arc<AtomicU64>,
    fallback_searches_total: Arc<AtomicU64>,
    cache_hits_total: Arc<AtomicU64>,
    cache_misses_total: Arc<AtomicU64>,
    embedding_failures_total: Arc<AtomicU64>,
    documents_indexed_total: Arc<AtomicU64>,
}

impl SearchMetrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a completed search.
    pub fn track_search(&self, kind: &str, duration_ms: u128, result_count: usize) {
        self.searches_total.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            kind = %kind,
            duration_ms = duration_ms,
            result_count = result_count,
            "Search completed"
        );
    }

    /// Track a search that lost one of its branches.
    pub fn track_degraded(&self, branch: &str) {
        self.degraded_searches_total.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(branch = %branch, "Search degraded");
    }

    /// Track a search answered by the keyword-only fallback.
    pub fn track_fallback(&self) {
        self.fallback_searches_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Track an embedding cache access.
    pub fn track_cache_access(&self, hit: bool) {
        if hit {
            self.cache_hits_total.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Embedding cache hit");
        } else {
            self.cache_misses_total.fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Embedding cache miss");
        }
    }

    /// Track a failed embedding call.
    pub fn track_embedding_failure(&self) {
        self.embedding_failures_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Track documents inserted into the vector index.
    pub fn track_documents_indexed(&self, count: usize) {
        self.documents_indexed_total
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn searches_total(&self) -> u64 {
        self.searches_total.load(Ordering::Relaxed)
    }

    pub fn degraded_searches_total(&self) -> u64 {
        self.degraded_searches_total.load(Ordering::Relaxed)
    }

    pub fn fallback_searches_total(&self) -> u64 {
        self.fallback_searches_total.load(Ordering::Relaxed)
    }

    pub fn cache_hits_total(&self) -> u64 {
        self.cache_hits_total.load(Ordering::Relaxed)
    }

    pub fn cache_misses_total(&self) -> u64 {
        self.cache_misses_total.load(Ordering::Relaxed)
    }

    pub fn embedding_failures_total(&self) -> u64 {
        self.embedding_failures_total.load(Ordering::Relaxed)
    }

    pub fn documents_indexed_total(&self) -> u64 {
        self.documents_indexed_total.load(Ordering::Relaxed)
    }

    /// Get the cache hit rate (0.0 to 1.0).
    pub fn cache_hit_rate(&self) -> f64 {
        let hits = self.cache_hits_total() as f64;
        let total = (self.cache_hits_total() + self.cache_misses_total()) as f64;

        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Print a summary of all metrics.
    pub fn summary(&self) -> String {
        format!(
            "Metrics Summary:\n\
             Searches: {}\n\
             Degraded Searches: {}\n\
             Fallback Searches: {}\n\
             Cache Hits: {}\n\
             Cache Misses: {}\n\
             Cache Hit Rate: {:.2}%\n\
             Embedding Failures: {}\n\
             Documents Indexed: {}",
            self.searches_total(),
            self.degraded_searches_total(),
            self.fallback_searches_total(),
            self.cache_hits_total(),
            self.cache_misses_total(),
            self.cache_hit_rate() * 100.0,
            self.embedding_failures_total(),
            self.documents_indexed_total(),
        )
    }
}

/// A timer for tracking operation duration.
pub struct Timer {
    start: Instant,
    operation: String,
}

impl Timer {
    /// Start a new timer for the given operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            operation: operation.into(),
        }
    }

    /// Finish the timer and return the elapsed time in milliseconds.
    pub fn finish(self) -> u128 {
        let duration_ms = self.start.elapsed().as_millis();

        tracing::debug!(
            operation = %self.operation,
            duration_ms = duration_ms,
            "Operation completed"
        );

        duration_ms
    }
}
