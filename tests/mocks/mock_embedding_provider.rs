use async_trait::async_trait;
use contact_hybrid_search::embedding::EmbeddingProvider;
use contact_hybrid_search::error::{EmbeddingError, EmbeddingResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Words the mock embeds; each one is a dimension.
pub const VOCABULARY: &[&str] = &[
    "ai",
    "robotics",
    "mathematician",
    "rockets",
    "music",
    "cooking",
    "startup",
    "investor",
    "climbing",
    "poetry",
];

/// Deterministic embedding provider for testing.
///
/// A text embeds to the count of each vocabulary word it contains, so texts
/// sharing words are similar and texts with no vocabulary words embed to the
/// zero vector.
#[derive(Clone, Default)]
pub struct MockEmbeddingProvider {
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
    fail_all: Arc<AtomicBool>,
    fail_on: Arc<Mutex<HashSet<String>>>,
    short_on: Arc<Mutex<HashSet<String>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension() -> usize {
        VOCABULARY.len()
    }

    /// Embedding the mock returns for `text`.
    pub fn vector_for(text: &str) -> Vec<f32> {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();

        VOCABULARY
            .iter()
            .map(|v| words.iter().filter(|w| w.as_str() == *v).count() as f32)
            .collect()
    }

    /// Fail every call.
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Fail calls for exactly this text.
    pub fn fail_on(&self, text: &str) {
        self.fail_on.lock().unwrap().insert(text.to_string());
    }

    /// Answer this text with a vector one element too short.
    pub fn short_on(&self, text: &str) {
        self.short_on.lock().unwrap().insert(text.to_string());
    }

    /// Sleep before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Total number of embed calls.
    pub fn total_calls(&self) -> usize {
        self.call_counts.lock().unwrap().values().sum()
    }

    /// Number of embed calls for exactly this text.
    pub fn calls_for(&self, text: &str) -> usize {
        *self.call_counts.lock().unwrap().get(text).unwrap_or(&0)
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        {
            let mut counts = self.call_counts.lock().unwrap();
            *counts.entry(text.to_string()).or_insert(0) += 1;
        }

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_all.load(Ordering::SeqCst) || self.fail_on.lock().unwrap().contains(text) {
            return Err(EmbeddingError::ApiError {
                status: 503,
                message: "mock provider unavailable".to_string(),
            });
        }

        let mut embedding = Self::vector_for(text);
        if self.short_on.lock().unwrap().contains(text) {
            embedding.pop();
        }
        Ok(embedding)
    }
}
