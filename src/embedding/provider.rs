//! Async embedding provider trait and its HTTP-backed implementation.

use super::client::EmbeddingClient;
use crate::error::{EmbeddingError, EmbeddingResult};
use async_trait::async_trait;
use std::sync::Arc;

/// Converts text into a fixed-length vector.
///
/// Implementations may fail (network, auth, quota). The vector length must be
/// the same for every call on one provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;
}

/// Embedding provider backed by [`EmbeddingClient`].
///
/// Uses `tokio::task::spawn_blocking` to run the synchronous HTTP call on the
/// blocking thread pool.
#[derive(Clone)]
pub struct HttpEmbeddingProvider {
    client: Arc<EmbeddingClient>,
}

impl HttpEmbeddingProvider {
    pub fn new(client: EmbeddingClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let client = self.client.clone();
        let text = text.to_string();

        tokio::task::spawn_blocking(move || client.embed(&text))
            .await
            .map_err(|e| EmbeddingError::HttpError(format!("Task join error: {}", e)))?
    }
}
