//! Synchronous HTTP client for an OpenAI-compatible embeddings API.

use crate::config::Config;
use crate::error::{EmbeddingError, EmbeddingResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request body for `POST /embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response wrapper for the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// HTTP client for the embedding API.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct EmbeddingClient {
    /// Base URL for the embedding API
    base_url: String,

    /// API key for bearer authentication
    api_key: String,

    /// Model name sent with each request
    model: String,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,
}

impl EmbeddingClient {
    /// Create a new EmbeddingClient from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.embedding_api_url.clone(),
            api_key: config.embedding_api_key.clone(),
            model: config.embedding_model.clone(),
            agent: Arc::new(agent),
        }
    }

    /// Create a client with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String, api_key: String, model: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            api_key,
            model,
            agent: Arc::new(agent),
        }
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Embed a single text.
    pub fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let start = Instant::now();
        let url = self.build_url("/embeddings");

        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .set("Content-Type", "application/json")
            .send_json(&request)
            .map_err(|e| self.map_error(e));

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            success = response.is_ok(),
            "POST {}",
            url
        );

        let body = response?
            .into_string()
            .map_err(|e| EmbeddingError::HttpError(e.to_string()))?;

        let parsed: EmbeddingResponse = serde_json::from_str(&body)?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("no embedding in response".to_string()))?;

        if embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse(
                "embedding vector is empty".to_string(),
            ));
        }
        Ok(embedding)
    }

    /// Map a ureq error to an EmbeddingError.
    fn map_error(&self, error: ureq::Error) -> EmbeddingError {
        match error {
            ureq::Error::Status(code, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());

                match code {
                    401 | 403 => EmbeddingError::Unauthorized,
                    429 => EmbeddingError::RateLimitExceeded,
                    _ => EmbeddingError::ApiError {
                        status: code,
                        message,
                    },
                }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                    EmbeddingError::HttpError("Connection failed".to_string())
                } else if transport.kind() == ureq::ErrorKind::Io {
                    EmbeddingError::Timeout
                } else {
                    EmbeddingError::HttpError(transport.to_string())
                }
            }
        }
    }
}
