//! Embedding provider abstraction and the HTTP implementation.
//!
//! The search engine only depends on [`EmbeddingProvider`]; the shipped
//! [`HttpEmbeddingProvider`] talks to any OpenAI-compatible `/embeddings`
//! endpoint with a synchronous `ureq` client driven from
//! `tokio::task::spawn_blocking`.

mod client;
mod provider;

pub use client::EmbeddingClient;
pub use provider::{EmbeddingProvider, HttpEmbeddingProvider};
