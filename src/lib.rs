//! Contact Hybrid Search - semantic and keyword search over a contact directory.
//!
//! This library indexes short documents derived from contacts (tag sets,
//! conversation transcripts and summaries) as embeddings, scores contact fields
//! lexically, and fuses both signals into one ranked result list.
//!
//! # Architecture
//!
//! - **models**: Contacts, conversations, indexed documents and ranked results
//! - **error**: Custom error types for precise error handling
//! - **config**: Configuration management from environment variables
//! - **embedding**: Embedding provider trait and the HTTP implementation
//! - **cache**: Bounded embedding cache
//! - **vector**: Brute-force cosine-similarity index
//! - **search**: Keyword scoring, snippets and rank fusion
//! - **repositories**: Contact and conversation directories
//! - **services**: The hybrid search coordinator and index maintenance
//! - **observability**: Search counters and timers

pub mod cache;
pub mod config;
pub mod embedding;
pub mod error;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod search;
pub mod services;
pub mod vector;

// Re-export commonly used types
pub use cache::EmbeddingCache;
pub use config::{Config, SearchConfig};
pub use embedding::{EmbeddingClient, EmbeddingProvider, HttpEmbeddingProvider};
pub use error::{ConfigError, DirectoryError, EmbeddingError, IndexError, SearchError};
pub use models::{
    Contact, ContactUpdate, Conversation, DebugRow, Document, DocumentKind, MatchedField,
    ResultSource, SearchResult,
};
pub use observability::SearchMetrics;
pub use repositories::{
    ContactRepository, ConversationRepository, JsonContactRepository, JsonConversationRepository,
};
pub use search::{KeywordHit, KeywordIndex};
pub use services::{HybridSearchService, SearchService};
pub use vector::{VectorHit, VectorIndex};
