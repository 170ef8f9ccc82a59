//! Error types for the contact hybrid search engine.
//!
//! This module defines custom error types using `thiserror` for precise error handling.

use thiserror::Error;

/// Errors raised by the in-memory vector index.
///
/// These are fatal to the single operation that produced them; the index is
/// left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Vector length does not match the configured index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A dimension of zero was requested
    #[error("Invalid index dimension: {0}")]
    InvalidDimension(usize),

    /// Embedding vector is empty
    #[error("Embedding vector is empty")]
    EmptyEmbedding,
}

/// Errors that can occur when calling the embedding provider.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Provider returned an error status code
    #[error("Embedding API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse JSON response
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Request deadline elapsed
    #[error("Embedding request timed out")]
    Timeout,

    /// Authentication failed
    #[error("Authentication failed")]
    Unauthorized,

    /// Rate limit or quota exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Response was well-formed JSON but carried no usable vector
    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by the contact and conversation directories.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Failed to read a directory file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a directory file
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Generic directory error
    #[error("Directory error: {0}")]
    Other(String),
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    /// Environment variable has invalid value
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Other(String),
}

/// Errors that can occur inside the search pipeline.
///
/// The public search entry points never surface these; they are logged and
/// the pipeline degrades instead.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Vector index rejected the operation
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Embedding provider failed
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    /// Contact or conversation directory failed
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Both sub-searches failed
    #[error("All search branches failed")]
    AllBranchesFailed,
}

/// Convenience type alias for Results with IndexError
pub type IndexResult<T> = Result<T, IndexError>;

/// Convenience type alias for Results with EmbeddingError
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Convenience type alias for Results with DirectoryError
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Convenience type alias for Results with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Convenience type alias for Results with SearchError
pub type PipelineResult<T> = Result<T, SearchError>;
