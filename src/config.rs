//! Configuration management for the contact search engine.
//!
//! This module handles loading and validating configuration from environment variables.
//! A `.env` file is honoured when present; nothing is printed to stdout, which the
//! binary reserves for results.

use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::time::Duration;

/// Tuning knobs for hybrid ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Multiplier applied to cosine similarity (default: 0.6)
    pub semantic_weight: f64,

    /// Multiplier applied to keyword scores (default: 0.4)
    pub keyword_weight: f64,

    /// Maximum number of results per query (default: 20)
    pub max_results: usize,

    /// Minimum cosine similarity for a semantic hit (default: 0.3)
    pub semantic_threshold: f64,

    /// Minimum keyword score for a keyword hit (default: 0.1)
    pub keyword_threshold: f64,

    /// Snippet window length in characters (default: 100)
    pub max_snippet_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.6,
            keyword_weight: 0.4,
            max_results: 20,
            semantic_threshold: 0.3,
            keyword_threshold: 0.1,
            max_snippet_length: 100,
        }
    }
}

impl SearchConfig {
    /// Check that weights and thresholds are within `[0, 1]` and limits are non-zero.
    pub fn validate(&self) -> ConfigResult<()> {
        let unit_fields = [
            ("SEARCH_SEMANTIC_WEIGHT", self.semantic_weight),
            ("SEARCH_KEYWORD_WEIGHT", self.keyword_weight),
            ("SEARCH_SEMANTIC_THRESHOLD", self.semantic_threshold),
            ("SEARCH_KEYWORD_THRESHOLD", self.keyword_threshold),
        ];
        for (var, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    var: var.to_string(),
                    reason: format!("Must be between 0 and 1, got: {}", value),
                });
            }
        }

        if self.max_results == 0 {
            return Err(ConfigError::InvalidValue {
                var: "SEARCH_MAX_RESULTS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }
        if self.max_snippet_length == 0 {
            return Err(ConfigError::InvalidValue {
                var: "SEARCH_MAX_SNIPPET_LENGTH".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Embedding API base URL (OpenAI-compatible)
    pub embedding_api_url: String,

    /// Embedding API key
    pub embedding_api_key: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Expected embedding dimension, if known up front
    pub embedding_dimension: Option<usize>,

    /// HTTP request timeout in seconds (default: 10)
    pub request_timeout: u64,

    /// Deadline for a single embedding call in seconds (default: 15)
    pub embedding_timeout_secs: u64,

    /// Maximum number of cached embeddings (default: 1000)
    pub embedding_cache_capacity: usize,

    /// Concurrent embedding calls during rebuilds (default: 8)
    pub rebuild_concurrency: usize,

    /// Path to the contacts JSON file (default: "contacts.json")
    pub contacts_file: String,

    /// Optional path to the conversations JSON file
    pub conversations_file: Option<String>,

    /// Log level (default: "error")
    pub log_level: String,

    /// Ranking configuration
    pub search: SearchConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `EMBEDDING_API_KEY`: API key for the embedding provider
    ///
    /// Optional environment variables:
    /// - `EMBEDDING_API_URL`: Base URL (default: "https://api.openai.com/v1")
    /// - `EMBEDDING_MODEL`: Model name (default: "text-embedding-3-small")
    /// - `EMBEDDING_DIMENSION`: Expected vector length
    /// - `REQUEST_TIMEOUT`: HTTP timeout in seconds (default: 10)
    /// - `EMBEDDING_TIMEOUT_SECS`: Per-call deadline (default: 15)
    /// - `EMBEDDING_CACHE_CAPACITY`: Cache cap (default: 1000)
    /// - `REBUILD_CONCURRENCY`: Parallel embedding calls (default: 8)
    /// - `CONTACTS_FILE`, `CONVERSATIONS_FILE`: Directory sources
    /// - `SEARCH_*`: Ranking knobs, see [`SearchConfig`]
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let embedding_api_key = env::var("EMBEDDING_API_KEY")
            .map_err(|_| ConfigError::MissingVar("EMBEDDING_API_KEY".to_string()))?;

        if embedding_api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                var: "EMBEDDING_API_KEY".to_string(),
                reason: "Cannot be empty".to_string(),
            });
        }

        let embedding_api_url = env::var("EMBEDDING_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        if !embedding_api_url.starts_with("http://") && !embedding_api_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                var: "EMBEDDING_API_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        let embedding_model =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string());

        let embedding_dimension = match env::var("EMBEDDING_DIMENSION") {
            Ok(_) => Some(Self::parse_env_usize("EMBEDDING_DIMENSION", 0)?),
            Err(_) => None,
        };
        if embedding_dimension == Some(0) {
            return Err(ConfigError::InvalidValue {
                var: "EMBEDDING_DIMENSION".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        let request_timeout = Self::parse_env_u64("REQUEST_TIMEOUT", 10)?;
        let embedding_timeout_secs = Self::parse_env_u64("EMBEDDING_TIMEOUT_SECS", 15)?;
        let embedding_cache_capacity = Self::parse_env_usize("EMBEDDING_CACHE_CAPACITY", 1000)?;
        let rebuild_concurrency = Self::parse_env_usize("REBUILD_CONCURRENCY", 8)?.max(1);

        let contacts_file =
            env::var("CONTACTS_FILE").unwrap_or_else(|_| "contacts.json".to_string());
        let conversations_file = env::var("CONVERSATIONS_FILE").ok();

        let defaults = SearchConfig::default();
        let search = SearchConfig {
            semantic_weight: Self::parse_env_f64(
                "SEARCH_SEMANTIC_WEIGHT",
                defaults.semantic_weight,
            )?,
            keyword_weight: Self::parse_env_f64("SEARCH_KEYWORD_WEIGHT", defaults.keyword_weight)?,
            max_results: Self::parse_env_usize("SEARCH_MAX_RESULTS", defaults.max_results)?,
            semantic_threshold: Self::parse_env_f64(
                "SEARCH_SEMANTIC_THRESHOLD",
                defaults.semantic_threshold,
            )?,
            keyword_threshold: Self::parse_env_f64(
                "SEARCH_KEYWORD_THRESHOLD",
                defaults.keyword_threshold,
            )?,
            max_snippet_length: Self::parse_env_usize(
                "SEARCH_MAX_SNIPPET_LENGTH",
                defaults.max_snippet_length,
            )?,
        };
        search.validate()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        Ok(Config {
            embedding_api_url,
            embedding_api_key,
            embedding_model,
            embedding_dimension,
            request_timeout,
            embedding_timeout_secs,
            embedding_cache_capacity,
            rebuild_concurrency,
            contacts_file,
            conversations_file,
            log_level,
            search,
        })
    }

    /// Deadline applied to each embedding call.
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.embedding_timeout_secs)
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as usize with a default value.
    fn parse_env_usize(var_name: &str, default: usize) -> ConfigResult<usize> {
        match env::var(var_name) {
            Ok(val) => val.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as f64 with a default value.
    fn parse_env_f64(var_name: &str, default: f64) -> ConfigResult<f64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a decimal number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            embedding_api_url: "https://api.openai.com/v1".to_string(),
            embedding_api_key: String::new(),
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_dimension: None,
            request_timeout: 10,
            embedding_timeout_secs: 15,
            embedding_cache_capacity: 1000,
            rebuild_concurrency: 8,
            contacts_file: "contacts.json".to_string(),
            conversations_file: None,
            log_level: "error".to_string(),
            search: SearchConfig::default(),
        }
    }
}
