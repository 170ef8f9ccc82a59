//! Contact Search - Main entry point
//!
//! Loads the contact directory, builds the hybrid index and answers queries
//! read from stdin, one per line. Results are written to stdout as JSON lines.
//!
//! Commands:
//! - `<query>`: hybrid search
//! - `/tags <query>`: semantic search over tag documents only
//! - `/rebuild`: rebuild the whole index
//! - `/debug`: scoring breakdown of the last hybrid search

use anyhow::{Context, Result};
use contact_hybrid_search::repositories::{
    ContactRepository, ConversationRepository, JsonContactRepository, JsonConversationRepository,
};
use contact_hybrid_search::{
    Config, EmbeddingClient, EmbeddingProvider, HttpEmbeddingProvider, HybridSearchService,
    SearchService,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries results only
    let _ = dotenvy::dotenv();
    let default_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Using embedding model {} at {}",
        config.embedding_model, config.embedding_api_url
    );

    let contacts = JsonContactRepository::from_path(&config.contacts_file)
        .with_context(|| format!("Failed to load contacts from {}", config.contacts_file))?;
    let contacts = Arc::new(contacts) as Arc<dyn ContactRepository>;

    let conversations = match &config.conversations_file {
        Some(path) => JsonConversationRepository::from_path(path)
            .with_context(|| format!("Failed to load conversations from {}", path))?,
        None => JsonConversationRepository::empty(),
    };
    let conversations = Arc::new(conversations) as Arc<dyn ConversationRepository>;

    let embedder = Arc::new(HttpEmbeddingProvider::new(EmbeddingClient::new(&config)))
        as Arc<dyn EmbeddingProvider>;

    let service = HybridSearchService::from_config(&config, contacts, conversations, embedder);
    service
        .initialize()
        .await
        .context("Failed to build search index")?;

    info!("Ready for queries on stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_command(line) {
            Command::Tags(query) => print_json(&service.search_tags_only(query).await)?,
            Command::Rebuild => match service.rebuild_index().await {
                Ok(documents) => print_json(&serde_json::json!({ "documents": documents }))?,
                Err(e) => {
                    error!("Rebuild failed: {}", e);
                    print_json(&serde_json::json!({ "error": e.to_string() }))?;
                }
            },
            Command::Debug => print_json(&service.get_last_debug().await)?,
            Command::Search(query) => print_json(&service.search(query).await)?,
        }
    }

    info!("{}", service.metrics().summary());
    Ok(())
}

/// One line of stdin input.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Search(&'a str),
    Tags(&'a str),
    Rebuild,
    Debug,
}

/// Commands are matched on the first word; anything else is a search query.
fn parse_command(line: &str) -> Command<'_> {
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match head {
        "/tags" => Command::Tags(rest),
        "/rebuild" if rest.is_empty() => Command::Rebuild,
        "/debug" if rest.is_empty() => Command::Debug,
        _ => Command::Search(line),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
