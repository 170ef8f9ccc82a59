//! Hybrid search coordinator.
//!
//! Runs the semantic and keyword branches concurrently, fuses their scores,
//! enriches rows with display names from the contact directory and records a
//! debug trace of the latest query. Search never fails toward the caller:
//! branch failures degrade to the surviving branch and pipeline failures fall
//! back to keyword-only results with a placeholder score.

use crate::cache::EmbeddingCache;
use crate::config::{Config, SearchConfig};
use crate::embedding::EmbeddingProvider;
use crate::error::{EmbeddingError, PipelineResult, SearchError};
use crate::models::{
    Contact, ContactUpdate, Conversation, DebugRow, Document, DocumentKind, ResultSource, SearchResult,
};
use crate::observability::{SearchMetrics, Timer};
use crate::repositories::{ContactRepository, ConversationRepository};
use crate::search::{
    compare_ranked, fuse, semantic_matches, tag_only_rows, FusedRow, KeywordHit, KeywordIndex,
    SemanticMatch,
};
use crate::vector::VectorIndex;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Score assigned to every result of the keyword-only fallback.
pub const FALLBACK_SCORE: f64 = 0.5;

const DEFAULT_EMBEDDING_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_REBUILD_CONCURRENCY: usize = 8;

/// Search and index maintenance operations.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Fix the index dimension (when configured) and build the index from the
    /// directories.
    async fn initialize(&self) -> PipelineResult<()>;

    /// Hybrid search. Never fails; an unusable pipeline yields an empty list.
    async fn search(&self, query: &str) -> Vec<SearchResult>;

    /// Semantic search restricted to tag documents.
    async fn search_tags_only(&self, query: &str) -> Vec<SearchResult>;

    /// Index a newly created contact.
    async fn add_contact(&self, contact: &Contact) -> PipelineResult<()>;

    /// Drop a deleted contact's tag document. Returns whether one existed.
    async fn remove_contact(&self, contact_id: &str) -> bool;

    /// Apply a contact change to the index.
    async fn update_contact(&self, contact_id: &str, update: ContactUpdate) -> PipelineResult<()>;

    /// Replace every tag document with one per tagged contact in the directory.
    ///
    /// Returns the number of tag documents inserted.
    async fn rebuild_tag_index(&self) -> PipelineResult<usize>;

    /// Clear the index and rebuild tag, transcript and summary documents.
    ///
    /// Returns the number of documents inserted.
    async fn rebuild_index(&self) -> PipelineResult<usize>;

    /// Index the transcript and summary of one conversation and merge its
    /// tags into the contact's tag document.
    async fn index_conversation(&self, conversation: &Conversation) -> PipelineResult<usize>;

    /// Remove the documents derived from a conversation and drop its tags from
    /// the contact's tag document.
    async fn remove_conversation(&self, conversation_id: &str) -> usize;

    /// Scoring breakdown of the latest hybrid search. Tags-only searches do
    /// not record one.
    async fn get_last_debug(&self) -> Vec<DebugRow>;
}

/// Hybrid search over a vector index and the live keyword view.
pub struct HybridSearchService {
    pub(super) config: SearchConfig,
    pub(super) contacts: Arc<dyn ContactRepository>,
    pub(super) conversations: Arc<dyn ConversationRepository>,
    pub(super) embedder: Arc<dyn EmbeddingProvider>,
    pub(super) vector_index: Arc<RwLock<VectorIndex>>,
    pub(super) keyword_index: KeywordIndex,
    pub(super) cache: EmbeddingCache,
    pub(super) metrics: SearchMetrics,
    pub(super) embedding_dimension: Option<usize>,
    pub(super) rebuild_concurrency: usize,
    embedding_timeout: Duration,
    last_debug: RwLock<Vec<DebugRow>>,
}

impl HybridSearchService {
    /// Create a service with default cache, timeout and concurrency settings.
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        conversations: Arc<dyn ConversationRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: SearchConfig,
    ) -> Self {
        let keyword_index = KeywordIndex::new(contacts.clone(), config.max_snippet_length);
        Self {
            config,
            contacts,
            conversations,
            embedder,
            vector_index: Arc::new(RwLock::new(VectorIndex::new())),
            keyword_index,
            cache: EmbeddingCache::default(),
            metrics: SearchMetrics::new(),
            embedding_dimension: None,
            rebuild_concurrency: DEFAULT_REBUILD_CONCURRENCY,
            embedding_timeout: DEFAULT_EMBEDDING_TIMEOUT,
            last_debug: RwLock::new(Vec::new()),
        }
    }

    /// Create a service from the process configuration.
    pub fn from_config(
        config: &Config,
        contacts: Arc<dyn ContactRepository>,
        conversations: Arc<dyn ConversationRepository>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let service = Self::new(contacts, conversations, embedder, config.search.clone())
            .with_cache(EmbeddingCache::new(config.embedding_cache_capacity))
            .with_embedding_timeout(config.embedding_timeout())
            .with_rebuild_concurrency(config.rebuild_concurrency);
        match config.embedding_dimension {
            Some(dimension) => service.with_dimension(dimension),
            None => service,
        }
    }

    pub fn with_cache(mut self, cache: EmbeddingCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout = timeout;
        self
    }

    /// Number of embedding calls in flight during rebuilds. Zero is treated as one.
    pub fn with_rebuild_concurrency(mut self, concurrency: usize) -> Self {
        self.rebuild_concurrency = concurrency.max(1);
        self
    }

    /// Expected embedding length, applied by `initialize`.
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.embedding_dimension = Some(dimension);
        self
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Number of documents currently in the vector index.
    pub async fn document_count(&self) -> usize {
        self.vector_index.read().await.len()
    }

    /// Whether the vector index holds a document with this id.
    pub async fn contains_document(&self, document_id: &str) -> bool {
        self.vector_index.read().await.contains(document_id)
    }

    /// Embed text, consulting the cache first.
    ///
    /// Provider calls are bounded by the embedding timeout.
    pub(super) async fn embed_cached(&self, text: &str) -> PipelineResult<Vec<f32>> {
        if let Some(embedding) = self.cache.get(text) {
            self.metrics.track_cache_access(true);
            return Ok(embedding.as_ref().clone());
        }
        self.metrics.track_cache_access(false);

        let embedding =
            match tokio::time::timeout(self.embedding_timeout, self.embedder.embed(text)).await {
                Ok(Ok(embedding)) => embedding,
                Ok(Err(e)) => {
                    self.metrics.track_embedding_failure();
                    return Err(e.into());
                }
                Err(_) => {
                    self.metrics.track_embedding_failure();
                    return Err(EmbeddingError::Timeout.into());
                }
            };

        self.cache.insert(text, embedding.clone());
        Ok(embedding)
    }

    /// Semantic branch: best vector hit per contact, optionally restricted to
    /// one document kind.
    async fn semantic_branch(
        &self,
        query: &str,
        kind: Option<DocumentKind>,
    ) -> PipelineResult<Vec<SemanticMatch>> {
        if self.vector_index.read().await.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = self.embed_cached(query).await?;
        let hits = {
            let index = self.vector_index.read().await;
            match kind {
                Some(kind) => index.search_filtered(&embedding, self.config.max_results, |doc| {
                    doc.kind() == kind
                })?,
                None => index.search(&embedding, self.config.max_results)?,
            }
        };

        Ok(semantic_matches(hits, self.config.max_snippet_length))
    }

    async fn keyword_branch(&self, query: &str) -> PipelineResult<Vec<KeywordHit>> {
        Ok(self
            .keyword_index
            .search(query, self.config.max_results)
            .await?)
    }

    async fn run_hybrid(&self, query: &str) -> PipelineResult<Vec<SearchResult>> {
        let (semantic, keyword) =
            tokio::join!(self.semantic_branch(query, None), self.keyword_branch(query));

        let (semantic, keyword) = match (semantic, keyword) {
            (Ok(semantic), Ok(keyword)) => (semantic, keyword),
            (Err(e), Ok(keyword)) => {
                tracing::warn!("Semantic search failed, using keyword results only: {}", e);
                self.metrics.track_degraded("semantic");
                (Vec::new(), keyword)
            }
            (Ok(semantic), Err(e)) => {
                tracing::warn!("Keyword search failed, using semantic results only: {}", e);
                self.metrics.track_degraded("keyword");
                (semantic, Vec::new())
            }
            (Err(semantic_err), Err(keyword_err)) => {
                tracing::warn!(
                    semantic_error = %semantic_err,
                    keyword_error = %keyword_err,
                    "Both search branches failed"
                );
                return Err(SearchError::AllBranchesFailed);
            }
        };

        let rows = fuse(&semantic, &keyword, &self.config);
        let (mut results, debug) = self.enrich(rows).await?;
        results.truncate(self.config.max_results);
        *self.last_debug.write().await = debug;

        Ok(results)
    }

    /// Attach display names, drop contacts no longer in the directory and
    /// sort. Directory errors abort.
    async fn enrich(&self, rows: Vec<FusedRow>) -> PipelineResult<(Vec<SearchResult>, Vec<DebugRow>)> {
        let contacts: Vec<Option<Contact>> =
            try_join_all(rows.iter().map(|row| self.contacts.get(&row.contact_id))).await?;

        let mut ranked: Vec<(SearchResult, DebugRow)> = rows
            .into_iter()
            .zip(contacts)
            .filter_map(|(row, contact)| {
                let Some(contact) = contact else {
                    tracing::debug!(contact_id = %row.contact_id, "Dropping result for missing contact");
                    return None;
                };
                let debug = DebugRow {
                    contact_id: row.contact_id.clone(),
                    name: contact.name.clone(),
                    semantic_score: row.semantic_score,
                    keyword_score: row.keyword_score,
                    final_score: row.score,
                    matched_field: row.matched_field,
                    snippet: row.snippet.clone(),
                };
                let result = SearchResult {
                    contact_id: row.contact_id,
                    name: contact.name,
                    score: row.score,
                    matched_field: row.matched_field,
                    snippet: row.snippet,
                    source: row.source,
                };
                Some((result, debug))
            })
            .collect();

        ranked.sort_by(|a, b| compare_ranked(&a.0, &b.0));
        Ok(ranked.into_iter().unzip())
    }

    /// Keyword-only results with a placeholder score.
    async fn keyword_fallback(&self, query: &str) -> PipelineResult<Vec<SearchResult>> {
        let hits = self.keyword_branch(query).await?;

        let debug = hits
            .iter()
            .map(|hit| DebugRow {
                contact_id: hit.contact_id.clone(),
                name: hit.name.clone(),
                semantic_score: None,
                keyword_score: Some(hit.score),
                final_score: FALLBACK_SCORE,
                matched_field: hit.matched_field,
                snippet: Some(hit.snippet.clone()),
            })
            .collect();
        *self.last_debug.write().await = debug;

        Ok(hits
            .into_iter()
            .map(|hit| SearchResult {
                contact_id: hit.contact_id,
                name: hit.name,
                score: FALLBACK_SCORE,
                matched_field: hit.matched_field,
                snippet: Some(hit.snippet),
                source: ResultSource::Fallback,
            })
            .collect())
    }

    async fn run_tags_only(&self, query: &str) -> PipelineResult<Vec<SearchResult>> {
        let semantic = self.semantic_branch(query, Some(DocumentKind::Tag)).await?;
        let rows = tag_only_rows(&semantic, &self.config);
        let (mut results, _) = self.enrich(rows).await?;
        results.truncate(self.config.max_results);
        Ok(results)
    }
}

#[async_trait]
impl SearchService for HybridSearchService {
    async fn initialize(&self) -> PipelineResult<()> {
        if let Some(dimension) = self.embedding_dimension {
            self.vector_index.write().await.initialize(dimension)?;
        }
        let indexed = self.rebuild_index().await?;
        tracing::info!(documents = indexed, "Hybrid search initialized");
        Ok(())
    }

    async fn search(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            self.last_debug.write().await.clear();
            return Vec::new();
        }

        let timer = Timer::new("hybrid_search");
        let results = match self.run_hybrid(query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::error!("Hybrid search failed, falling back to keyword search: {}", e);
                self.metrics.track_fallback();
                match self.keyword_fallback(query).await {
                    Ok(results) => results,
                    Err(e) => {
                        tracing::error!("Keyword fallback failed: {}", e);
                        self.last_debug.write().await.clear();
                        Vec::new()
                    }
                }
            }
        };

        self.metrics
            .track_search("hybrid", timer.finish(), results.len());
        results
    }

    async fn search_tags_only(&self, query: &str) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let timer = Timer::new("tags_only_search");
        let results = match self.run_tags_only(query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Tags-only search failed: {}", e);
                Vec::new()
            }
        };

        self.metrics
            .track_search("tags_only", timer.finish(), results.len());
        results
    }

    async fn add_contact(&self, contact: &Contact) -> PipelineResult<()> {
        self.index_new_contact(contact).await?;
        Ok(())
    }

    async fn remove_contact(&self, contact_id: &str) -> bool {
        self.keyword_index.remove_contact(contact_id);
        self.vector_index
            .write()
            .await
            .remove(&Document::tag_id(contact_id))
    }

    async fn update_contact(&self, contact_id: &str, update: ContactUpdate) -> PipelineResult<()> {
        self.apply_contact_update(contact_id, update).await
    }

    async fn rebuild_tag_index(&self) -> PipelineResult<usize> {
        self.rebuild_tags().await
    }

    async fn rebuild_index(&self) -> PipelineResult<usize> {
        self.rebuild_all().await
    }

    async fn index_conversation(&self, conversation: &Conversation) -> PipelineResult<usize> {
        self.index_conversation_documents(conversation).await
    }

    async fn remove_conversation(&self, conversation_id: &str) -> usize {
        self.remove_conversation_documents(conversation_id).await
    }

    async fn get_last_debug(&self) -> Vec<DebugRow> {
        self.last_debug.read().await.clone()
    }
}
