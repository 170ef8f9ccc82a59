//! Application service layer.
//!
//! The hybrid search service owns the vector index, the keyword view and the
//! embedding cache for the lifetime of the process, and exposes search and
//! index maintenance to the caller through [`SearchService`].

mod hybrid_search_service;
mod index_maintenance;

pub use hybrid_search_service::{HybridSearchService, SearchService, FALLBACK_SCORE};
