//! Lexical search and rank fusion.
//!
//! This module provides the keyword scorer over contact fields, with snippet
//! generation, and the policy that merges keyword and semantic scores.

pub mod fusion;
pub mod keyword_index;

pub use fusion::{compare_ranked, fuse, rank_results, semantic_matches, tag_only_rows, FusedRow, SemanticMatch};
pub use keyword_index::{
    generate_snippet, score_document, KeywordDocument, KeywordHit, KeywordIndex, QueryTerms,
};
