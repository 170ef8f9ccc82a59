//! Rank fusion of semantic and keyword scores.
//!
//! Scores are merged per contact:
//! - semantic contribution = similarity × semantic weight
//! - keyword contribution = score × keyword weight, tripled for a strong name
//!   match (name field, score above 0.8)
//! - a tripled keyword contribution replaces the semantic one outright;
//!   otherwise the larger contribution wins
//! - name, email and phone snippets take precedence over semantic snippets

use super::keyword_index::KeywordHit;
use crate::config::SearchConfig;
use crate::models::{MatchedField, ResultSource, SearchResult};
use crate::vector::VectorHit;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Keyword score above which a name match triggers the override.
const NAME_OVERRIDE_THRESHOLD: f64 = 0.8;

/// Multiplier for strong name matches.
const NAME_OVERRIDE_MULTIPLIER: f64 = 3.0;

/// Best semantic hit for one contact.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticMatch {
    pub contact_id: String,
    pub similarity: f64,
    pub matched_field: MatchedField,
    pub snippet: Option<String>,
}

/// A merged per-contact row before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedRow {
    pub contact_id: String,
    pub score: f64,
    pub matched_field: MatchedField,
    pub snippet: Option<String>,
    pub source: ResultSource,
    pub semantic_score: Option<f64>,
    pub keyword_score: Option<f64>,
}

/// Collapse vector hits to the best hit per contact, keeping hit order.
pub fn semantic_matches(hits: Vec<VectorHit>, max_snippet_length: usize) -> Vec<SemanticMatch> {
    let mut seen = std::collections::HashSet::new();
    hits.into_iter()
        .filter(|hit| seen.insert(hit.document.contact_id().to_string()))
        .map(|hit| SemanticMatch {
            contact_id: hit.document.contact_id().to_string(),
            similarity: f64::from(hit.similarity),
            matched_field: hit.document.kind().into(),
            snippet: Some(truncate_snippet(&hit.document.content(), max_snippet_length)),
        })
        .collect()
}

/// Merge semantic and keyword matches under the weighting policy.
///
/// Matches below their branch threshold are ignored. Rows come back in
/// first-seen order; callers sort after enrichment.
pub fn fuse(
    semantic: &[SemanticMatch],
    keyword: &[KeywordHit],
    config: &SearchConfig,
) -> Vec<FusedRow> {
    let mut rows: Vec<FusedRow> = Vec::new();
    let mut by_contact: HashMap<String, usize> = HashMap::new();

    for m in semantic
        .iter()
        .filter(|m| m.similarity >= config.semantic_threshold)
    {
        if by_contact.contains_key(&m.contact_id) {
            continue;
        }
        by_contact.insert(m.contact_id.clone(), rows.len());
        rows.push(FusedRow {
            contact_id: m.contact_id.clone(),
            score: m.similarity * config.semantic_weight,
            matched_field: m.matched_field,
            snippet: m.snippet.clone(),
            source: ResultSource::Semantic,
            semantic_score: Some(m.similarity),
            keyword_score: None,
        });
    }

    for hit in keyword
        .iter()
        .filter(|h| h.score >= config.keyword_threshold)
    {
        let is_override =
            hit.matched_field == MatchedField::Name && hit.score > NAME_OVERRIDE_THRESHOLD;
        let mut contribution = hit.score * config.keyword_weight;
        if is_override {
            contribution *= NAME_OVERRIDE_MULTIPLIER;
        }

        match by_contact.get(&hit.contact_id) {
            Some(&i) => {
                let row = &mut rows[i];
                if row.keyword_score.is_some() {
                    continue;
                }
                let keyword_wins = is_override || contribution > row.score;
                if keyword_wins {
                    row.score = contribution;
                }
                if keyword_wins || hit.matched_field.is_identity() {
                    row.matched_field = hit.matched_field;
                    row.snippet = Some(hit.snippet.clone());
                }
                row.source = ResultSource::Hybrid;
                row.keyword_score = Some(hit.score);
            }
            None => {
                by_contact.insert(hit.contact_id.clone(), rows.len());
                rows.push(FusedRow {
                    contact_id: hit.contact_id.clone(),
                    score: contribution,
                    matched_field: hit.matched_field,
                    snippet: Some(hit.snippet.clone()),
                    source: ResultSource::Keyword,
                    semantic_score: None,
                    keyword_score: Some(hit.score),
                });
            }
        }
    }

    for row in &mut rows {
        row.score = row.score.clamp(0.0, 1.0);
    }
    rows
}

/// Weight semantic tag matches without fusion, keeping rows at or above the
/// semantic threshold.
pub fn tag_only_rows(semantic: &[SemanticMatch], config: &SearchConfig) -> Vec<FusedRow> {
    semantic
        .iter()
        .map(|m| FusedRow {
            contact_id: m.contact_id.clone(),
            score: (m.similarity * config.semantic_weight).clamp(0.0, 1.0),
            matched_field: m.matched_field,
            snippet: m.snippet.clone(),
            source: ResultSource::Semantic,
            semantic_score: Some(m.similarity),
            keyword_score: None,
        })
        .filter(|row| row.score >= config.semantic_threshold)
        .collect()
}

/// Sort results by score (highest first), then name, then id.
pub fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(compare_ranked);
}

/// Ordering used for the final result list.
pub fn compare_ranked(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.contact_id.cmp(&b.contact_id))
}

/// Cut text to `max_len` characters, marking the cut with `...`.
fn truncate_snippet(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut snippet: String = text.chars().take(max_len).collect();
    snippet.push_str("...");
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    fn config() -> SearchConfig {
        SearchConfig {
            semantic_weight: 0.7,
            keyword_weight: 0.3,
            ..Default::default()
        }
    }

    fn semantic(contact_id: &str, similarity: f64) -> SemanticMatch {
        SemanticMatch {
            contact_id: contact_id.to_string(),
            similarity,
            matched_field: MatchedField::Tag,
            snippet: Some("tags: AI".to_string()),
        }
    }

    fn keyword(contact_id: &str, score: f64, field: MatchedField) -> KeywordHit {
        KeywordHit {
            contact_id: contact_id.to_string(),
            name: contact_id.to_string(),
            score,
            matched_field: field,
            snippet: format!("{} snippet", field.display_name()),
        }
    }

    #[test]
    fn test_strong_name_match_overrides_semantic() {
        let rows = fuse(
            &[semantic("c1", 0.95)],
            &[keyword("c1", 0.9, MatchedField::Name)],
            &config(),
        );
        assert_eq!(rows.len(), 1);
        assert!((rows[0].score - 0.9 * 0.3 * 3.0).abs() < 1e-9);
        assert_eq!(rows[0].matched_field, MatchedField::Name);
        assert_eq!(rows[0].source, ResultSource::Hybrid);
        assert_eq!(rows[0].semantic_score, Some(0.95));
        assert_eq!(rows[0].keyword_score, Some(0.9));
    }

    #[test]
    fn test_override_replaces_even_higher_semantic_score() {
        let cfg = SearchConfig {
            semantic_weight: 1.0,
            keyword_weight: 0.3,
            ..Default::default()
        };
        let rows = fuse(
            &[semantic("c1", 0.99)],
            &[keyword("c1", 0.85, MatchedField::Name)],
            &cfg,
        );
        assert!((rows[0].score - 0.85 * 0.3 * 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weak_keyword_takes_max() {
        let rows = fuse(
            &[semantic("c1", 0.8)],
            &[keyword("c1", 0.5, MatchedField::Tag)],
            &config(),
        );
        assert!((rows[0].score - 0.8 * 0.7).abs() < 1e-9);
        assert_eq!(rows[0].matched_field, MatchedField::Tag);
        assert_eq!(rows[0].snippet.as_deref(), Some("tags: AI"));
    }

    #[test]
    fn test_identity_snippet_wins_without_score_change() {
        let rows = fuse(
            &[semantic("c1", 0.8)],
            &[keyword("c1", 0.2, MatchedField::Email)],
            &config(),
        );
        assert!((rows[0].score - 0.56).abs() < 1e-9);
        assert_eq!(rows[0].matched_field, MatchedField::Email);
        assert_eq!(rows[0].snippet.as_deref(), Some("email snippet"));
    }

    #[test]
    fn test_name_match_below_override_threshold_not_tripled() {
        let rows = fuse(&[], &[keyword("c1", 0.8, MatchedField::Name)], &config());
        assert!((rows[0].score - 0.24).abs() < 1e-9);
        assert_eq!(rows[0].source, ResultSource::Keyword);
    }

    #[test]
    fn test_thresholds_drop_weak_matches() {
        let rows = fuse(
            &[semantic("c1", 0.1)],
            &[keyword("c2", 0.05, MatchedField::Tag)],
            &config(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_score_clamped_to_one() {
        let cfg = SearchConfig {
            keyword_weight: 0.5,
            ..Default::default()
        };
        let rows = fuse(&[], &[keyword("c1", 1.0, MatchedField::Name)], &cfg);
        assert_eq!(rows[0].score, 1.0);
    }

    #[test]
    fn test_semantic_matches_keep_best_per_contact() {
        let hits = vec![
            VectorHit {
                document: Document::Summary {
                    conversation_id: "v1".to_string(),
                    contact_id: "c1".to_string(),
                    summary: "x".repeat(150),
                },
                similarity: 0.9,
            },
            VectorHit {
                document: Document::Tag {
                    contact_id: "c1".to_string(),
                    tags: vec!["AI".to_string()],
                },
                similarity: 0.5,
            },
        ];
        let matches = semantic_matches(hits, 100);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_field, MatchedField::Summary);
        assert!((matches[0].similarity - 0.9).abs() < 1e-6);
        assert_eq!(matches[0].snippet.as_ref().unwrap().chars().count(), 103);
    }

    #[test]
    fn test_tag_only_rows_filter_on_weighted_score() {
        let rows = tag_only_rows(&[semantic("c1", 0.9), semantic("c2", 0.4)], &config());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].contact_id, "c1");
        assert!((rows[0].score - 0.63).abs() < 1e-9);
    }

    #[test]
    fn test_rank_results() {
        let make = |id: &str, name: &str, score: f64| SearchResult {
            contact_id: id.to_string(),
            name: name.to_string(),
            score,
            matched_field: MatchedField::Name,
            snippet: None,
            source: ResultSource::Keyword,
        };
        let mut results = vec![make("c1", "Zed", 0.5), make("c2", "Amy", 0.5), make("c3", "Bo", 0.9)];
        rank_results(&mut results);
        let order: Vec<&str> = results.iter().map(|r| r.contact_id.as_str()).collect();
        assert_eq!(order, vec!["c3", "c2", "c1"]);
    }
}
