//! Vector index implementation.
//!
//! Entries live in a map keyed by document id. Each entry carries the sequence
//! number it was inserted with, which gives removal in O(1) and a stable
//! tie-break order for search.

use crate::error::{IndexError, IndexResult};
use crate::models::Document;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A stored document with its unit-length embedding.
#[derive(Debug, Clone)]
pub struct VectorEntry {
    pub document: Document,

    /// Embedding normalized to unit length
    pub embedding: Vec<f32>,

    /// When the entry was inserted
    pub indexed_at: DateTime<Utc>,

    sequence: u64,
}

/// A search hit with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub document: Document,
    pub similarity: f32,
}

/// Brute-force cosine-similarity index.
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: HashMap<String, VectorEntry>,
    dimension: Option<usize>,
    next_sequence: u64,
}

impl VectorIndex {
    /// Create a new empty index; the dimension is fixed by the first insert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index with a fixed dimension.
    pub fn with_dimension(dimension: usize) -> IndexResult<Self> {
        let mut index = Self::new();
        index.initialize(dimension)?;
        Ok(index)
    }

    /// Fix the expected vector length.
    ///
    /// Calling again with the same dimension is a no-op; a different one is a
    /// mismatch.
    pub fn initialize(&mut self, dimension: usize) -> IndexResult<()> {
        if dimension == 0 {
            return Err(IndexError::InvalidDimension(dimension));
        }
        match self.dimension {
            Some(existing) if existing != dimension => Err(IndexError::DimensionMismatch {
                expected: existing,
                actual: dimension,
            }),
            _ => {
                self.dimension = Some(dimension);
                Ok(())
            }
        }
    }

    /// Configured dimension, if any.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Insert a document, replacing any existing entry with the same id.
    ///
    /// A replaced entry moves to the end of the insertion order.
    pub fn add(&mut self, document: Document, embedding: Vec<f32>) -> IndexResult<()> {
        if embedding.is_empty() {
            return Err(IndexError::EmptyEmbedding);
        }
        self.check_dimension(embedding.len())?;
        if self.dimension.is_none() {
            self.dimension = Some(embedding.len());
        }

        let id = document.id();
        let entry = VectorEntry {
            document,
            embedding: normalize(&embedding),
            indexed_at: Utc::now(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.entries.insert(id, entry);
        Ok(())
    }

    /// Insert many documents, skipping invalid ones.
    ///
    /// Returns the number of documents inserted.
    pub fn add_batch<I>(&mut self, items: I) -> usize
    where
        I: IntoIterator<Item = (Document, Vec<f32>)>,
    {
        let mut inserted = 0;
        for (document, embedding) in items {
            let id = document.id();
            match self.add(document, embedding) {
                Ok(()) => inserted += 1,
                Err(e) => tracing::warn!(document_id = %id, "Skipping document: {}", e),
            }
        }
        inserted
    }

    /// Remove `remove_ids`, then insert `items`, as one step.
    ///
    /// Every embedding is validated first; on error the index is untouched.
    /// Returns the number of documents inserted.
    pub fn replace(&mut self, remove_ids: &[String], items: Vec<(Document, Vec<f32>)>) -> IndexResult<usize> {
        let mut expected = self.dimension;
        for (_, embedding) in &items {
            if embedding.is_empty() {
                return Err(IndexError::EmptyEmbedding);
            }
            match expected {
                Some(dimension) if dimension != embedding.len() => {
                    return Err(IndexError::DimensionMismatch {
                        expected: dimension,
                        actual: embedding.len(),
                    });
                }
                _ => expected = Some(embedding.len()),
            }
        }

        for id in remove_ids {
            self.remove(id);
        }
        let inserted = items.len();
        for (document, embedding) in items {
            self.add(document, embedding)?;
        }
        Ok(inserted)
    }

    /// Top `k` documents by cosine similarity, descending.
    pub fn search(&self, query: &[f32], k: usize) -> IndexResult<Vec<VectorHit>> {
        self.search_filtered(query, k, |_| true)
    }

    /// Top `k` documents matching `predicate`, by cosine similarity.
    ///
    /// Ties keep insertion order.
    pub fn search_filtered<F>(&self, query: &[f32], k: usize, predicate: F) -> IndexResult<Vec<VectorHit>>
    where
        F: Fn(&Document) -> bool,
    {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dimension(query.len())?;

        let query = normalize(query);
        let mut scored: Vec<(f32, u64, &VectorEntry)> = self
            .entries
            .values()
            .filter(|entry| predicate(&entry.document))
            .map(|entry| (dot(&query, &entry.embedding), entry.sequence, entry))
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(similarity, _, entry)| VectorHit {
                document: entry.document.clone(),
                similarity,
            })
            .collect())
    }

    /// Remove a document by id. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    /// Remove every document matching `predicate`. Returns how many were removed.
    pub fn remove_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&Document) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !predicate(&entry.document));
        before - self.entries.len()
    }

    /// Remove all documents, keeping the configured dimension.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&VectorEntry> {
        self.entries.get(id)
    }

    /// Get the number of indexed documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_dimension(&self, actual: usize) -> IndexResult<()> {
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(IndexError::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// Scale a vector to unit length. A zero vector stays zero.
pub fn normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return vec![0.0; vector.len()];
    }
    vector.iter().map(|x| x / norm).collect()
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when either vector is zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    dot(&normalize(a), &normalize(b))
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_doc(contact_id: &str, tag: &str) -> Document {
        Document::Tag {
            contact_id: contact_id.to_string(),
            tags: vec![tag.to_string()],
        }
    }

    fn summary_doc(conversation_id: &str, contact_id: &str) -> Document {
        Document::Summary {
            conversation_id: conversation_id.to_string(),
            contact_id: contact_id.to_string(),
            summary: "summary".to_string(),
        }
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = vec![0.3, -1.2, 4.5, 0.01];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_first_insert_fixes_dimension() {
        let mut index = VectorIndex::new();
        assert_eq!(index.dimension(), None);
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0, 0.0]).unwrap();
        assert_eq!(index.dimension(), Some(3));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let mut index = VectorIndex::new();
        index.initialize(4).unwrap();
        index.initialize(4).unwrap();
        assert_eq!(index.dimension(), Some(4));
        assert_eq!(
            index.initialize(8),
            Err(IndexError::DimensionMismatch {
                expected: 4,
                actual: 8
            })
        );
        assert_eq!(
            VectorIndex::new().initialize(0),
            Err(IndexError::InvalidDimension(0))
        );
    }

    #[test]
    fn test_add_wrong_dimension_leaves_index_unchanged() {
        let mut index = VectorIndex::with_dimension(2).unwrap();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();

        let err = index.add(tag_doc("c2", "b"), vec![1.0, 0.0, 0.0]);
        assert!(matches!(err, Err(IndexError::DimensionMismatch { .. })));
        assert_eq!(index.len(), 1);
        assert!(!index.contains("tag:c2"));
    }

    #[test]
    fn test_add_empty_embedding_rejected() {
        let mut index = VectorIndex::new();
        assert_eq!(
            index.add(tag_doc("c1", "a"), Vec::new()),
            Err(IndexError::EmptyEmbedding)
        );
        assert!(index.is_empty());
    }

    #[test]
    fn test_add_batch_skips_invalid() {
        let mut index = VectorIndex::with_dimension(2).unwrap();
        let inserted = index.add_batch(vec![
            (tag_doc("c1", "a"), vec![1.0, 0.0]),
            (tag_doc("c2", "b"), vec![1.0]),
            (tag_doc("c3", "c"), vec![0.0, 1.0]),
        ]);
        assert_eq!(inserted, 2);
        assert_eq!(index.len(), 2);
        assert!(index.contains("tag:c1"));
        assert!(index.contains("tag:c3"));
    }

    #[test]
    fn test_search_sorted_and_bounded() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();
        index.add(tag_doc("c2", "b"), vec![0.7, 0.7]).unwrap();
        index.add(tag_doc("c3", "c"), vec![0.0, 1.0]).unwrap();

        let hits = index.search(&[1.0, 0.1], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.contact_id(), "c1");
        assert_eq!(hits[1].document.contact_id(), "c2");
        assert!(hits[0].similarity >= hits[1].similarity);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let mut index = VectorIndex::new();
        for id in ["c3", "c1", "c2"] {
            index.add(tag_doc(id, "same"), vec![0.0, 2.0]).unwrap();
        }
        let hits = index.search(&[0.0, 1.0], 10).unwrap();
        let order: Vec<&str> = hits.iter().map(|h| h.document.contact_id()).collect();
        assert_eq!(order, vec!["c3", "c1", "c2"]);
    }

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::new();
        assert!(index.search(&[1.0, 2.0, 3.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_search_dimension_mismatch() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();
        assert_eq!(
            index.search(&[1.0, 0.0, 0.0], 5).unwrap_err(),
            IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_search_filtered() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![0.9, 0.1]).unwrap();
        index.add(summary_doc("v1", "c2"), vec![1.0, 0.0]).unwrap();

        let hits = index
            .search_filtered(&[1.0, 0.0], 5, |d| matches!(d, Document::Tag { .. }))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.contact_id(), "c1");
    }

    #[test]
    fn test_remove() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();

        assert!(!index.remove("tag:unknown"));
        assert_eq!(index.len(), 1);
        assert!(index.remove("tag:c1"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_replace_moves_to_end() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();
        index.add(tag_doc("c2", "b"), vec![1.0, 0.0]).unwrap();
        index.add(tag_doc("c1", "c"), vec![1.0, 0.0]).unwrap();

        assert_eq!(index.len(), 2);
        let hits = index.search(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits[0].document.contact_id(), "c2");
        assert_eq!(hits[1].document.content(), "tags: c");
    }

    #[test]
    fn test_replace_swaps_documents() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();
        index.add(summary_doc("v1", "c1"), vec![0.0, 1.0]).unwrap();

        let inserted = index
            .replace(
                &["tag:c1".to_string(), "summary:v1".to_string()],
                vec![(tag_doc("c1", "b"), vec![1.0, 1.0])],
            )
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("tag:c1").unwrap().document.content(), "tags: b");
    }

    #[test]
    fn test_replace_with_bad_embedding_leaves_index_unchanged() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();

        let err = index.replace(
            &["tag:c1".to_string()],
            vec![
                (tag_doc("c1", "b"), vec![1.0, 0.0]),
                (summary_doc("v1", "c1"), vec![1.0, 0.0, 0.0]),
            ],
        );

        assert_eq!(
            err,
            Err(IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("tag:c1").unwrap().document.content(), "tags: a");
    }

    #[test]
    fn test_replace_rejects_inconsistent_lengths_on_fresh_index() {
        let mut index = VectorIndex::new();
        let err = index.replace(
            &[],
            vec![
                (tag_doc("c1", "a"), vec![1.0, 0.0]),
                (tag_doc("c2", "b"), vec![1.0]),
            ],
        );

        assert!(matches!(err, Err(IndexError::DimensionMismatch { .. })));
        assert!(index.is_empty());
        assert_eq!(index.dimension(), None);
    }

    #[test]
    fn test_remove_where_and_clear_keep_dimension() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![1.0, 0.0]).unwrap();
        index.add(summary_doc("v1", "c1"), vec![0.0, 1.0]).unwrap();

        assert_eq!(index.remove_where(|d| matches!(d, Document::Tag { .. })), 1);
        assert_eq!(index.len(), 1);

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.dimension(), Some(2));
    }

    #[test]
    fn test_stored_embedding_is_unit_length() {
        let mut index = VectorIndex::new();
        index.add(tag_doc("c1", "a"), vec![3.0, 4.0]).unwrap();
        let entry = index.get("tag:c1").unwrap();
        assert!((entry.embedding[0] - 0.6).abs() < 1e-6);
        assert!((entry.embedding[1] - 0.8).abs() < 1e-6);
    }
}
