//! In-memory vector index over knowledge-base records.

use std::cmp::Ordering;

use async_trait::async_trait;
use syl_core::errors::UpstreamError;
use syl_core::record::Record;
use syl_core::traits::{SearchParams, VectorSearch};

/// Cosine similarity clamped to `[0, 1]`; zero for mismatched or zero vectors.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
struct IndexedRecord {
    namespace: String,
    record: Record,
    embedding: Vec<f32>,
}

/// Brute-force [`VectorSearch`] with namespace scoping and exact-match filters.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    entries: Vec<IndexedRecord>,
}

impl MemoryIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; its stored score is ignored and recomputed per search.
    pub fn insert(&mut self, namespace: impl Into<String>, record: Record, embedding: Vec<f32>) {
        self.entries.push(IndexedRecord {
            namespace: namespace.into(),
            record,
            embedding,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct namespaces in insertion order.
    #[must_use]
    pub fn namespaces(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.namespace.as_str()) {
                seen.push(&entry.namespace);
            }
        }
        seen
    }

    /// Synchronous search used by the trait implementation.
    #[must_use]
    pub fn query(&self, vector: &[f32], params: &SearchParams) -> Vec<Record> {
        let mut hits: Vec<Record> = self
            .entries
            .iter()
            .filter(|entry| entry.namespace == params.namespace)
            .filter(|entry| params.filter.matches(&entry.record))
            .filter_map(|entry| {
                let score = cosine_similarity(vector, &entry.embedding);
                (score >= params.min_score).then(|| {
                    let mut record = entry.record.clone();
                    record.score = score;
                    record
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(params.top_k);
        hits
    }
}

#[async_trait]
impl VectorSearch for MemoryIndex {
    async fn search(
        &self,
        vector: &[f32],
        params: &SearchParams,
    ) -> Result<Vec<Record>, UpstreamError> {
        Ok(self.query(vector, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use syl_core::enums::EntityType;
    use syl_core::record::{MetadataFilter, fields};

    fn params(namespace: &str, filter: MetadataFilter, min_score: f64) -> SearchParams {
        SearchParams {
            top_k: 10,
            namespace: namespace.into(),
            filter,
            min_score,
        }
    }

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.insert(
            "default",
            Record::new("m1", EntityType::Module, 0.0).with_field(fields::YEAR, "1"),
            vec![1.0, 0.0],
        );
        index.insert(
            "default",
            Record::new("m2", EntityType::Module, 0.0).with_field(fields::YEAR, "2"),
            vec![0.8, 0.6],
        );
        index.insert(
            "default",
            Record::new("a1", EntityType::Assessment, 0.0).with_field(fields::YEAR, "1"),
            vec![0.0, 1.0],
        );
        index.insert("other", Record::new("x1", EntityType::Module, 0.0), vec![1.0, 0.0]);
        index
    }

    #[test]
    fn results_are_scored_and_sorted() {
        let hits = index().query(&[1.0, 0.0], &params("default", MetadataFilter::new(), 0.0));
        let ids: Vec<&str> = hits.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "a1"]);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert!((hits[1].score - 0.8).abs() < 1e-6);
    }

    #[test]
    fn namespace_isolates_records() {
        let hits = index().query(&[1.0, 0.0], &params("other", MetadataFilter::new(), 0.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "x1");
    }

    #[test]
    fn filter_and_floor_apply() {
        let filter = MetadataFilter::new()
            .with_entity_type(EntityType::Module)
            .with_field(fields::YEAR, "1");
        let hits = index().query(&[1.0, 0.0], &params("default", filter, 0.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "m1");

        let floored = index().query(&[1.0, 0.0], &params("default", MetadataFilter::new(), 0.9));
        assert_eq!(floored.len(), 1);
    }

    #[test]
    fn negative_similarity_is_clamped() {
        assert!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).abs() < f64::EPSILON);
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn namespaces_are_listed_once() {
        assert_eq!(index().namespaces(), vec!["default", "other"]);
    }
}
