//! # Flat Index Implementation
//!
//! Stores vectors in a linear array and performs exact search by scoring the
//! query against every stored vector.
//!
//! # Examples
//!
//! ```rust
//! use booking_assistant::{FlatIndex, SimilarityMetric, Vector, VectorIndex};
//!
//! let index = FlatIndex::new(3, SimilarityMetric::Euclidean, vec![
//!     Vector { id: 0, values: vec![1.0, 2.0, 3.0] },
//!     Vector { id: 1, values: vec![3.0, 2.0, 1.0] },
//! ]);
//! let results = index.search(&[1.1, 2.1, 3.1], 5);
//! assert_eq!(results[0].id, 0);
//! ```

use crate::index::rank;
use crate::{SearchResult, SimilarityMetric, Vector, VectorIndex};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct FlatIndex {
    /// Dimension of vectors stored in this index
    pub dim: usize,
    #[serde(default)]
    pub metric: SimilarityMetric,
    /// Storage for all vectors
    pub data: Vec<Vector>,
}

impl FlatIndex {
    pub fn new(dim: usize, metric: SimilarityMetric, data: Vec<Vector>) -> Self {
        Self { dim, metric, data }
    }
}

// Stored vectors go back through `add`, which checks length and id uniqueness.
impl<'de> Deserialize<'de> for FlatIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Stored {
            dim: usize,
            #[serde(default)]
            metric: SimilarityMetric,
            data: Vec<Vector>,
        }

        let stored = Stored::deserialize(deserializer)?;
        if stored.dim == 0 {
            return Err(serde::de::Error::custom("Invalid dimension: cannot be 0"));
        }

        let mut index = FlatIndex::new(stored.dim, stored.metric, Vec::with_capacity(stored.data.len()));
        for vector in stored.data {
            index.add(vector).map_err(serde::de::Error::custom)?;
        }
        Ok(index)
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, vector: Vector) -> Result<(), String> {
        if vector.values.len() != self.dim {
            return Err(format!(
                "Vector dimension mismatch: expected {}, got {}",
                self.dim,
                vector.values.len()
            ));
        }
        if self.data.iter().any(|e| e.id == vector.id) {
            return Err(format!("Vector ID {} already exists", vector.id));
        }
        self.data.push(vector);
        Ok(())
    }

    fn search(&self, query: &[f64], k: usize) -> Vec<SearchResult> {
        let scored = self
            .data
            .iter()
            .map(|e| SearchResult {
                id: e.id,
                score: self.metric.calculate(&e.values, query),
            })
            .collect();

        rank(scored, k)
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn get_vector(&self, id: u64) -> Option<&Vector> {
        self.data.iter().find(|e| e.id == id)
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    fn ids(&self) -> Vec<u64> {
        self.data.iter().map(|e| e.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_vectors() -> Vec<Vector> {
        vec![
            Vector { id: 0, values: vec![1.0, 0.0, 0.0] },
            Vector { id: 1, values: vec![0.0, 1.0, 0.0] },
            Vector { id: 2, values: vec![0.0, 0.0, 1.0] },
        ]
    }

    #[test]
    fn test_serialization_deserialization() {
        let flat_index = FlatIndex::new(3, SimilarityMetric::Cosine, unit_vectors());

        let serialized = serde_json::to_string(&flat_index).expect("Serialization should work");
        let deserialized: FlatIndex = serde_json::from_str(&serialized).expect("Deserialization should work");

        assert_eq!(deserialized.len(), 3);
        assert_eq!(deserialized.dimension(), 3);
        assert_eq!(deserialized.metric(), SimilarityMetric::Cosine);
        assert!(deserialized.get_vector(2).is_some());

        let results = deserialized.search(&[1.1, 0.1, 0.1], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, 0);
        assert!(results[0].score > 0.99);
    }

    #[test]
    fn test_metric_defaults_when_missing() {
        let json = r#"{"dim": 2, "data": [{"id": 0, "values": [1.0, 0.0]}]}"#;
        let index: FlatIndex = serde_json::from_str(json).unwrap();
        assert_eq!(index.metric(), SimilarityMetric::Euclidean);
    }

    #[test]
    fn test_flat_index_with_euclidean_similarity() {
        let vectors = vec![
            Vector { id: 0, values: vec![0.0, 0.0] },
            Vector { id: 1, values: vec![3.0, 4.0] },
            Vector { id: 2, values: vec![6.0, 8.0] },
        ];

        let index = FlatIndex::new(2, SimilarityMetric::Euclidean, vectors);
        let results = index.search(&[5.0, 7.0], 3);

        assert_eq!(results.len(), 3);
        let order: Vec<u64> = results.iter().map(|r| r.id).collect();
        assert_eq!(order, vec![2, 1, 0]);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_k_larger_than_index() {
        let index = FlatIndex::new(3, SimilarityMetric::Euclidean, unit_vectors());
        let results = index.search(&[0.2, 0.3, 0.4], 5);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_search_empty_index() {
        let index = FlatIndex::new(3, SimilarityMetric::Euclidean, Vec::new());
        assert!(index.search(&[1.0, 2.0, 3.0], 5).is_empty());
    }

    #[test]
    fn test_add_rejects_wrong_dimension_and_duplicates() {
        let mut index = FlatIndex::new(3, SimilarityMetric::Euclidean, unit_vectors());
        assert!(index.add(Vector { id: 7, values: vec![1.0] }).is_err());
        assert!(index.add(Vector { id: 0, values: vec![1.0, 1.0, 1.0] }).is_err());
        assert!(index.add(Vector { id: 3, values: vec![1.0, 1.0, 1.0] }).is_ok());
        assert_eq!(index.ids(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_deserialize_rejects_short_vector() {
        let json = r#"{"dim": 3, "data": [{"id": 0, "values": [0.0]}, {"id": 1, "values": [0.5, 0.5, 0.5]}]}"#;
        let err = serde_json::from_str::<FlatIndex>(json).unwrap_err();
        assert!(err.to_string().contains("Vector dimension mismatch: expected 3, got 1"));
    }

    #[test]
    fn test_deserialize_rejects_duplicate_id() {
        let json = r#"{"dim": 2, "data": [{"id": 4, "values": [0.0, 1.0]}, {"id": 4, "values": [1.0, 0.0]}]}"#;
        assert!(serde_json::from_str::<FlatIndex>(json).is_err());
    }
}
