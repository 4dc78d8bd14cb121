//! Approximate index backed by an HNSW graph.
//!
//! The graph is always built with Euclidean distance. Candidates returned by
//! the graph are rescored with the index's `SimilarityMetric` before ranking.
//! Only the raw vectors are persisted; the graph is rebuilt on load.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use hnsw::{Hnsw, Searcher};
use rand::rngs::StdRng;
use serde::{Deserialize, Deserializer, Serialize};
use space::{Metric, Neighbor};

use crate::index::rank;
use crate::{SearchResult, SimilarityMetric, Vector, VectorIndex};

// Maximum number of connections each node can have in all layers except the 0 layer
const MAXIMUM_NUMBER_CONNECTIONS: usize = 16;
// Maximum number of connections for the bottom layer
const MAXIMUM_NUMBER_CONNECTIONS_0: usize = 32;
// Lower bound on the candidate list explored per query
const MIN_EF_SEARCH: usize = 32;

#[derive(Default, Clone)]
struct Euclidean;

impl Metric<Vec<f64>> for Euclidean {
    type Unit = u64;

    fn distance(&self, a: &Vec<f64>, b: &Vec<f64>) -> Self::Unit {
        let sum_sq = a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>();
        (sum_sq.sqrt() * 1000.0) as u64
    }
}

type Graph = Hnsw<Euclidean, Vec<f64>, StdRng, MAXIMUM_NUMBER_CONNECTIONS, MAXIMUM_NUMBER_CONNECTIONS_0>;

#[derive(Serialize)]
pub struct HNSWIndex {
    #[serde(skip)]
    hnsw: Graph,
    dim: usize,
    metric: SimilarityMetric,
    /// Vectors in graph insertion order; a graph node index is a slot here.
    vectors: Vec<Vector>,
    #[serde(skip)]
    slots: HashMap<u64, usize>,
}

impl HNSWIndex {
    pub fn new(dim: usize, metric: SimilarityMetric) -> Self {
        Self {
            hnsw: Hnsw::new(Euclidean),
            dim,
            metric,
            vectors: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<'de> Deserialize<'de> for HNSWIndex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Stored {
            dim: usize,
            #[serde(default)]
            metric: SimilarityMetric,
            vectors: Vec<Vector>,
        }

        let stored = Stored::deserialize(deserializer)?;
        if stored.dim == 0 {
            return Err(serde::de::Error::custom("Invalid dimension: cannot be 0"));
        }

        let mut index = HNSWIndex::new(stored.dim, stored.metric);
        for vector in stored.vectors {
            index.add(vector).map_err(serde::de::Error::custom)?;
        }
        Ok(index)
    }
}

impl VectorIndex for HNSWIndex {
    fn add(&mut self, vector: Vector) -> Result<(), String> {
        if vector.values.len() != self.dim {
            return Err(format!(
                "Vector dimension mismatch: expected {}, got {}",
                self.dim,
                vector.values.len()
            ));
        }
        if self.slots.contains_key(&vector.id) {
            return Err(format!("Vector ID {} already exists", vector.id));
        }

        let mut searcher = Searcher::new();
        let slot = self.hnsw.insert(vector.values.clone(), &mut searcher);
        self.slots.insert(vector.id, slot);
        self.vectors.push(vector);
        Ok(())
    }

    fn search(&self, query: &[f64], k: usize) -> Vec<SearchResult> {
        if k == 0 || self.vectors.is_empty() {
            return Vec::new();
        }

        // Candidate buffer is bounded by the index size, not by k
        let candidates = k.min(self.vectors.len()).saturating_mul(2);

        let mut searcher = Searcher::new();
        let mut neighbors = vec![
            Neighbor {
                index: !0,
                distance: !0,
            };
            candidates
        ];

        let query_vec = query.to_vec();
        let ef = candidates.max(MIN_EF_SEARCH);
        let found = self.hnsw.nearest(&query_vec, ef, &mut searcher, &mut neighbors);

        let scored = found
            .iter()
            .filter(|n| n.index != !0)
            .filter_map(|n| self.vectors.get(n.index))
            .map(|v| SearchResult {
                id: v.id,
                score: self.metric.calculate(&v.values, query),
            })
            .collect();

        rank(scored, k)
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn get_vector(&self, id: u64) -> Option<&Vector> {
        self.slots.get(&id).and_then(|&slot| self.vectors.get(slot))
    }

    fn dimension(&self) -> usize {
        self.dim
    }

    fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    fn ids(&self) -> Vec<u64> {
        self.vectors.iter().map(|v| v.id).collect()
    }
}

impl Debug for HNSWIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HNSWIndex")
            .field("dim", &self.dim)
            .field("metric", &self.metric)
            .field("len", &self.vectors.len())
            .finish()
    }
}
