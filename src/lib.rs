//! # booking-assistant
//!
//! HTTP analytics and nearest-neighbour retrieval over a static hotel booking
//! dataset. The dataset and the vector index are loaded once at startup and
//! shared read-only by every request.
//!
//! The crate is organised leaves first:
//!
//! - [`dataset`] - the booking CSV loaded into an immutable [`DatasetStore`]
//! - [`index`] - exact ([`FlatIndex`]) and approximate ([`HNSWIndex`]) search
//! - [`persistence`] - the versioned JSON index file
//! - [`embeddings`] - the [`EmbeddingFunction`] seam and its random placeholder
//! - [`analytics`] - fixed aggregates over the dataset
//! - [`assistant`] - the retrieval flow tying the above together
//! - [`server`] - the axum HTTP surface

pub mod analytics;
pub mod assistant;
pub mod config;
pub mod dataset;
pub mod embeddings;
pub mod errors;
pub mod index;
pub mod persistence;
pub mod server;

pub use analytics::{compute_metric, Metric};
pub use assistant::{AskResponse, BookingAssistant, DEFAULT_TOP_K};
pub use config::ServerConfig;
pub use dataset::{BookingRecord, ColumnKind, DatasetError, DatasetStore};
pub use embeddings::{EmbeddingError, EmbeddingFunction, RandomEmbedder};
pub use errors::{AssistantError, AssistantResult};
pub use index::flat::FlatIndex;
pub use index::hnsw::HNSWIndex;
pub use persistence::{load_index_from_file, save_index_to_file, PersistenceError};
pub use server::{create_app, start_server};

use serde::{Deserialize, Serialize};

/// A stored embedding. `id` is the position of the matching dataset row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vector {
    pub id: u64,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub id: u64,
    pub score: f64,
}

/// Scoring function used to rank stored vectors against a query.
///
/// Every metric is expressed as a similarity: higher means nearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimilarityMetric {
    /// `1 / (1 + L2 distance)`
    #[default]
    Euclidean,
    Cosine,
    DotProduct,
    /// `1 / (1 + L1 distance)`
    Manhattan,
}

impl SimilarityMetric {
    pub fn calculate(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            SimilarityMetric::Euclidean => {
                let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum();
                1.0 / (1.0 + sum_sq.sqrt())
            }
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::DotProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
            SimilarityMetric::Manhattan => {
                let sum_abs: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum();
                1.0 / (1.0 + sum_abs)
            }
        }
    }
}

/// Read side of a vector index. Indexes are built once and then only searched.
pub trait VectorIndex {
    fn add(&mut self, vector: Vector) -> Result<(), String>;
    /// Up to `k` results, nearest first.
    fn search(&self, query: &[f64], k: usize) -> Vec<SearchResult>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool;
    fn get_vector(&self, id: u64) -> Option<&Vector>;
    fn dimension(&self) -> usize;
    fn metric(&self) -> SimilarityMetric;
    fn ids(&self) -> Vec<u64>;
}

/// Concrete index stored in an index file.
#[derive(Debug, Serialize, Deserialize)]
pub enum VectorIndexWrapper {
    Flat(FlatIndex),
    HNSW(Box<HNSWIndex>),
}

impl VectorIndexWrapper {
    pub fn index_type(&self) -> &'static str {
        match self {
            VectorIndexWrapper::Flat(_) => "Flat",
            VectorIndexWrapper::HNSW(_) => "HNSW",
        }
    }
}

impl VectorIndex for VectorIndexWrapper {
    fn add(&mut self, vector: Vector) -> Result<(), String> {
        match self {
            VectorIndexWrapper::Flat(index) => index.add(vector),
            VectorIndexWrapper::HNSW(index) => index.add(vector),
        }
    }

    fn search(&self, query: &[f64], k: usize) -> Vec<SearchResult> {
        match self {
            VectorIndexWrapper::Flat(index) => index.search(query, k),
            VectorIndexWrapper::HNSW(index) => index.search(query, k),
        }
    }

    fn len(&self) -> usize {
        match self {
            VectorIndexWrapper::Flat(index) => index.len(),
            VectorIndexWrapper::HNSW(index) => index.len(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            VectorIndexWrapper::Flat(index) => index.is_empty(),
            VectorIndexWrapper::HNSW(index) => index.is_empty(),
        }
    }

    fn get_vector(&self, id: u64) -> Option<&Vector> {
        match self {
            VectorIndexWrapper::Flat(index) => index.get_vector(id),
            VectorIndexWrapper::HNSW(index) => index.get_vector(id),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            VectorIndexWrapper::Flat(index) => index.dimension(),
            VectorIndexWrapper::HNSW(index) => index.dimension(),
        }
    }

    fn metric(&self) -> SimilarityMetric {
        match self {
            VectorIndexWrapper::Flat(index) => index.metric(),
            VectorIndexWrapper::HNSW(index) => index.metric(),
        }
    }

    fn ids(&self) -> Vec<u64> {
        match self {
            VectorIndexWrapper::Flat(index) => index.ids(),
            VectorIndexWrapper::HNSW(index) => index.ids(),
        }
    }
}

pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let (mut dot, mut norm_a_sq, mut norm_b_sq) = (0.0, 0.0, 0.0);

    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a_sq += x * x;
        norm_b_sq += y * y;
    }

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
