//! # Booking Assistant
//!
//! The read-only application context shared by every request: the dataset,
//! the vector index and the query embedder, all built once at startup.
//!
//! The `/ask` flow is embed -> search -> row lookup -> response. Search
//! positions are index vector ids, which are dataset row positions; that
//! correspondence is checked in [`BookingAssistant::new`] so a request can
//! never look up a row that does not exist.
//!
//! # Examples
//!
//! ```rust
//! use booking_assistant::{
//!     BookingAssistant, DatasetStore, FlatIndex, RandomEmbedder, SimilarityMetric, Vector,
//!     VectorIndexWrapper,
//! };
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let csv = "hotel,is_canceled,arrival_date_year,arrival_date_month,adr\nCity Hotel,0,2017,July,90\n";
//! let dataset = DatasetStore::from_reader(csv.as_bytes())?;
//! let index = VectorIndexWrapper::Flat(FlatIndex::new(
//!     2,
//!     SimilarityMetric::Euclidean,
//!     vec![Vector { id: 0, values: vec![0.5, 0.5] }],
//! ));
//! let assistant = BookingAssistant::new(dataset, index, Box::new(RandomEmbedder::new(2)?), 5)?;
//!
//! let response = assistant.ask("Which bookings were made in July?")?;
//! assert_eq!(response.retrieved_results.len(), 1);
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::analytics::{compute_metric, Metric, MetricReport};
use crate::dataset::DatasetStore;
use crate::embeddings::EmbeddingFunction;
use crate::errors::{AssistantError, AssistantResult};
use crate::{VectorIndex, VectorIndexWrapper};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub retrieved_results: Vec<Map<String, Value>>,
    /// Elapsed time, e.g. `"0.0012 seconds"`
    pub response_time: String,
}

pub struct BookingAssistant {
    dataset: Arc<DatasetStore>,
    index: Arc<VectorIndexWrapper>,
    embedding_function: Arc<dyn EmbeddingFunction>,
    top_k: usize,
}

impl std::fmt::Debug for BookingAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingAssistant")
            .field("rows", &self.dataset.len())
            .field("vectors", &self.index.len())
            .field("dimension", &self.index.dimension())
            .field("top_k", &self.top_k)
            .finish()
    }
}

impl BookingAssistant {
    /// Build the context, checking that every index vector maps to exactly
    /// one dataset row. `top_k` is clamped to `1..=index.len()`.
    pub fn new(
        dataset: DatasetStore,
        index: VectorIndexWrapper,
        embedding_function: Box<dyn EmbeddingFunction>,
        top_k: usize,
    ) -> AssistantResult<Self> {
        validate_correspondence(&dataset, &index)?;
        let top_k = top_k.clamp(1, index.len().max(1));

        Ok(Self {
            dataset: Arc::new(dataset),
            index: Arc::new(index),
            embedding_function: Arc::from(embedding_function),
            top_k,
        })
    }

    pub fn dataset(&self) -> &DatasetStore {
        &self.dataset
    }

    pub fn index(&self) -> &VectorIndexWrapper {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn analytics(&self, metric_name: &str) -> AssistantResult<MetricReport> {
        let metric: Metric = metric_name.parse()?;
        Ok(compute_metric(&self.dataset, metric))
    }

    /// Retrieve the `top_k` rows nearest to the query embedding.
    pub fn ask(&self, query: &str) -> AssistantResult<AskResponse> {
        let start = Instant::now();

        let query_embedding = self.embedding_function.generate_embedding(query)?;
        debug!("Query embedding length: {}", query_embedding.len());

        let positions = self.search_positions(&query_embedding)?;
        debug!("Retrieved positions: {:?}", positions);

        if positions.is_empty() {
            return Err(AssistantError::NoResults);
        }

        let retrieved_results = self.lookup_rows(&positions)?;

        Ok(AskResponse {
            retrieved_results,
            response_time: format!("{:.4} seconds", start.elapsed().as_secs_f64()),
        })
    }

    fn search_positions(&self, query_embedding: &[f64]) -> AssistantResult<Vec<u64>> {
        let expected = self.index.dimension();
        if query_embedding.len() != expected {
            return Err(AssistantError::DimensionMismatch {
                expected,
                actual: query_embedding.len(),
            });
        }

        Ok(self
            .index
            .search(query_embedding, self.top_k)
            .into_iter()
            .map(|result| result.id)
            .collect())
    }

    fn lookup_rows(&self, positions: &[u64]) -> AssistantResult<Vec<Map<String, Value>>> {
        positions
            .iter()
            .map(|&position| {
                usize::try_from(position)
                    .ok()
                    .and_then(|row| self.dataset.row_json(row))
                    .ok_or(AssistantError::RowOutOfRange {
                        position,
                        rows: self.dataset.len(),
                    })
            })
            .collect()
    }
}

fn validate_correspondence(dataset: &DatasetStore, index: &VectorIndexWrapper) -> AssistantResult<()> {
    let rows = dataset.len();
    if index.len() != rows {
        return Err(AssistantError::IndexSizeMismatch {
            vectors: index.len(),
            rows,
        });
    }

    let mut seen = HashSet::with_capacity(rows);
    for id in index.ids() {
        let in_range = usize::try_from(id).map(|row| row < rows).unwrap_or(false);
        if !in_range || !seen.insert(id) {
            return Err(AssistantError::UnknownRow { id, rows });
        }
    }
    Ok(())
}
