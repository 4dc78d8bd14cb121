//! # Index Module
//!
//! Vector index implementations. Both are loaded from an index file at
//! startup and are only searched afterwards.
//!
//! ### FlatIndex
//! - **Complexity**: O(n) search
//! - **Accuracy**: exact
//! - **Use Case**: small and mid-sized booking datasets
//!
//! ### HNSWIndex
//! - **Complexity**: O(log n) search
//! - **Memory**: ~2-3x vector size due to graph structure
//! - **Use Case**: large datasets with approximate search tolerance
//!
//! Both implement the `VectorIndex` trait and rank results with the
//! `SimilarityMetric` recorded in the index file.

pub mod flat;
pub mod hnsw;

use crate::SearchResult;

/// Sort by descending score and keep the first `k`.
pub(crate) fn rank(mut results: Vec<SearchResult>, k: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.id.cmp(&b.id)));
    results.truncate(k);
    results
}
