//! # Query Embeddings
//!
//! [`EmbeddingFunction`] is the seam between the retrieval flow and whatever
//! turns a question into a vector. The only implementation shipped is
//! [`RandomEmbedder`], a placeholder that ignores the text and returns a
//! uniformly random vector of the index dimension. Retrieved rows are
//! therefore unrelated to the question until a real model is plugged in.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Invalid embedding dimension: {0}")]
    InvalidDimension(usize),
    #[error("Embedding generation failed: {0}")]
    Generation(String),
}

pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Turns query text into a vector of a fixed dimension.
pub trait EmbeddingFunction: Send + Sync {
    fn generate_embedding(&self, text: &str) -> Result<Vec<f64>>;
    fn dimension(&self) -> usize;
}

/// Placeholder embedder: every component is drawn from `[0, 1)`,
/// independently of the input text and of previous calls.
pub struct RandomEmbedder {
    dimension: usize,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for RandomEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomEmbedder")
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl RandomEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_rng(dimension, StdRng::from_entropy())
    }

    /// Reproducible sequence of vectors for a given seed.
    pub fn seeded(dimension: usize, seed: u64) -> Result<Self> {
        Self::with_rng(dimension, StdRng::seed_from_u64(seed))
    }

    fn with_rng(dimension: usize, rng: StdRng) -> Result<Self> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidDimension(dimension));
        }
        Ok(Self {
            dimension,
            rng: Mutex::new(rng),
        })
    }
}

impl EmbeddingFunction for RandomEmbedder {
    fn generate_embedding(&self, _text: &str) -> Result<Vec<f64>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| EmbeddingError::Generation("random source lock poisoned".to_string()))?;

        Ok((0..self.dimension).map(|_| rng.gen::<f64>()).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
