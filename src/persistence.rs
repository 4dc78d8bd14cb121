//! # Persistence Module
//!
//! The vector index is read from a versioned JSON file produced ahead of time.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "header": {
//!     "version": "1.0.0",
//!     "format": "booking-index",
//!     "created_at": "2025-01-21T10:00:00Z"
//!   },
//!   "metadata": {
//!     "created_at": "2025-01-21T10:00:00Z",
//!     "vector_count": 119390,
//!     "dimension": 384,
//!     "index_type": "Flat",
//!     "metric": "Euclidean"
//!   },
//!   "index": {
//!     "Flat": { "dim": 384, "metric": "Euclidean", "data": [{"id": 0, "values": [...]}] }
//!   }
//! }
//! ```
//!
//! Vector ids are dataset row positions.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{SimilarityMetric, VectorIndex, VectorIndexWrapper};

pub const FILE_VERSION: &str = "1.0.0";
pub const FILE_FORMAT: &str = "booking-index";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileHeader {
    pub version: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
}

impl Default for FileHeader {
    fn default() -> Self {
        Self {
            version: FILE_VERSION.to_string(),
            format: FILE_FORMAT.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub created_at: DateTime<Utc>,
    pub vector_count: usize,
    pub dimension: usize,
    pub index_type: String,
    pub metric: SimilarityMetric,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexFile<I> {
    pub header: FileHeader,
    pub metadata: IndexMetadata,
    pub index: I,
}

impl<'a> IndexFile<&'a VectorIndexWrapper> {
    pub fn from_index(index: &'a VectorIndexWrapper) -> Self {
        IndexFile {
            header: FileHeader::default(),
            metadata: IndexMetadata {
                created_at: Utc::now(),
                vector_count: index.len(),
                dimension: index.dimension(),
                index_type: index.index_type().to_string(),
                metric: index.metric(),
            },
            index,
        }
    }
}

impl IndexFile<VectorIndexWrapper> {
    fn validate(&self) -> Result<(), PersistenceError> {
        if self.header.version != FILE_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: FILE_VERSION.to_string(),
                actual: self.header.version.clone(),
            });
        }

        if self.header.format != FILE_FORMAT {
            return Err(PersistenceError::InvalidFormat(format!(
                "Expected format '{}', got '{}'",
                FILE_FORMAT, self.header.format
            )));
        }

        if self.metadata.dimension != self.index.dimension() {
            return Err(PersistenceError::InvalidFormat(format!(
                "Metadata dimension {} does not match index dimension {}",
                self.metadata.dimension,
                self.index.dimension()
            )));
        }

        if self.metadata.vector_count != self.index.len() {
            return Err(PersistenceError::InvalidFormat(format!(
                "Metadata declares {} vectors, index holds {}",
                self.metadata.vector_count,
                self.index.len()
            )));
        }

        Ok(())
    }
}

/// Write an index file, atomically replacing any existing file at `path`.
pub fn save_index_to_file(index: &VectorIndexWrapper, path: &Path) -> Result<(), PersistenceError> {
    let file = IndexFile::from_index(index);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write to a temporary file first, then rename
    let temp_path = path.with_extension("tmp");
    let json_data = serde_json::to_string(&file)?;
    fs::write(&temp_path, json_data)?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

pub fn load_index_from_file(path: &Path) -> Result<VectorIndexWrapper, PersistenceError> {
    let json_data = fs::read_to_string(path)?;
    let file: IndexFile<VectorIndexWrapper> = serde_json::from_str(&json_data)?;
    file.validate()?;
    Ok(file.index)
}
