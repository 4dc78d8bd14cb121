//! # Error Types Module
//!
//! Typed errors for the request flows and for startup, each mapped to an HTTP
//! status code. Request errors keep the JSON body shapes clients already
//! parse: `{"error": ...}` for client-facing outcomes and
//! `{"error": "Internal Server Error", "details": ...}` for server faults.

use axum::http::StatusCode;
use thiserror::Error;

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum AssistantError {
    /// Unknown analytics metric name
    #[error("Invalid metric")]
    InvalidMetric { metric: String },

    /// Search returned no positions
    #[error("No matching results found.")]
    NoResults,

    /// Query embedding does not match the index dimension
    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Search returned a position with no dataset row behind it
    #[error("Row {position} is out of range for a dataset of {rows} rows")]
    RowOutOfRange { position: u64, rows: usize },

    /// Index and dataset disagree on the number of entries
    #[error("Index holds {vectors} vectors but the dataset has {rows} rows")]
    IndexSizeMismatch { vectors: usize, rows: usize },

    /// Index refers to a row id the dataset does not have, or repeats one
    #[error("Index vector id {id} does not map to a unique row of a dataset of {rows} rows")]
    UnknownRow { id: u64, rows: usize },

    #[error("Embedding generation failed: {0}")]
    EmbeddingError(#[from] crate::embeddings::EmbeddingError),

    #[error("Dataset error: {0}")]
    DatasetError(#[from] crate::dataset::DatasetError),

    #[error("Persistence error: {0}")]
    PersistenceError(#[from] crate::persistence::PersistenceError),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AssistantError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AssistantError::InvalidMetric { .. } => StatusCode::BAD_REQUEST,
            AssistantError::NoResults => StatusCode::NOT_FOUND,
            AssistantError::DimensionMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::RowOutOfRange { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::IndexSizeMismatch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::UnknownRow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::EmbeddingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::DatasetError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::PersistenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AssistantError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// `error` field of the response body.
    pub fn error_label(&self) -> String {
        if self.is_server_error() {
            INTERNAL_SERVER_ERROR.to_string()
        } else {
            self.to_string()
        }
    }

    /// `details` field of the response body, only present for server faults.
    pub fn details(&self) -> Option<String> {
        self.is_server_error().then(|| self.to_string())
    }
}

pub type AssistantResult<T> = Result<T, AssistantError>;
