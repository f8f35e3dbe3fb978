//! Feature merge and yield scoring
//!
//! Joins seasonal feature rows against the static per-sample embedding
//! table, lays the result out in the fixed model column order, and ranks
//! the model's predictions.

pub mod embeddings;
pub mod merge;
pub mod model;
pub mod scorer;

pub use embeddings::*;
pub use merge::*;
pub use model::*;
pub use scorer::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Embedding table is empty")]
    EmptyTable,

    #[error("Embedding dimension mismatch for sample {sample}: expected {expected}, got {actual}")]
    EmbeddingDimension {
        sample: String,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown feature column: {0}")]
    UnknownColumn(String),

    #[error("Model returned {actual} predictions for {expected} rows")]
    PredictionCount { expected: usize, actual: usize },
}

pub type ScoringResult<T> = Result<T, ScoringError>;
