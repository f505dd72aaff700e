//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for tip-store operations.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The embedding capability failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A vector did not have the dimensionality of the index.
    #[error("vector size mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    /// A corpus item has no usable embedding (empty or non-finite).
    #[error("corpus item {id} has no usable embedding")]
    MissingEmbedding { id: u64 },

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSONL parsing errors.
    #[error("parse error: {0}")]
    Parse(String),
}

impl RetrievalError {
    /// `true` for every failure of the embedding class: provider errors,
    /// dimension mismatches and missing vectors.
    pub fn is_embedding_failure(&self) -> bool {
        matches!(
            self,
            RetrievalError::Embedding(_)
                | RetrievalError::DimensionMismatch { .. }
                | RetrievalError::MissingEmbedding { .. }
        )
    }
}
