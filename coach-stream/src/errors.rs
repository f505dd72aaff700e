//! Typed error for the coach-stream crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    /// The generation capability failed to start or broke mid-stream.
    #[error("generation error: {0}")]
    Generation(String),

    /// The producer worker panicked; fragments already delivered stay valid.
    #[error("producer worker panicked")]
    WorkerPanicked,

    /// Buffer capacity must be at least 1.
    #[error("stream buffer capacity must be > 0")]
    InvalidCapacity,

    /// `bridge` was called outside a Tokio runtime.
    #[error("no Tokio runtime available for the producer worker")]
    NoRuntime,
}
