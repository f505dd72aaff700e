//! Unified error types for the crate.

use thiserror::Error;

/// Errors produced while extracting pose metrics.
///
/// "No pose detected" is not an error; [`crate::PoseAnalyzer::analyze`]
/// reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum PoseError {
    /// The landmark detector failed on a frame.
    #[error("landmark detector error: {0}")]
    Detector(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    InvalidConfig(String),
}
