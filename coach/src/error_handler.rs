use ai_llm_service::AiLlmError;
use coach_stream::StreamError;
use pose_metrics::PoseError;
use thiserror::Error;
use tip_store::RetrievalError;

/// Error type of the coaching flows.
#[derive(Debug, Error)]
pub enum CoachError {
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Pose(#[from] PoseError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    /// No sampled frame of the video contained a usable pose.
    #[error("no squat detected in the video")]
    NoSquatDetected,

    /// The session has no user message to answer.
    #[error("conversation has no user message")]
    EmptyConversation,

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type CoachResult<T> = Result<T, CoachError>;
