//! Provider plumbing shared by the squat-coach crates.
//!
//! - [`config`]: env-driven model configuration for an OpenAI-compatible endpoint.
//! - [`services::open_ai_service`]: blocking client for embeddings and streaming chat.
//! - [`error_handler`]: unified error type and env/validation helpers.
//! - [`telemetry`]: a workspace-scoped `tracing-subscriber` fmt layer.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::{
    default_config::config_from_env, llm_model_config::LlmModelConfig, llm_provider::LlmProvider,
};
pub use error_handler::{AiLlmError, Result};
pub use services::open_ai_service::{ChatCompletionStream, ChatTurn, OpenAiService};
