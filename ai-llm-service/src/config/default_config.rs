//! LLM config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `LLM_KIND`          = provider kind (`openai` | `ollama`), default `openai`
//! - `LLM_ENDPOINT`      = base URL, defaults to the provider's public/local endpoint
//! - `OPENAI_API_KEY`    = bearer token (mandatory for `openai`)
//! - `CHAT_MODEL`        = chat model, default `gpt-4o-mini`
//! - `EMBEDDING_MODEL`   = embedding model, default `text-embedding-ada-002`
//! - `LLM_TEMPERATURE`   = optional f32, default `0.7`
//! - `LLM_TOP_P`         = optional f32
//! - `LLM_MAX_TOKENS`    = optional u32
//! - `LLM_TIMEOUT_SECS`  = optional u64, default `120`

use tracing::debug;

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, env_opt, env_opt_f32, env_opt_u32, env_opt_u64, env_or},
};

/// Builds and validates a [`LlmModelConfig`] from the environment.
///
/// # Errors
///
/// - [`crate::error_handler::ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`crate::error_handler::ConfigError::InvalidNumber`] for malformed numbers
/// - any error from [`LlmModelConfig::validate`]
pub fn config_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let defaults = LlmModelConfig::default();

    let provider = match env_opt("LLM_KIND") {
        Some(kind) => LlmProvider::parse(&kind)?,
        None => LlmProvider::OpenAI,
    };

    let cfg = LlmModelConfig {
        provider,
        endpoint: env_or("LLM_ENDPOINT", provider.default_endpoint()),
        api_key: env_opt("OPENAI_API_KEY"),
        chat_model: env_or("CHAT_MODEL", &defaults.chat_model),
        embedding_model: env_or("EMBEDDING_MODEL", &defaults.embedding_model),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: env_opt_f32("LLM_TEMPERATURE")?.or(defaults.temperature),
        top_p: env_opt_f32("LLM_TOP_P")?,
        timeout_secs: env_opt_u64("LLM_TIMEOUT_SECS")?.or(defaults.timeout_secs),
    };

    cfg.validate()?;

    debug!(
        provider = ?cfg.provider,
        endpoint = %cfg.endpoint,
        chat_model = %cfg.chat_model,
        embedding_model = %cfg.embedding_model,
        "LLM config loaded from env"
    );

    Ok(cfg)
}
