use crate::{
    config::llm_provider::LlmProvider,
    error_handler::{AiLlmError, ConfigError, validate_http_endpoint, validate_range_f32},
};

/// Configuration for chat and embedding calls against one endpoint.
///
/// # Fields
///
/// - `provider`: which backend serves the endpoint (OpenAI or Ollama).
/// - `endpoint`: base URL without the `/v1/...` suffix.
/// - `api_key`: bearer token, required for [`LlmProvider::OpenAI`].
/// - `chat_model`: model used for streaming chat completions.
/// - `embedding_model`: model used for `/v1/embeddings`.
/// - `max_tokens`: optional completion cap.
/// - `temperature`: sampling temperature for chat.
/// - `top_p`: optional nucleus sampling cutoff.
/// - `timeout_secs`: optional timeout for the whole request. Streaming chat
///   responses are read through the same client, so keep it generous.
///
/// # Examples
///
/// ```
/// use ai_llm_service::{LlmModelConfig, LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Ollama,
///     endpoint: "http://localhost:11434".to_string(),
///     api_key: None,
///     chat_model: "llama3.1".to_string(),
///     embedding_model: "nomic-embed-text".to_string(),
///     max_tokens: None,
///     temperature: Some(0.7),
///     top_p: None,
///     timeout_secs: Some(120),
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Backend kind.
    pub provider: LlmProvider,

    /// Base URL (e.g. `https://api.openai.com`).
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Chat completion model (e.g. `"gpt-4o-mini"`).
    pub chat_model: String,

    /// Embedding model (e.g. `"text-embedding-ada-002"`).
    pub embedding_model: String,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Nucleus sampling parameter.
    pub top_p: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks the invariants a client relies on.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyModel`] if a model name is blank
    /// - [`ConfigError::MissingVar`] if the provider needs a key and none is set
    /// - [`ConfigError::InvalidFormat`] for a non-http endpoint
    /// - [`ConfigError::OutOfRange`] for temperature/top_p outside their ranges
    pub fn validate(&self) -> Result<(), AiLlmError> {
        if self.chat_model.trim().is_empty() || self.embedding_model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        if self.provider.requires_api_key()
            && self.api_key.as_deref().is_none_or(|k| k.trim().is_empty())
        {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY").into());
        }
        validate_http_endpoint("LLM_ENDPOINT", &self.endpoint)?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

impl Default for LlmModelConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            endpoint: LlmProvider::OpenAI.default_endpoint().to_string(),
            api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            max_tokens: None,
            temperature: Some(0.7),
            top_p: None,
            timeout_secs: Some(120),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openai_requires_key() {
        let cfg = LlmModelConfig::default();
        assert!(cfg.validate().is_err());

        let cfg = LlmModelConfig {
            api_key: Some("sk-test".into()),
            ..LlmModelConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn ollama_needs_no_key_but_a_valid_endpoint() {
        let mut cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            endpoint: "http://localhost:11434".into(),
            ..LlmModelConfig::default()
        };
        assert!(cfg.validate().is_ok());

        cfg.endpoint = "localhost:11434".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            temperature: Some(3.5),
            ..LlmModelConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
