use crate::error_handler::{AiLlmError, ConfigError};

/// Backend that serves the OpenAI-compatible `/v1` API.
///
/// Both variants speak the same wire protocol; they differ in defaults and
/// validation (a hosted OpenAI endpoint requires an API key, a local Ollama
/// runtime does not).
///
/// # Examples
///
/// ```
/// use ai_llm_service::LlmProvider;
///
/// assert_eq!(LlmProvider::parse("OpenAI").unwrap(), LlmProvider::OpenAI);
/// assert_eq!(LlmProvider::parse("ollama").unwrap(), LlmProvider::Ollama);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Hosted OpenAI API (`https://api.openai.com`).
    OpenAI,
    /// Local Ollama runtime exposing its OpenAI-compatible endpoints.
    Ollama,
}

impl LlmProvider {
    /// Parses a provider name (case-insensitive), as found in `LLM_KIND`.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnsupportedProvider`] for unknown names.
    pub fn parse(raw: &str) -> Result<Self, AiLlmError> {
        match raw.trim().to_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string()).into()),
        }
    }

    /// Default base endpoint for this provider.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::Ollama => "http://localhost:11434",
        }
    }

    /// Whether requests must carry a bearer token.
    pub fn requires_api_key(self) -> bool {
        matches!(self, LlmProvider::OpenAI)
    }
}
