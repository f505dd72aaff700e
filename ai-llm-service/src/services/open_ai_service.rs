//! OpenAI-compatible service for batch embeddings and streaming chat.
//!
//! Blocking client around the OpenAI REST API (also served by Ollama under `/v1`).
//! Endpoints are derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions — chat completion with `stream: true`
//! - POST {endpoint}/v1/embeddings       — batch embeddings retrieval
//!
//! The client is blocking on purpose: callers run it on a dedicated thread
//! (`spawn_blocking`) and bridge the resulting iterator into async code.
//!
//! Constructor validation is delegated to [`LlmModelConfig::validate`].

use std::io::{BufRead, BufReader, Lines};
use std::time::{Duration, Instant};

use reqwest::{blocking, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet},
};

/// One chat message in wire form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ChatTurn<'a> {
    /// One of: "system" | "user" | "assistant".
    pub role: &'a str,
    pub content: &'a str,
}

/// Thin blocking client for an OpenAI-compatible API.
///
/// High-level operations:
/// - [`OpenAiService::embeddings`]  — one vector per input text, in input order
/// - [`OpenAiService::chat_stream`] — iterator over streamed content deltas
#[derive(Debug)]
pub struct OpenAiService {
    client: blocking::Client,
    cfg: LlmModelConfig,
    provider: Provider,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - [`AiLlmError::Config`] if the config does not validate
    /// - [`AiLlmError::Provider`] with `Decode` if the API key is not a valid header value
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        cfg.validate()?;

        let provider = match cfg.provider {
            LlmProvider::OpenAI => Provider::OpenAI,
            LlmProvider::Ollama => Provider::Ollama,
        };

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(120));

        let mut headers = header::HeaderMap::new();
        if let Some(key) = cfg.api_key.as_deref() {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    ProviderError::new(
                        provider,
                        ProviderErrorKind::Decode(format!("invalid API key header: {e}")),
                    )
                })?,
            );
        }
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = cfg.endpoint.trim().trim_end_matches('/').to_string();
        let url_chat = format!("{base}/v1/chat/completions");
        let url_embeddings = format!("{base}/v1/embeddings");

        info!(
            provider = ?cfg.provider,
            chat_model = %cfg.chat_model,
            embedding_model = %cfg.embedding_model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            provider,
            url_chat,
            url_embeddings,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &LlmModelConfig {
        &self.cfg
    }

    /// Retrieves one embedding per input via `/v1/embeddings`.
    ///
    /// The output is reordered by the `index` field of each item, so it
    /// always lines up with `inputs`.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    /// - [`AiLlmError::Provider`] with `Decode` if the JSON cannot be parsed
    /// - [`AiLlmError::Provider`] with `CountMismatch` if vectors are missing
    pub fn embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AiLlmError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.embedding_model,
            input: inputs,
        };

        debug!(
            model = %self.cfg.embedding_model,
            inputs = inputs.len(),
            "POST {}", self.url_embeddings
        );

        let resp = self.client.post(&self.url_embeddings).json(&body).send()?;
        let resp = self.check_status(resp, &self.url_embeddings, started)?;

        let out: EmbeddingsResponse = resp.json().map_err(|e| {
            error!(
                error = %e,
                model = %self.cfg.embedding_model,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode /v1/embeddings response"
            );
            ProviderError::new(
                self.provider,
                ProviderErrorKind::Decode(format!("serde error: {e}; expected `data[].embedding`")),
            )
        })?;

        let vectors = order_embeddings(out.data);
        if vectors.len() != inputs.len() {
            return Err(ProviderError::new(
                self.provider,
                ProviderErrorKind::CountMismatch {
                    got: vectors.len(),
                    want: inputs.len(),
                },
            )
            .into());
        }

        info!(
            model = %self.cfg.embedding_model,
            count = vectors.len(),
            latency_ms = started.elapsed().as_millis(),
            "embeddings completed"
        );

        Ok(vectors)
    }

    /// Starts a **streaming** chat completion (`/v1/chat/completions`, `stream: true`).
    ///
    /// The request is sent and the status checked before returning; the body
    /// is then consumed lazily by the returned iterator. Dropping the iterator
    /// drops the response and closes the connection.
    ///
    /// # Errors
    /// - [`AiLlmError::Provider`] with `HttpStatus` for non-2xx responses
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    pub fn chat_stream(&self, messages: &[ChatTurn<'_>]) -> Result<ChatCompletionStream, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest {
            model: &self.cfg.chat_model,
            messages,
            temperature: self.cfg.temperature,
            top_p: self.cfg.top_p,
            max_tokens: self.cfg.max_tokens,
            stream: true,
        };

        debug!(
            model = %self.cfg.chat_model,
            messages = messages.len(),
            "POST {} (stream)", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send()?;
        let resp = self.check_status(resp, &self.url_chat, started)?;

        info!(
            model = %self.cfg.chat_model,
            latency_ms = started.elapsed().as_millis(),
            "chat stream opened"
        );

        Ok(ChatCompletionStream {
            lines: BufReader::new(resp).lines(),
            provider: self.provider,
            finished: false,
            started,
        })
    }

    fn check_status(
        &self,
        resp: blocking::Response,
        url: &str,
        started: Instant,
    ) -> Result<blocking::Response, AiLlmError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().unwrap_or_default();
        let snippet = make_snippet(&text);

        error!(
            %status,
            %url,
            %snippet,
            latency_ms = started.elapsed().as_millis(),
            "provider returned non-success status"
        );

        Err(ProviderError::new(
            self.provider,
            ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet,
            }),
        )
        .into())
    }
}

/// Blocking iterator over content deltas of a streamed chat completion.
///
/// Yields only non-empty deltas. Ends after `data: [DONE]` or at end of body;
/// yields a single error and then ends if the stream breaks.
pub struct ChatCompletionStream {
    lines: Lines<BufReader<blocking::Response>>,
    provider: Provider,
    finished: bool,
    started: Instant,
}

impl Iterator for ChatCompletionStream {
    type Item = Result<String, AiLlmError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    warn!(error = %e, "chat stream read failed");
                    return Some(Err(ProviderError::new(
                        self.provider,
                        ProviderErrorKind::Stream(e.to_string()),
                    )
                    .into()));
                }
                None => {
                    self.finished = true;
                    debug!("chat stream ended without [DONE]");
                    return None;
                }
            };

            match parse_sse_line(&line) {
                SseEvent::Skip => continue,
                SseEvent::Delta(text) => return Some(Ok(text)),
                SseEvent::Done => {
                    self.finished = true;
                    info!(
                        latency_ms = self.started.elapsed().as_millis(),
                        "chat stream completed"
                    );
                    return None;
                }
                SseEvent::Failed(msg) => {
                    self.finished = true;
                    return Some(Err(ProviderError::new(
                        self.provider,
                        ProviderErrorKind::Stream(msg),
                    )
                    .into()));
                }
            }
        }
    }
}

/// One decoded server-sent-event line.
#[derive(Debug, PartialEq)]
enum SseEvent {
    /// Comment, keep-alive, blank line or a chunk without content.
    Skip,
    Delta(String),
    Done,
    Failed(String),
}

fn parse_sse_line(line: &str) -> SseEvent {
    let Some(data) = line.trim_end().strip_prefix("data:") else {
        return SseEvent::Skip;
    };
    let data = data.trim_start();
    if data == "[DONE]" {
        return SseEvent::Done;
    }

    match serde_json::from_str::<ChatChunk>(data) {
        Ok(ChatChunk {
            error: Some(err), ..
        }) => SseEvent::Failed(err.message),
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .find_map(|c| c.delta.content.filter(|s| !s.is_empty()))
            .map(SseEvent::Delta)
            .unwrap_or(SseEvent::Skip),
        Err(e) => SseEvent::Failed(format!("undecodable chunk: {e}")),
    }
}

fn order_embeddings(mut items: Vec<EmbeddingItem>) -> Vec<Vec<f32>> {
    items.sort_by_key(|it| it.index);
    items.into_iter().map(|it| it.embedding).collect()
}

/* ===========================================================================
HTTP payloads & options
======================================================================== */

/// Request body for `/v1/chat/completions`.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn<'a>],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

/// One `data:` payload of a streamed completion.
#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    #[serde(default)]
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    message: String,
}

/// Request body for `/v1/embeddings`.
#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

/// Response body for `/v1/embeddings`.
#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
