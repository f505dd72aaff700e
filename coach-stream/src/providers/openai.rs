//! [`GenerationProvider`] over an OpenAI-compatible chat endpoint.

use std::sync::Arc;

use ai_llm_service::{ChatTurn, OpenAiService};

use crate::errors::StreamError;
use crate::generation::{FragmentIter, GenerationProvider};
use crate::prompt::ChatMessage;

/// Streams chat completions through a shared [`OpenAiService`].
pub struct OpenAiGenerator {
    svc: Arc<OpenAiService>,
}

impl OpenAiGenerator {
    pub fn new(svc: Arc<OpenAiService>) -> Self {
        Self { svc }
    }
}

impl GenerationProvider for OpenAiGenerator {
    fn stream_chat(&self, messages: &[ChatMessage]) -> Result<FragmentIter, StreamError> {
        let turns: Vec<ChatTurn<'_>> = messages
            .iter()
            .map(|m| ChatTurn {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect();

        let stream = self
            .svc
            .chat_stream(&turns)
            .map_err(|e| StreamError::Generation(e.to_string()))?;

        Ok(Box::new(stream.map(|r| {
            r.map_err(|e| StreamError::Generation(e.to_string()))
        })))
    }
}
