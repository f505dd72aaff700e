//! OpenAI-compatible embedding provider.
//!
//! Wraps the blocking [`OpenAiService`] and enforces a fixed dimension when
//! one is configured.

use std::sync::Arc;

use ai_llm_service::OpenAiService;
use tracing::warn;

use crate::{EmbeddingsProvider, RetrievalError};

/// Embedding provider backed by `/v1/embeddings`.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    svc: Arc<OpenAiService>,
    dim: Option<usize>,
}

impl OpenAiEmbedder {
    /// `dim`: expected embedding size, or `None` to accept whatever the model returns.
    pub fn new(svc: Arc<OpenAiService>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for OpenAiEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let vectors = self
            .svc
            .embeddings(texts)
            .map_err(|e| RetrievalError::Embedding(e.to_string()))?;
        check_dim(&vectors, self.dim)?;
        Ok(vectors)
    }
}

fn check_dim(vectors: &[Vec<f32>], want: Option<usize>) -> Result<(), RetrievalError> {
    let Some(want) = want else {
        return Ok(());
    };
    match vectors.iter().find(|v| v.len() != want) {
        Some(bad) => {
            warn!(got = bad.len(), want, "embedding dimension mismatch");
            Err(RetrievalError::DimensionMismatch {
                got: bad.len(),
                want,
            })
        }
        None => Ok(()),
    }
}
