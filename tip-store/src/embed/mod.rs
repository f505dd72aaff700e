//! Embedding abstraction and policies.

use crate::errors::RetrievalError;

pub mod openai;

/// Provider interface for embedding generation.
///
/// Blocking by contract; async callers run it under `spawn_blocking`.
/// Implement this trait to plug in your own embedding backend.
pub trait EmbeddingsProvider: Send + Sync {
    /// Produces one embedding per input text, in input order.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError>;
}

/// Policy describing how to obtain embeddings while loading a corpus.
#[derive(Clone, Copy)]
pub enum EmbeddingPolicy<'a> {
    /// Use precomputed embeddings if available, otherwise generate via the provider.
    PrecomputedOr(&'a dyn EmbeddingsProvider),
    /// Always generate embeddings using the provider (ignores any precomputed vectors).
    ProviderOnly(&'a dyn EmbeddingsProvider),
}
