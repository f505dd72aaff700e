//! Retrieval helpers: query embedding and the two ranking modes.

use pose_metrics::SquatMetrics;
use tracing::trace;

use crate::embed::EmbeddingsProvider;
use crate::errors::RetrievalError;
use crate::index::VectorIndex;
use crate::record::{Query, ScoredTip};

/// Natural-language query used to look up tips for measured squat angles.
pub fn metrics_query(metrics: &SquatMetrics) -> String {
    format!(
        "Tips for knee {:.1}° and trunk {:.1}°",
        metrics.knee_angle, metrics.trunk_angle
    )
}

/// Embeds a single query text.
///
/// # Errors
/// Provider errors unchanged; [`RetrievalError::Embedding`] if the provider
/// does not return exactly one vector.
pub fn embed_query(provider: &dyn EmbeddingsProvider, text: &str) -> Result<Query, RetrievalError> {
    let raw_text = text.to_string();
    let mut vectors = provider.embed(std::slice::from_ref(&raw_text))?;
    if vectors.len() != 1 {
        return Err(RetrievalError::Embedding(format!(
            "expected 1 query vector, got {}",
            vectors.len()
        )));
    }
    let embedding = vectors.remove(0);
    Ok(Query {
        raw_text,
        embedding,
    })
}

/// Distance ranking: `k` nearest tips by squared L2.
pub fn rank_by_distance(
    index: &VectorIndex,
    provider: &dyn EmbeddingsProvider,
    text: &str,
    k: usize,
) -> Result<Vec<ScoredTip>, RetrievalError> {
    if index.is_empty() || k == 0 {
        trace!("retrieve::rank_by_distance: nothing to rank");
        return Ok(Vec::new());
    }
    let q = embed_query(provider, text)?;
    let hits = index.search(&q.embedding, k)?;
    trace!(query = %q.raw_text, hits = hits.len(), "retrieve::rank_by_distance");
    Ok(hits)
}

/// Similarity ranking: `k` most similar tips by cosine similarity.
pub fn rank_by_similarity(
    index: &VectorIndex,
    provider: &dyn EmbeddingsProvider,
    text: &str,
    k: usize,
) -> Result<Vec<ScoredTip>, RetrievalError> {
    if index.is_empty() || k == 0 {
        trace!("retrieve::rank_by_similarity: nothing to rank");
        return Ok(Vec::new());
    }
    let q = embed_query(provider, text)?;
    let hits = index.cosine_search(&q.embedding, k)?;
    trace!(query = %q.raw_text, hits = hits.len(), "retrieve::rank_by_similarity");
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_query_uses_one_decimal() {
        let m = SquatMetrics {
            knee_angle: 95.04,
            trunk_angle: 40.0,
        };
        assert_eq!(metrics_query(&m), "Tips for knee 95.0° and trunk 40.0°");
    }

    struct TwoVectors;

    impl EmbeddingsProvider for TwoVectors {
        fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
            Ok(vec![vec![1.0], vec![2.0]])
        }
    }

    #[test]
    fn query_must_embed_to_one_vector() {
        let err = embed_query(&TwoVectors, "knees").unwrap_err();
        assert!(err.is_embedding_failure());
    }
}
