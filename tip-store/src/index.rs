//! Exact in-memory vector index over the tip corpus.
//!
//! Raw embeddings and their L2 norms are stored once at build time. The
//! unit-length copies used for cosine ranking are derived on first use and
//! cached. Distance ranking (raw vectors) and similarity ranking (normalized
//! vectors) can disagree on order when corpus norms differ; that is expected.
//!
//! The index has no mutation API. A new corpus means a new index.

use std::cmp::Ordering;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::errors::RetrievalError;
use crate::normalize::{dot, l2_norm, normalized, normalized_with, squared_l2};
use crate::record::{CorpusItem, Score, ScoredTip};

/// Immutable exact-search index. `Send + Sync`; share it behind an `Arc`.
#[derive(Debug)]
pub struct VectorIndex {
    items: Vec<Arc<CorpusItem>>,
    norms: Vec<f32>,
    dim: usize,
    unit: OnceLock<Vec<Vec<f32>>>,
}

impl VectorIndex {
    /// Builds the index from fully embedded corpus items, keeping their order.
    ///
    /// # Errors
    /// - [`RetrievalError::MissingEmbedding`] for an empty or non-finite vector
    /// - [`RetrievalError::DimensionMismatch`] if vectors differ in length
    pub fn build(items: Vec<CorpusItem>) -> Result<Self, RetrievalError> {
        let dim = items.first().map(|it| it.embedding.len()).unwrap_or(0);

        let mut norms = Vec::with_capacity(items.len());
        for it in &items {
            if it.embedding.is_empty() || it.embedding.iter().any(|x| !x.is_finite()) {
                return Err(RetrievalError::MissingEmbedding { id: it.id });
            }
            if it.embedding.len() != dim {
                return Err(RetrievalError::DimensionMismatch {
                    got: it.embedding.len(),
                    want: dim,
                });
            }
            norms.push(l2_norm(&it.embedding));
        }

        debug!(size = items.len(), dim, "vector index built");

        Ok(Self {
            items: items.into_iter().map(Arc::new).collect(),
            norms,
            dim,
            unit: OnceLock::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Vector dimensionality, `0` for an empty index.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn items(&self) -> &[Arc<CorpusItem>] {
        &self.items
    }

    /// L2 norms of the raw embeddings, in corpus order.
    pub fn norms(&self) -> &[f32] {
        &self.norms
    }

    /// Unit-length embeddings in corpus order, computed once.
    pub fn normalized_vectors(&self) -> &[Vec<f32>] {
        self.unit.get_or_init(|| {
            trace!(size = self.items.len(), "normalizing corpus vectors");
            self.items
                .iter()
                .zip(&self.norms)
                .map(|(it, &n)| normalized_with(&it.embedding, n))
                .collect()
        })
    }

    /// The `k` nearest items by squared Euclidean distance, ascending.
    ///
    /// # Errors
    /// [`RetrievalError::DimensionMismatch`] if `query` has the wrong length.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredTip>, RetrievalError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dim(query)?;

        let scores: Vec<f32> = self
            .items
            .iter()
            .map(|it| squared_l2(query, &it.embedding))
            .collect();

        Ok(self.top_k(scores, k, |a, b| a.total_cmp(b), Score::SquaredL2))
    }

    /// The `k` most similar items by cosine similarity, descending.
    ///
    /// The query is normalized the same way as the corpus vectors.
    ///
    /// # Errors
    /// [`RetrievalError::DimensionMismatch`] if `query` has the wrong length.
    pub fn cosine_search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredTip>, RetrievalError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.check_dim(query)?;

        let q = normalized(query);
        let scores: Vec<f32> = self
            .normalized_vectors()
            .iter()
            .map(|v| dot(&q, v))
            .collect();

        Ok(self.top_k(scores, k, |a, b| b.total_cmp(a), Score::Cosine))
    }

    fn check_dim(&self, query: &[f32]) -> Result<(), RetrievalError> {
        if query.len() != self.dim {
            return Err(RetrievalError::DimensionMismatch {
                got: query.len(),
                want: self.dim,
            });
        }
        Ok(())
    }

    /// Stable sort of positions by `cmp` on their scores; ties keep corpus order.
    fn top_k(
        &self,
        scores: Vec<f32>,
        k: usize,
        cmp: impl Fn(&f32, &f32) -> Ordering,
        wrap: fn(f32) -> Score,
    ) -> Vec<ScoredTip> {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| cmp(&scores[a], &scores[b]));
        order
            .into_iter()
            .take(k)
            .map(|i| ScoredTip {
                item: Arc::clone(&self.items[i]),
                score: wrap(scores[i]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, embedding: Vec<f32>) -> CorpusItem {
        CorpusItem {
            id,
            text: format!("tip {id}"),
            embedding,
        }
    }

    fn two_tips() -> VectorIndex {
        VectorIndex::build(vec![item(1, vec![1.0, 0.0]), item(2, vec![0.0, 1.0])]).unwrap()
    }

    #[test]
    fn nearest_first_by_distance() {
        let idx = two_tips();
        let hits = idx.search(&[0.9, 0.1], 2).unwrap();
        assert_eq!(hits[0].item.id, 1);
        assert_eq!(hits[1].item.id, 2);
        assert!(matches!(hits[0].score, Score::SquaredL2(d) if (d - 0.02).abs() < 1e-6));
        assert!(matches!(hits[1].score, Score::SquaredL2(d) if (d - 1.62).abs() < 1e-6));
    }

    #[test]
    fn cosine_scores_match_hand_computation() {
        let idx = two_tips();
        let hits = idx.cosine_search(&[0.9, 0.1], 2).unwrap();
        assert_eq!(hits[0].item.id, 1);
        assert!((hits[0].score.value() - 0.9939).abs() < 1e-3);
        assert!((hits[1].score.value() - 0.1104).abs() < 1e-3);
    }

    #[test]
    fn exactly_k_sorted_results_for_any_k_up_to_n() {
        let items: Vec<CorpusItem> = (0..12u64)
            .map(|i| {
                let f = i as f32;
                item(i, vec![(f * 0.7).sin(), (f * 1.3).cos(), f / 12.0])
            })
            .collect();
        let idx = VectorIndex::build(items).unwrap();
        let q = [0.2, -0.4, 0.5];

        for k in 0..=idx.len() {
            let hits = idx.search(&q, k).unwrap();
            assert_eq!(hits.len(), k);
            assert!(
                hits.windows(2)
                    .all(|w| w[0].score.value() <= w[1].score.value())
            );
        }
    }

    #[test]
    fn k_larger_than_corpus_returns_everything() {
        let idx = two_tips();
        assert_eq!(idx.search(&[1.0, 1.0], 10).unwrap().len(), 2);
        assert_eq!(idx.cosine_search(&[1.0, 1.0], 10).unwrap().len(), 2);
    }

    #[test]
    fn self_query_has_unit_similarity_and_ranks_first() {
        let items = vec![
            item(0, vec![0.3, 2.0, -1.0]),
            item(1, vec![5.0, 0.1, 0.2]),
            item(2, vec![-0.4, 0.4, 3.0]),
        ];
        let idx = VectorIndex::build(items.clone()).unwrap();
        for it in &items {
            let hits = idx.cosine_search(&it.embedding, 3).unwrap();
            assert_eq!(hits[0].item.id, it.id);
            assert!((hits[0].score.value() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn rankings_may_disagree_on_non_uniform_norms() {
        // Long vector along the query direction vs short vector close by.
        let idx = VectorIndex::build(vec![item(0, vec![8.0, 6.0]), item(1, vec![0.6, 0.8])])
            .unwrap();
        let q = [0.8, 0.6];
        assert_eq!(idx.search(&q, 1).unwrap()[0].item.id, 1);
        assert_eq!(idx.cosine_search(&q, 1).unwrap()[0].item.id, 0);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let idx = VectorIndex::build(Vec::new()).unwrap();
        assert!(idx.is_empty());
        assert_eq!(idx.dim(), 0);
        assert!(idx.search(&[1.0, 2.0, 3.0], 3).unwrap().is_empty());
        assert!(idx.cosine_search(&[1.0], 3).unwrap().is_empty());
    }

    #[test]
    fn build_rejects_unusable_embeddings() {
        let err = VectorIndex::build(vec![item(7, vec![])]).unwrap_err();
        assert!(matches!(err, RetrievalError::MissingEmbedding { id: 7 }));

        let err = VectorIndex::build(vec![item(1, vec![f32::NAN, 1.0])]).unwrap_err();
        assert!(err.is_embedding_failure());

        let err = VectorIndex::build(vec![item(1, vec![1.0, 0.0]), item(2, vec![1.0])])
            .unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch { got: 1, want: 2 }
        ));
    }

    #[test]
    fn query_dimension_is_checked() {
        let idx = two_tips();
        assert!(matches!(
            idx.search(&[1.0, 0.0, 0.0], 1),
            Err(RetrievalError::DimensionMismatch { got: 3, want: 2 })
        ));
        assert!(idx.cosine_search(&[1.0], 1).unwrap_err().is_embedding_failure());
    }

    #[test]
    fn normalized_vectors_are_cached_unit_vectors() {
        let idx = VectorIndex::build(vec![item(0, vec![3.0, 4.0])]).unwrap();
        let first = idx.normalized_vectors().as_ptr();
        assert!((idx.normalized_vectors()[0][0] - 0.6).abs() < 1e-6);
        assert_eq!(first, idx.normalized_vectors().as_ptr());
        assert_eq!(idx.norms(), &[5.0]);
    }
}
