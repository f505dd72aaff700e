//! Tip retrieval over a small, fixed corpus.
//!
//! This crate provides:
//! - An exact in-memory [`VectorIndex`] (squared L2 and cosine ranking)
//! - A [`RetrievalService`] that embeds queries through an
//!   [`EmbeddingsProvider`] and ranks the corpus
//! - Corpus loading from the built-in squat tips or a JSONL file
//!
//! # Lifecycle
//! Build the service once at startup (single writer), wrap it in an `Arc`
//! and hand clones to every caller (many readers). Nothing in the service
//! mutates after construction; a different corpus needs a new service.

mod config;
pub mod corpus;
pub mod embed;
mod embed_pool;
mod errors;
mod index;
mod io_jsonl;
pub mod normalize;
mod record;
mod retrieve;

pub use config::RetrievalConfig;
pub use embed::{EmbeddingPolicy, EmbeddingsProvider};
pub use errors::RetrievalError;
pub use index::VectorIndex;
pub use io_jsonl::read_tip_records;
pub use record::{CorpusItem, Query, Score, ScoredTip, TipRecord};
pub use retrieve::metrics_query;

use std::sync::Arc;

use pose_metrics::SquatMetrics;
use tracing::{debug, info, trace};

/// Retrieval facade: corpus index, embedding provider and ranking defaults.
pub struct RetrievalService {
    cfg: RetrievalConfig,
    index: VectorIndex,
    embedder: Arc<dyn EmbeddingsProvider>,
}

impl RetrievalService {
    /// Wires an already built index.
    ///
    /// # Errors
    /// Returns `RetrievalError::Config` if `cfg` does not validate.
    pub fn new(
        cfg: RetrievalConfig,
        index: VectorIndex,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Self, RetrievalError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            index,
            embedder,
        })
    }

    /// Loads the configured corpus, embeds tips lacking a vector in one batch,
    /// and builds the index. Blocking; call it once at startup.
    ///
    /// # Errors
    /// Config, I/O, parse and embedding errors. The service never falls back
    /// to a partial or default corpus.
    pub fn bootstrap(
        cfg: RetrievalConfig,
        embedder: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Self, RetrievalError> {
        cfg.validate()?;
        let records = corpus::load_records(&cfg)?;
        let items = embed_pool::embed_missing(records, EmbeddingPolicy::PrecomputedOr(&*embedder))?;
        let index = VectorIndex::build(items)?;

        info!(tips = index.len(), dim = index.dim(), "tip index ready");
        Self::new(cfg, index, embedder)
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.cfg
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Similarity ranking of the corpus against free text.
    ///
    /// Returns up to `k` `(tip, cosine)` hits, best first. An empty corpus
    /// yields an empty result without calling the embedding provider.
    ///
    /// # Errors
    /// Embedding failures from the provider or a query of the wrong dimension.
    pub fn retrieve_by_text(&self, text: &str, k: usize) -> Result<Vec<ScoredTip>, RetrievalError> {
        trace!("RetrievalService::retrieve_by_text k={k}");
        retrieve::rank_by_similarity(&self.index, &*self.embedder, text, k)
    }

    /// Distance ranking of the corpus against a templated metrics query.
    ///
    /// Returns up to `k` hits by ascending squared L2 distance, with no
    /// threshold: video feedback always gets tips when the corpus has any.
    ///
    /// # Errors
    /// Embedding failures from the provider or a query of the wrong dimension.
    pub fn retrieve_by_metrics(
        &self,
        metrics: &SquatMetrics,
        k: usize,
    ) -> Result<Vec<ScoredTip>, RetrievalError> {
        let query = metrics_query(metrics);
        trace!("RetrievalService::retrieve_by_metrics k={k} query={query}");
        retrieve::rank_by_distance(&self.index, &*self.embedder, &query, k)
    }

    /// Tips relevant to a chat message: similarity ranking with the configured
    /// `top_k`, keeping only hits at or above `similarity_threshold`.
    ///
    /// An empty result means "no sufficiently relevant tip", not an error.
    pub fn relevant_tips(&self, text: &str) -> Result<Vec<ScoredTip>, RetrievalError> {
        let mut hits = self.retrieve_by_text(text, self.cfg.top_k)?;
        let before = hits.len();
        hits.retain(|h| h.score.value() >= self.cfg.similarity_threshold);
        debug!(
            candidates = before,
            kept = hits.len(),
            threshold = self.cfg.similarity_threshold,
            "relevant_tips"
        );
        Ok(hits)
    }
}
