//! Core data models used by the library.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One reference tip with its embedding. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CorpusItem {
    pub id: u64,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A tip as read from a corpus file, before embedding.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TipRecord {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// A query text and its embedding. Created per retrieval call.
#[derive(Clone, Debug)]
pub struct Query {
    pub raw_text: String,
    pub embedding: Vec<f32>,
}

/// Ranking score. The two metrics live on different scales and orderings and
/// are never compared with each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Score {
    /// Squared Euclidean distance; lower is better.
    SquaredL2(f32),
    /// Cosine similarity in `[-1, 1]`; higher is better.
    Cosine(f32),
}

impl Score {
    pub fn value(self) -> f32 {
        match self {
            Score::SquaredL2(v) | Score::Cosine(v) => v,
        }
    }
}

/// A single retrieval hit.
#[derive(Clone, Debug)]
pub struct ScoredTip {
    pub item: Arc<CorpusItem>,
    pub score: Score,
}

impl ScoredTip {
    pub fn text(&self) -> &str {
        &self.item.text
    }
}
