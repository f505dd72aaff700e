//! The built-in squat tip corpus and corpus loading.

use tracing::info;

use crate::config::RetrievalConfig;
use crate::embed::{EmbeddingPolicy, EmbeddingsProvider};
use crate::embed_pool::embed_missing;
use crate::errors::RetrievalError;
use crate::io_jsonl::read_tip_records;
use crate::record::{CorpusItem, TipRecord};

const SQUAT_TIPS: [&str; 10] = [
    "Maintain a neutral spine throughout the squat to protect your lower back.",
    "Drive your knees outward, keeping them aligned with your toes.",
    "Push through your heels to engage your glutes and hamstrings.",
    "Keep your chest up and gaze forward to stabilize your torso.",
    "Brace your core by inhaling before descending to support your spine.",
    "Lower yourself until your thighs are parallel to the floor or below.",
    "Avoid locking your knees at the top to maintain tension.",
    "Control the descent and ascent; avoid bouncing at the bottom.",
    "Distribute weight evenly between both feet for balanced strength.",
    "Ensure full hip and knee extension at the top of each rep.",
];

/// The built-in tips, ids `0..10` in order, without embeddings.
pub fn default_tips() -> Vec<TipRecord> {
    SQUAT_TIPS
        .iter()
        .enumerate()
        .map(|(i, t)| TipRecord {
            id: i as u64,
            text: (*t).to_string(),
            embedding: None,
        })
        .collect()
}

/// Loads the corpus named by `cfg.tips_path`, or the built-in tips.
///
/// # Errors
/// I/O and parse errors from the JSONL reader.
pub fn load_records(cfg: &RetrievalConfig) -> Result<Vec<TipRecord>, RetrievalError> {
    match cfg.tips_path.as_ref() {
        Some(path) => read_tip_records(path),
        None => {
            info!(count = SQUAT_TIPS.len(), "using built-in squat tips");
            Ok(default_tips())
        }
    }
}

/// Embeds `texts` in one batch call; ids are `0..N` in input order.
///
/// # Errors
/// Provider errors unchanged; [`RetrievalError::Embedding`] if the provider
/// returns a different number of vectors than texts.
pub fn embed_all<S: AsRef<str>>(
    texts: &[S],
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<CorpusItem>, RetrievalError> {
    let records = texts
        .iter()
        .enumerate()
        .map(|(i, t)| TipRecord {
            id: i as u64,
            text: t.as_ref().to_string(),
            embedding: None,
        })
        .collect();
    embed_missing(records, EmbeddingPolicy::ProviderOnly(provider))
}
