//! Corpus embedding in one batch call, honouring the embedding policy.

use tracing::{debug, info};

use crate::{
    embed::EmbeddingPolicy,
    errors::RetrievalError,
    record::{CorpusItem, TipRecord},
};

/// Turns tip records into corpus items, embedding those that need it.
///
/// With [`EmbeddingPolicy::PrecomputedOr`], records that already carry a
/// vector keep it; with [`EmbeddingPolicy::ProviderOnly`], every record is
/// embedded. All texts that need a vector go to the provider in a single call.
///
/// # Errors
/// Propagates provider errors unchanged; returns [`RetrievalError::Embedding`]
/// if the provider returns a different number of vectors than requested.
pub fn embed_missing(
    records: Vec<TipRecord>,
    policy: EmbeddingPolicy<'_>,
) -> Result<Vec<CorpusItem>, RetrievalError> {
    let (provider, keep_precomputed) = match policy {
        EmbeddingPolicy::PrecomputedOr(p) => (p, true),
        EmbeddingPolicy::ProviderOnly(p) => (p, false),
    };

    let idxs: Vec<usize> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| (!keep_precomputed || r.embedding.is_none()).then_some(i))
        .collect();

    info!(
        total = records.len(),
        to_embed = idxs.len(),
        "embed_pool::embed_missing"
    );

    let mut vectors: Vec<Option<Vec<f32>>> = records.iter().map(|r| r.embedding.clone()).collect();

    if !idxs.is_empty() {
        let texts: Vec<String> = idxs.iter().map(|&i| records[i].text.clone()).collect();
        let embedded = provider.embed(&texts)?;
        if embedded.len() != texts.len() {
            return Err(RetrievalError::Embedding(format!(
                "provider returned {} vectors for {} texts",
                embedded.len(),
                texts.len()
            )));
        }
        for (i, v) in idxs.into_iter().zip(embedded) {
            vectors[i] = Some(v);
        }
    } else {
        debug!("embed_pool::embed_missing: nothing to embed");
    }

    Ok(records
        .into_iter()
        .zip(vectors)
        .map(|(r, v)| CorpusItem {
            id: r.id,
            text: r.text,
            embedding: v.unwrap_or_default(),
        })
        .collect())
}
