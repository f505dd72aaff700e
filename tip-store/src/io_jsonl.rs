//! JSONL reader for tip corpora.
//!
//! One tip per line: `{"id": 3, "text": "...", "embedding": [..]}`, where
//! `embedding` is optional.

use std::io::{BufRead, BufReader};
use std::{fs::File, path::Path};

use tracing::{debug, info};

use crate::errors::RetrievalError;
use crate::record::TipRecord;

/// Reads tip records strictly.
///
/// - Expects at least `id` and `text`.
/// - Ignores empty lines.
/// - Fails on the first malformed row.
///
/// # Errors
/// - [`RetrievalError::Io`] if the file cannot be read.
/// - [`RetrievalError::Parse`] if any line fails deserialization.
pub fn read_tip_records(jsonl_path: impl AsRef<Path>) -> Result<Vec<TipRecord>, RetrievalError> {
    info!("Reading tip JSONL: {:?}", jsonl_path.as_ref());

    let file = File::open(jsonl_path.as_ref())?;
    let reader = BufReader::new(file);

    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let r: TipRecord = serde_json::from_str(&line)
            .map_err(|e| RetrievalError::Parse(format!("line {} parse error: {}", i + 1, e)))?;
        out.push(r);
    }

    debug!("Loaded {} tip records", out.len());
    Ok(out)
}
