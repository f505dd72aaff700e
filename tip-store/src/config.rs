//! Runtime retrieval configuration.

use std::path::PathBuf;

use crate::errors::RetrievalError;

/// Knobs for [`crate::RetrievalService`].
#[derive(Clone, Debug, PartialEq)]
pub struct RetrievalConfig {
    /// Number of tips returned by both ranking modes.
    pub top_k: usize,
    /// Minimum cosine similarity for a tip to count as relevant to a chat turn.
    pub similarity_threshold: f32,
    /// Optional JSONL corpus replacing the built-in tips.
    pub tips_path: Option<PathBuf>,
    /// Expected embedding size; `None` accepts whatever the model returns.
    pub embedding_dim: Option<usize>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            similarity_threshold: 0.75,
            tips_path: None,
            embedding_dim: None,
        }
    }
}

impl RetrievalConfig {
    /// Reads `TIPS_TOP_K`, `TIPS_SIMILARITY_THRESHOLD`, `TIPS_PATH` and
    /// `TIPS_EMBEDDING_DIM`.
    ///
    /// # Errors
    /// Returns `RetrievalError::Config` for unparsable or invalid values.
    pub fn from_env() -> Result<Self, RetrievalError> {
        let mut cfg = Self::default();
        if let Some(v) = env_opt("TIPS_TOP_K") {
            cfg.top_k = v
                .parse()
                .map_err(|_| RetrievalError::Config(format!("TIPS_TOP_K = '{v}'")))?;
        }
        if let Some(v) = env_opt("TIPS_SIMILARITY_THRESHOLD") {
            cfg.similarity_threshold = v.parse().map_err(|_| {
                RetrievalError::Config(format!("TIPS_SIMILARITY_THRESHOLD = '{v}'"))
            })?;
        }
        cfg.tips_path = env_opt("TIPS_PATH").map(PathBuf::from);
        if let Some(v) = env_opt("TIPS_EMBEDDING_DIM") {
            cfg.embedding_dim = Some(v.parse().map_err(|_| {
                RetrievalError::Config(format!("TIPS_EMBEDDING_DIM = '{v}'"))
            })?);
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.top_k == 0 {
            return Err(RetrievalError::Config("top_k must be > 0".into()));
        }
        if !(-1.0..=1.0).contains(&self.similarity_threshold) {
            return Err(RetrievalError::Config(
                "similarity_threshold must be within [-1, 1]".into(),
            ));
        }
        if self.embedding_dim == Some(0) {
            return Err(RetrievalError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(RetrievalConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_k = RetrievalConfig {
            top_k: 0,
            ..RetrievalConfig::default()
        };
        assert!(zero_k.validate().is_err());

        let wide = RetrievalConfig {
            similarity_threshold: 1.5,
            ..RetrievalConfig::default()
        };
        assert!(wide.validate().is_err());

        let no_dim = RetrievalConfig {
            embedding_dim: Some(0),
            ..RetrievalConfig::default()
        };
        assert!(no_dim.validate().is_err());
    }
}
