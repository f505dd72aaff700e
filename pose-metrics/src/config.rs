//! Analyzer configuration.

use serde::{Deserialize, Serialize};

use crate::errors::PoseError;

/// Which side of the body the angles are measured on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    #[default]
    Left,
    Right,
}

impl BodySide {
    /// Parse from env string (case-insensitive). Defaults to Left.
    pub fn from_env(s: Option<String>) -> Self {
        match s.unwrap_or_default().trim().to_lowercase().as_str() {
            "right" | "r" => BodySide::Right,
            _ => BodySide::Left,
        }
    }
}

/// Sampling and measurement knobs for [`crate::PoseAnalyzer`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Analyze every Nth frame (frames are numbered from 1).
    pub sample_stride: usize,
    /// Body side used for the hip/knee/ankle/shoulder landmarks.
    pub side: BodySide,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            sample_stride: 30,
            side: BodySide::Left,
        }
    }
}

impl PoseConfig {
    /// Reads `POSE_SAMPLE_STRIDE` and `POSE_BODY_SIDE`, falling back to defaults.
    ///
    /// # Errors
    /// Returns [`PoseError::InvalidConfig`] if the stride is not a positive integer.
    pub fn from_env() -> Result<Self, PoseError> {
        let mut cfg = Self::default();
        if let Some(raw) = std::env::var("POSE_SAMPLE_STRIDE")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            cfg.sample_stride = raw.trim().parse().map_err(|_| {
                PoseError::InvalidConfig(format!("POSE_SAMPLE_STRIDE = '{raw}' is not a number"))
            })?;
        }
        cfg.side = BodySide::from_env(std::env::var("POSE_BODY_SIDE").ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), PoseError> {
        if self.sample_stride == 0 {
            return Err(PoseError::InvalidConfig("sample_stride must be > 0".into()));
        }
        Ok(())
    }
}
