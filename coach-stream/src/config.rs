//! Runtime configuration loaded from environment variables.

use crate::errors::StreamError;

/// Buffering knobs for [`crate::bridge`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Fragments buffered between producer and consumer before the producer waits.
    pub buffer_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
        }
    }
}

impl StreamConfig {
    /// Reads `STREAM_BUFFER_CAPACITY`, defaulting to 1000.
    pub fn from_env() -> Result<Self, StreamError> {
        let buffer_capacity = match std::env::var("STREAM_BUFFER_CAPACITY") {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<usize>()
                .map_err(|_| StreamError::InvalidCapacity)?,
            _ => Self::default().buffer_capacity,
        };
        let cfg = Self { buffer_capacity };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.buffer_capacity == 0 {
            return Err(StreamError::InvalidCapacity);
        }
        Ok(())
    }
}
