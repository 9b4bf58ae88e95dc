use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for page chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Window size in characters
    pub chunk_size: usize,

    /// Characters shared by two consecutive windows
    pub overlap: usize,

    /// Minimum trimmed length (in characters) for a window to be kept.
    /// Pages whose raw text is not longer than this are skipped entirely.
    pub min_length: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            overlap: 200,
            min_length: 100,
        }
    }
}

impl ChunkerConfig {
    /// Distance between the starts of two consecutive windows
    #[must_use]
    pub const fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.overlap)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkerError::invalid_config("chunk_size must be > 0"));
        }

        // A non-positive step would never advance the window.
        if self.overlap >= self.chunk_size {
            return Err(ChunkerError::invalid_config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }

        if self.min_length > self.chunk_size {
            return Err(ChunkerError::invalid_config(format!(
                "min_length ({}) cannot exceed chunk_size ({})",
                self.min_length, self.chunk_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.step(), 600);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ChunkerConfig::default();

        // Invalid: overlap == chunk_size
        config.overlap = 800;
        assert!(config.validate().is_err());

        // Invalid: overlap > chunk_size
        config.overlap = 900;
        assert!(config.validate().is_err());

        // Invalid: min_length > chunk_size
        config.overlap = 200;
        config.min_length = 1000;
        assert!(config.validate().is_err());

        // Invalid: chunk_size = 0
        config.min_length = 0;
        config.overlap = 0;
        config.chunk_size = 0;
        assert!(config.validate().is_err());

        // Valid configuration
        config.chunk_size = 400;
        config.overlap = 100;
        config.min_length = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_style_deserialization_uses_defaults() {
        let config: ChunkerConfig = serde_json::from_str(r#"{"chunk_size": 500}"#).unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.overlap, 200);
        assert_eq!(config.min_length, 100);
    }
}
