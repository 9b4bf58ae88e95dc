use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retrieval tuning knobs, passed explicitly to every component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Nearest neighbors fetched per semantic query variant
    pub n_semantic: usize,

    /// Fragments fetched per keyword case variant
    pub n_keyword: usize,

    /// Fragments kept after fusion (before context expansion)
    pub top_k_final: usize,

    pub semantic_weight: f32,
    pub keyword_weight: f32,

    /// Minimum top fused score required to answer
    pub relevance_threshold: f32,

    /// Fetch neighbor fragments around the best hits
    pub expand_context: bool,

    /// Run keyword search next to semantic search
    pub hybrid: bool,

    /// Rank offset in reciprocal-rank fusion
    pub rrf_k: usize,

    /// Keywords considered by the keyword searcher
    pub max_keywords: usize,

    /// Keyword score added per critical term found by the exhaustive scan
    pub exhaustive_weight: f32,

    /// Maximum fragments returned by the exhaustive scan
    pub exhaustive_cap: usize,

    /// Page size used when scanning the whole corpus
    pub scan_batch_size: usize,

    /// How many of the selected fragments get their neighbors fetched
    pub expand_top: usize,

    /// Neighbors fetched on each side
    pub neighbors: usize,

    /// Timeout for each embedding/store call, in milliseconds
    pub call_timeout_ms: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            n_semantic: 25,
            n_keyword: 20,
            top_k_final: 12,
            semantic_weight: 0.6,
            keyword_weight: 0.4,
            relevance_threshold: 0.02,
            expand_context: true,
            hybrid: true,
            rrf_k: 60,
            max_keywords: 12,
            exhaustive_weight: 0.5,
            exhaustive_cap: 20,
            scan_batch_size: 100,
            expand_top: 6,
            neighbors: 1,
            call_timeout_ms: 30_000,
        }
    }
}

impl RetrievalConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Reject configurations that cannot produce a meaningful ranking
    pub fn validate(&self) -> Result<()> {
        if self.n_semantic == 0 {
            return Err(SearchError::invalid_config("n_semantic must be greater than 0"));
        }
        if self.top_k_final == 0 {
            return Err(SearchError::invalid_config("top_k_final must be greater than 0"));
        }
        if self.scan_batch_size == 0 {
            return Err(SearchError::invalid_config(
                "scan_batch_size must be greater than 0",
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(SearchError::invalid_config(
                "call_timeout_ms must be greater than 0",
            ));
        }

        for (name, weight) in [
            ("semantic_weight", self.semantic_weight),
            ("keyword_weight", self.keyword_weight),
            ("exhaustive_weight", self.exhaustive_weight),
        ] {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(SearchError::invalid_config(format!(
                    "{name} must be a positive finite number (got {weight})"
                )));
            }
        }

        if !self.relevance_threshold.is_finite() || self.relevance_threshold < 0.0 {
            return Err(SearchError::invalid_config(format!(
                "relevance_threshold must be finite and non-negative (got {})",
                self.relevance_threshold
            )));
        }

        Ok(())
    }
}
