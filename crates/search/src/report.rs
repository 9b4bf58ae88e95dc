use crate::query::QueryVariant;
use docrag_vector_store::VectorStoreError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::future::Future;
use std::time::Duration;

/// Retrieval stage that issued an external call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStage {
    Semantic,
    Keyword,
    Exhaustive,
    Expansion,
}

/// Why an external call contributed nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FailureReason {
    Embedding(String),
    Store(String),
    Timeout,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Embedding(msg) => write!(f, "embedding failed: {msg}"),
            Self::Store(msg) => write!(f, "store query failed: {msg}"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

/// A sub-query whose failure was absorbed as an empty result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubQueryFailure {
    pub stage: SearchStage,
    pub query: String,
    pub reason: FailureReason,
}

impl SubQueryFailure {
    pub fn new(stage: SearchStage, query: impl Into<String>, reason: FailureReason) -> Self {
        let failure = Self {
            stage,
            query: query.into(),
            reason,
        };
        log::warn!(
            "{:?} sub-query '{}' skipped: {}",
            failure.stage,
            failure.query,
            failure.reason
        );
        failure
    }
}

/// Diagnostics for one retrieval cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalReport {
    pub variants: Vec<QueryVariant>,
    pub keywords: BTreeSet<String>,
    pub critical_terms: Vec<String>,
    pub semantic_hits: usize,
    pub keyword_hits: usize,
    pub scan_matches: usize,
    pub candidates: usize,
    pub expanded: usize,
    pub failures: Vec<SubQueryFailure>,
}

impl RetrievalReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Run one external call under `timeout`, turning errors into a [`FailureReason`].
///
/// `classify` maps the collaborator's error message to the reason recorded.
pub(crate) async fn guarded<T, F>(
    timeout: Duration,
    call: F,
    classify: fn(String) -> FailureReason,
) -> std::result::Result<T, FailureReason>
where
    F: Future<Output = docrag_vector_store::Result<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(VectorStoreError::EmbeddingError(msg))) => Err(FailureReason::Embedding(msg)),
        Ok(Err(e)) => Err(classify(e.to_string())),
        Err(_) => Err(FailureReason::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        let result: std::result::Result<(), _> = guarded(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            },
            FailureReason::Store,
        )
        .await;
        assert_eq!(result, Err(FailureReason::Timeout));
    }

    #[tokio::test]
    async fn errors_are_classified() {
        let result: std::result::Result<(), _> = guarded(
            Duration::from_secs(1),
            async { Err(VectorStoreError::IndexError("broken".into())) },
            FailureReason::Store,
        )
        .await;
        assert_eq!(
            result,
            Err(FailureReason::Store("Index error: broken".to_string()))
        );

        let result: std::result::Result<(), _> = guarded(
            Duration::from_secs(1),
            async { Err(VectorStoreError::EmbeddingError("model offline".into())) },
            FailureReason::Store,
        )
        .await;
        assert_eq!(
            result,
            Err(FailureReason::Embedding("model offline".to_string()))
        );
    }
}
