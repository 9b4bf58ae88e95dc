use crate::query::QueryPlan;
use crate::report::{guarded, FailureReason, SearchStage, SubQueryFailure};
use docrag_vector_store::{Embedder, FragmentStore, StoreHit};
use std::sync::Arc;
use std::time::Duration;

/// Ranked nearest neighbors for one query variant
#[derive(Debug, Clone)]
pub struct VariantHits {
    /// Index of the variant inside the query plan
    pub variant: usize,
    /// Hits ordered by ascending distance
    pub hits: Vec<StoreHit>,
}

#[derive(Debug, Default)]
pub struct SemanticResults {
    pub lists: Vec<VariantHits>,
    pub failures: Vec<SubQueryFailure>,
}

impl SemanticResults {
    pub fn hit_count(&self) -> usize {
        self.lists.iter().map(|l| l.hits.len()).sum()
    }
}

/// Embeds every query variant and asks the store for its nearest fragments
pub struct SemanticSearcher {
    store: Arc<dyn FragmentStore>,
    embedder: Arc<dyn Embedder>,
    n_semantic: usize,
    timeout: Duration,
}

impl SemanticSearcher {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        embedder: Arc<dyn Embedder>,
        n_semantic: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            embedder,
            n_semantic,
            timeout,
        }
    }

    pub async fn search(&self, plan: &QueryPlan) -> SemanticResults {
        let mut results = SemanticResults::default();

        for (variant, query) in plan.variants.iter().enumerate() {
            let vector = match guarded(
                self.timeout,
                self.embedder.embed(&query.text),
                FailureReason::Embedding,
            )
            .await
            {
                Ok(vector) => vector,
                Err(reason) => {
                    results.failures.push(SubQueryFailure::new(
                        SearchStage::Semantic,
                        &query.text,
                        reason,
                    ));
                    continue;
                }
            };

            match guarded(
                self.timeout,
                self.store.query_by_vector(&vector, self.n_semantic),
                FailureReason::Store,
            )
            .await
            {
                Ok(hits) => {
                    log::debug!("Variant {} ({:?}): {} hits", variant, query.kind, hits.len());
                    results.lists.push(VariantHits { variant, hits });
                }
                Err(reason) => results.failures.push(SubQueryFailure::new(
                    SearchStage::Semantic,
                    &query.text,
                    reason,
                )),
            }
        }

        results
    }
}
