use crate::fusion::ScoredFragment;
use crate::report::{guarded, FailureReason, SearchStage, SubQueryFailure};
use docrag_text_chunker::{fragment_id, FragmentMetadata};
use docrag_vector_store::FragmentStore;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Ids of up to `neighbors` preceding and following fragments on the same page.
///
/// Followers are only produced when the page's chunk total is known.
pub fn neighbor_ids(metadata: &FragmentMetadata, neighbors: usize) -> Vec<String> {
    let mut ids = Vec::with_capacity(neighbors * 2);

    for i in 1..=neighbors {
        if let Some(chunk) = metadata.chunk.checked_sub(i) {
            ids.push(fragment_id(&metadata.source, metadata.page, chunk));
        }
    }

    if let Some(total) = metadata.total_chunks_in_page {
        for i in 1..=neighbors {
            let chunk = metadata.chunk + i;
            if chunk < total {
                ids.push(fragment_id(&metadata.source, metadata.page, chunk));
            }
        }
    }

    ids
}

/// Appends same-page neighbors of the best fragments as unscored context
pub struct ContextExpander {
    store: Arc<dyn FragmentStore>,
    expand_top: usize,
    neighbors: usize,
    timeout: Duration,
}

impl ContextExpander {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        expand_top: usize,
        neighbors: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            expand_top,
            neighbors,
            timeout,
        }
    }

    pub fn neighbor_ids(&self, metadata: &FragmentMetadata) -> Vec<String> {
        neighbor_ids(metadata, self.neighbors)
    }

    /// Fetch neighbors of the first `expand_top` fragments and append the ones
    /// not already selected. Returns the failed fetches.
    pub async fn expand(&self, selected: &mut Vec<ScoredFragment>) -> Vec<SubQueryFailure> {
        let mut failures = Vec::new();
        let mut seen: HashSet<String> = selected.iter().map(ScoredFragment::id).collect();
        let mut additions = Vec::new();

        for source in selected.iter().take(self.expand_top) {
            let ids = self.neighbor_ids(&source.fragment.metadata);
            if ids.is_empty() {
                continue;
            }

            match guarded(
                self.timeout,
                self.store.get_by_ids(&ids),
                FailureReason::Store,
            )
            .await
            {
                Ok(neighbors) => {
                    for neighbor in neighbors {
                        if seen.insert(neighbor.id()) {
                            additions.push(ScoredFragment::context(neighbor));
                        }
                    }
                }
                Err(reason) => failures.push(SubQueryFailure::new(
                    SearchStage::Expansion,
                    source.id(),
                    reason,
                )),
            }
        }

        log::debug!("Context expansion added {} fragments", additions.len());
        selected.extend(additions);
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn middle_chunk_gets_both_neighbors() {
        let meta = FragmentMetadata::new("spec.pdf", 0, 2).total_chunks_in_page(5);
        assert_eq!(
            neighbor_ids(&meta, 1),
            vec!["spec.pdf_pag0_chunk1", "spec.pdf_pag0_chunk3"]
        );
    }

    #[test]
    fn first_chunk_only_gets_successor() {
        let meta = FragmentMetadata::new("spec.pdf", 0, 0).total_chunks_in_page(5);
        assert_eq!(neighbor_ids(&meta, 1), vec!["spec.pdf_pag0_chunk1"]);
    }

    #[test]
    fn last_chunk_only_gets_predecessor() {
        let meta = FragmentMetadata::new("spec.pdf", 3, 4).total_chunks_in_page(5);
        assert_eq!(neighbor_ids(&meta, 1), vec!["spec.pdf_pag3_chunk3"]);
    }

    #[test]
    fn unknown_total_skips_followers() {
        let meta = FragmentMetadata::new("notes.txt", 1, 1);
        assert_eq!(neighbor_ids(&meta, 2), vec!["notes.txt_pag1_chunk0"]);
    }

    #[test]
    fn wider_window() {
        let meta = FragmentMetadata::new("a.txt", 0, 2).total_chunks_in_page(4);
        assert_eq!(
            neighbor_ids(&meta, 2),
            vec![
                "a.txt_pag0_chunk1",
                "a.txt_pag0_chunk0",
                "a.txt_pag0_chunk3"
            ]
        );
    }
}
