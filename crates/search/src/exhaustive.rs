use crate::error::{Result, SearchError};
use crate::report::{guarded, FailureReason, SearchStage, SubQueryFailure};
use crate::vocabulary::Vocabulary;
use docrag_text_chunker::Fragment;
use docrag_vector_store::FragmentStore;
use regex::RegexSet;
use std::sync::Arc;
use std::time::Duration;

/// A fragment containing at least one critical term as a whole word
#[derive(Debug, Clone)]
pub struct ScanMatch {
    pub fragment: Fragment,
    /// Matched terms, in the order they were requested
    pub terms: Vec<String>,
}

impl ScanMatch {
    pub fn match_count(&self) -> usize {
        self.terms.len()
    }
}

#[derive(Debug, Default)]
pub struct ScanResults {
    /// Sorted by match count, descending
    pub matches: Vec<ScanMatch>,
    pub failures: Vec<SubQueryFailure>,
}

/// Whole-corpus fallback scan for critical terms
pub struct ExhaustiveScanner {
    store: Arc<dyn FragmentStore>,
    batch_size: usize,
    cap: usize,
    timeout: Duration,
}

impl ExhaustiveScanner {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        batch_size: usize,
        cap: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
            cap,
            timeout,
        }
    }

    /// Keywords that warrant a full scan, in keyword order
    pub fn critical_terms<'a>(
        keywords: impl IntoIterator<Item = &'a String>,
        vocabulary: &Vocabulary,
    ) -> Vec<String> {
        keywords
            .into_iter()
            .filter(|k| vocabulary.is_critical(k))
            .cloned()
            .collect()
    }

    /// Scan every stored fragment for the given terms
    pub async fn scan(&self, terms: &[String]) -> Result<ScanResults> {
        let mut results = ScanResults::default();
        if terms.is_empty() {
            return Ok(results);
        }

        let matcher = TermMatcher::new(terms)?;

        let total = match guarded(self.timeout, self.store.count(), FailureReason::Store).await {
            Ok(total) => total,
            Err(reason) => {
                results
                    .failures
                    .push(SubQueryFailure::new(SearchStage::Exhaustive, "count", reason));
                return Ok(results);
            }
        };

        for offset in (0..total).step_by(self.batch_size) {
            let batch = match guarded(
                self.timeout,
                self.store.scan(offset, self.batch_size),
                FailureReason::Store,
            )
            .await
            {
                Ok(batch) => batch,
                Err(reason) => {
                    results.failures.push(SubQueryFailure::new(
                        SearchStage::Exhaustive,
                        format!("scan offset {offset}"),
                        reason,
                    ));
                    continue;
                }
            };

            for fragment in batch {
                let found = matcher.matches(&fragment.text);
                if !found.is_empty() {
                    results.matches.push(ScanMatch {
                        fragment,
                        terms: found,
                    });
                }
            }
        }

        // Stable: equal counts keep corpus order
        results
            .matches
            .sort_by(|a, b| b.match_count().cmp(&a.match_count()));
        results.matches.truncate(self.cap);

        log::debug!(
            "Exhaustive scan for {:?}: {} fragments",
            terms,
            results.matches.len()
        );
        Ok(results)
    }
}

/// Case-insensitive whole-word matcher for a fixed term list
pub struct TermMatcher {
    terms: Vec<String>,
    set: RegexSet,
}

impl TermMatcher {
    pub fn new(terms: &[String]) -> Result<Self> {
        let terms: Vec<String> = terms.iter().map(|t| t.to_lowercase()).collect();
        let patterns = terms
            .iter()
            .map(|t| format!(r"\b{}\b", regex::escape(t)));
        let set = RegexSet::new(patterns)
            .map_err(|e| SearchError::Other(format!("invalid scan term: {e}")))?;
        Ok(Self { terms, set })
    }

    /// Terms found in `text`, in term-list order
    pub fn matches(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.set
            .matches(&lowered)
            .iter()
            .map(|idx| self.terms[idx].clone())
            .collect()
    }
}
