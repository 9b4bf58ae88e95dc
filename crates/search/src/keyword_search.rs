use crate::report::{guarded, FailureReason, SearchStage, SubQueryFailure};
use docrag_text_chunker::Fragment;
use docrag_vector_store::FragmentStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Case variants shorter than this are not sent to the store
const MIN_VARIANT_CHARS: usize = 3;

/// A fragment whose text contains one case variant of a keyword
#[derive(Debug, Clone)]
pub struct KeywordHit {
    pub fragment: Fragment,
    pub distance: f32,
    /// Keyword that produced the hit (not the case variant)
    pub keyword: String,
}

#[derive(Debug, Default)]
pub struct KeywordResults {
    /// Hits in emission order, repetitions included
    pub hits: Vec<KeywordHit>,
    pub failures: Vec<SubQueryFailure>,
}

/// Substring search over case variants of the leading keywords
pub struct KeywordSearcher {
    store: Arc<dyn FragmentStore>,
    n_keyword: usize,
    max_keywords: usize,
    timeout: Duration,
}

impl KeywordSearcher {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        n_keyword: usize,
        max_keywords: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            n_keyword,
            max_keywords,
            timeout,
        }
    }

    pub async fn search(&self, keywords: &BTreeSet<String>) -> KeywordResults {
        let mut results = KeywordResults::default();

        for keyword in keywords.iter().take(self.max_keywords) {
            for variant in case_variants(keyword) {
                if variant.chars().count() < MIN_VARIANT_CHARS {
                    continue;
                }

                match guarded(
                    self.timeout,
                    self.store.query_containing_substring(&variant, self.n_keyword),
                    FailureReason::Store,
                )
                .await
                {
                    Ok(hits) => results.hits.extend(hits.into_iter().map(|hit| KeywordHit {
                        fragment: hit.fragment,
                        distance: hit.distance,
                        keyword: keyword.clone(),
                    })),
                    Err(reason) => results.failures.push(SubQueryFailure::new(
                        SearchStage::Keyword,
                        variant,
                        reason,
                    )),
                }
            }
        }

        let matched: BTreeSet<&str> = results.hits.iter().map(|h| h.keyword.as_str()).collect();
        if matched.is_empty() {
            log::debug!("No direct keyword matches");
        } else {
            log::debug!("Keywords matched: {:?}", matched);
        }

        results
    }
}

/// As-is, lowercase, uppercase, capitalized and title-case spellings, deduplicated
pub fn case_variants(keyword: &str) -> Vec<String> {
    let mut variants: Vec<String> = Vec::with_capacity(5);
    for candidate in [
        keyword.to_string(),
        keyword.to_lowercase(),
        keyword.to_uppercase(),
        capitalize(keyword),
        title_case(keyword),
    ] {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Uppercase every letter that follows a non-letter
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_word_start = true;
    for c in word.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
