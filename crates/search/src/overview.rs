use crate::error::Result;
use crate::vocabulary::Vocabulary;
use docrag_text_chunker::Fragment;
use docrag_vector_store::FragmentStore;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Fragments per document considered by the topic overview
const TOPIC_FRAGMENTS: usize = 100;
/// Leading fragments whose words are counted
const TOPIC_TEXT_FRAGMENTS: usize = 20;
const TOP_TERMS: usize = 10;
const MIN_TERM_CHARS: usize = 6;
const SAMPLE_CHARS: usize = 300;

const TERM_TRIM_CHARS: &[char] = &[
    '.', ',', ';', ':', '(', ')', '[', ']', '{', '}', '"', '\'', '-',
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub fragments: usize,
    pub documents: Vec<String>,
}

/// Topic summary of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTopics {
    pub document: String,
    /// Distinct pages among the sampled fragments
    pub pages: usize,
    /// Sampled fragment count (at most 100)
    pub fragments: usize,
    /// Most frequent significant words, most frequent first
    pub top_terms: Vec<String>,
    /// Opening characters of the first fragment
    pub sample: String,
}

async fn scan_all(store: &dyn FragmentStore, batch_size: usize) -> Result<Vec<Fragment>> {
    let batch_size = batch_size.max(1);
    let mut fragments = Vec::new();
    let mut offset = 0;
    loop {
        let batch = store.scan(offset, batch_size).await?;
        let len = batch.len();
        fragments.extend(batch);
        if len < batch_size {
            break;
        }
        offset += len;
    }
    Ok(fragments)
}

/// Sorted distinct document names
pub async fn list_documents(store: &dyn FragmentStore, batch_size: usize) -> Result<Vec<String>> {
    let documents: BTreeSet<String> = scan_all(store, batch_size)
        .await?
        .into_iter()
        .map(|f| f.metadata.source)
        .collect();
    Ok(documents.into_iter().collect())
}

pub async fn corpus_stats(store: &dyn FragmentStore, batch_size: usize) -> Result<CorpusStats> {
    Ok(CorpusStats {
        fragments: store.count().await?,
        documents: list_documents(store, batch_size).await?,
    })
}

/// Per-document pages, fragment count, frequent terms and a text sample
pub async fn corpus_overview(
    store: &dyn FragmentStore,
    vocabulary: &Vocabulary,
    batch_size: usize,
) -> Result<Vec<DocumentTopics>> {
    let mut by_document: BTreeMap<String, Vec<Fragment>> = BTreeMap::new();
    for fragment in scan_all(store, batch_size).await? {
        let entry = by_document.entry(fragment.metadata.source.clone()).or_default();
        if entry.len() < TOPIC_FRAGMENTS {
            entry.push(fragment);
        }
    }

    Ok(by_document
        .into_iter()
        .map(|(document, fragments)| {
            let pages: BTreeSet<usize> = fragments.iter().map(|f| f.metadata.page).collect();
            DocumentTopics {
                pages: pages.len(),
                fragments: fragments.len(),
                top_terms: frequent_terms(
                    fragments.iter().take(TOPIC_TEXT_FRAGMENTS).map(|f| f.text.as_str()),
                    vocabulary,
                ),
                sample: fragments
                    .first()
                    .map(|f| f.text.chars().take(SAMPLE_CHARS).collect())
                    .unwrap_or_default(),
                document,
            }
        })
        .collect())
}

/// Top words longer than five characters that are not stopwords.
/// Equal counts keep first-seen order.
pub fn frequent_terms<'a>(
    texts: impl Iterator<Item = &'a str>,
    vocabulary: &Vocabulary,
) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    for word in texts.flat_map(str::split_whitespace) {
        if word.chars().count() < MIN_TERM_CHARS {
            continue;
        }
        let term = word.trim_matches(TERM_TRIM_CHARS).to_lowercase();
        if term.is_empty() || vocabulary.is_stopword(&term) {
            continue;
        }
        let first_seen = counts.len();
        counts.entry(term).or_insert((0, first_seen)).0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked
        .into_iter()
        .take(TOP_TERMS)
        .map(|(term, _)| term)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn frequent_terms_counts_long_words() {
        let vocabulary = Vocabulary::builtin();
        let texts = [
            "Attention layers, attention heads.",
            "The encoder stacks attention (layers)",
        ];
        assert_eq!(
            frequent_terms(texts.into_iter(), &vocabulary),
            vec!["attention", "layers", "heads", "encoder", "stacks"]
        );
    }

    #[test]
    fn frequent_terms_skips_stopwords() {
        let vocabulary = Vocabulary::builtin();
        let texts = ["también principales partes decoder"];
        assert_eq!(
            frequent_terms(texts.into_iter(), &vocabulary),
            vec!["decoder"]
        );
    }
}
