use crate::vocabulary::Vocabulary;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Punctuation trimmed from both ends of a question token
const TRIM_CHARS: &[char] = &[
    '¿', '?', '.', ',', ';', ':', '(', ')', '[', ']', '{', '}', '"', '\'', '-',
];

/// Derives a deterministic, synonym-expanded keyword set from free text
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    vocabulary: Arc<Vocabulary>,
}

impl KeywordExtractor {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    /// Extract lowercase keywords.
    ///
    /// A whitespace token is kept when it is longer than 3 characters and its
    /// trimmed lowercase form is not a stopword. Tokens with an uppercase letter,
    /// a digit or a hyphen are kept regardless. Every keyword found in the
    /// expansion table then pulls in its related terms.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut keywords = BTreeSet::new();

        for token in text.split_whitespace() {
            let stripped = strip_token(token).to_lowercase();
            if stripped.is_empty() {
                continue;
            }

            let long_enough = token.chars().count() > 3;
            if (long_enough && !self.vocabulary.is_stopword(&stripped)) || is_technical_token(token)
            {
                keywords.insert(stripped);
            }
        }

        let expanded: Vec<String> = keywords
            .iter()
            .flat_map(|keyword| self.vocabulary.expansions_for(keyword).iter().cloned())
            .collect();
        keywords.extend(expanded);

        log::debug!("Extracted {} keywords from '{}'", keywords.len(), text);
        keywords
    }
}

pub(crate) fn strip_token(token: &str) -> &str {
    token.trim_matches(TRIM_CHARS)
}

fn is_technical_token(token: &str) -> bool {
    token
        .chars()
        .any(|c| c.is_uppercase() || c.is_ascii_digit() || c == '-')
}
