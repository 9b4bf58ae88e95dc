use crate::exhaustive::ExhaustiveScanner;
use crate::keywords::KeywordExtractor;
use serde::Serialize;
use std::collections::BTreeSet;

/// Words kept in the shortened and technical variants
const VARIANT_WORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    /// The question as asked
    Original,
    /// Only the longer words of the question
    Shortened,
    /// Recognized technical keywords
    Technical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryVariant {
    pub kind: VariantKind,
    pub text: String,
}

/// Everything derived from one question before any store is touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPlan {
    pub question: String,
    pub variants: Vec<QueryVariant>,
    pub keywords: BTreeSet<String>,
    /// Keywords that trigger the exhaustive scan
    pub critical_terms: Vec<String>,
}

impl QueryPlan {
    pub fn build(question: &str, extractor: &KeywordExtractor) -> Self {
        let question = question.trim().to_string();
        let keywords = extractor.extract(&question);
        let vocabulary = extractor.vocabulary();

        let mut variants = vec![QueryVariant {
            kind: VariantKind::Original,
            text: question.clone(),
        }];

        let long_words: Vec<&str> = question
            .split_whitespace()
            .filter(|w| w.chars().count() > 4)
            .collect();
        if long_words.len() > 3 {
            variants.push(QueryVariant {
                kind: VariantKind::Shortened,
                text: long_words
                    .iter()
                    .take(VARIANT_WORDS)
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" "),
            });
        }

        let technical: Vec<&str> = keywords
            .iter()
            .filter(|k| vocabulary.is_technical(k))
            .take(VARIANT_WORDS)
            .map(String::as_str)
            .collect();
        if !technical.is_empty() {
            variants.push(QueryVariant {
                kind: VariantKind::Technical,
                text: technical.join(" "),
            });
        }

        let critical_terms = ExhaustiveScanner::critical_terms(&keywords, vocabulary);

        Self {
            question,
            variants,
            keywords,
            critical_terms,
        }
    }
}
