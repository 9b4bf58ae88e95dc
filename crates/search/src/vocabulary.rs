use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

/// Spanish and English function words ignored by keyword extraction
const STOPWORDS: &[&str] = &[
    // es
    "el", "la", "de", "en", "y", "a", "los", "las", "un", "una", "por", "para", "con", "del",
    "que", "es", "son", "se", "al", "como", "más", "su", "me", "está", "hay", "tiene", "puede",
    "ser", "sobre", "entre", "también", "podrías", "decirme", "cuáles", "cómo", "qué", "indica",
    "indicar", "puedes", "tres", "dos", "estas", "estos", "principales", "llaman", "partes",
    // en
    "the", "in", "and", "of", "to", "is", "for", "on", "with", "as", "are", "this", "that", "it",
    "be", "or", "an", "by", "from", "at", "which",
];

/// Domain term -> related terms added to the keyword set
const EXPANSIONS: &[(&str, &[&str])] = &[
    (
        "transformer",
        &["encoder", "decoder", "attention", "self-attention", "multi-head"],
    ),
    (
        "atención",
        &["attention", "query", "key", "value", "qkv", "self-attention"],
    ),
    (
        "attention",
        &["query", "key", "value", "qkv", "softmax", "scaled"],
    ),
    ("self-attention", &["query", "key", "value", "auto-atención"]),
    ("auto-atención", &["query", "key", "value", "self-attention"]),
    (
        "arquitectura",
        &["encoder", "decoder", "capas", "layers", "bloques"],
    ),
    (
        "vectores",
        &["query", "key", "value", "embedding", "proyección"],
    ),
    (
        "proyecta",
        &["query", "key", "value", "matrices", "proyección"],
    ),
    ("encoder", &["codificador", "encoding", "entrada"]),
    ("decoder", &["decodificador", "decoding", "salida"]),
    ("llm", &["modelo", "language", "model", "gpt", "transformer"]),
    ("embedding", &["vector", "representación", "vectorial"]),
];

/// Keywords that form the technical-term semantic variant
const TECHNICAL_TERMS: &[&str] = &[
    "transformer",
    "encoder",
    "decoder",
    "attention",
    "query",
    "key",
    "value",
    "self-attention",
    "auto-atención",
    "embedding",
    "softmax",
];

/// Keywords that trigger the exhaustive corpus scan
const CRITICAL_TERMS: &[&str] = &[
    "query",
    "key",
    "value",
    "encoder",
    "decoder",
    "attention",
    "self-attention",
    "transformer",
    "codificador",
    "decodificador",
    "auto-atención",
    "qkv",
    "softmax",
    "multi-head",
];

static BUILTIN: Lazy<Arc<Vocabulary>> = Lazy::new(|| {
    Arc::new(Vocabulary {
        stopwords: STOPWORDS.iter().map(|w| (*w).to_string()).collect(),
        expansions: EXPANSIONS
            .iter()
            .map(|(term, related)| {
                (
                    (*term).to_string(),
                    related.iter().map(|r| (*r).to_string()).collect(),
                )
            })
            .collect(),
        technical_terms: TECHNICAL_TERMS.iter().map(|t| (*t).to_string()).collect(),
        critical_terms: CRITICAL_TERMS.iter().map(|t| (*t).to_string()).collect(),
    })
});

/// Static lookup data used by keyword extraction and query planning.
///
/// Built once per process; the built-in tables target transformer
/// architecture documents and can be replaced table by table.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    stopwords: HashSet<String>,
    expansions: BTreeMap<String, Vec<String>>,
    technical_terms: BTreeSet<String>,
    critical_terms: BTreeSet<String>,
}

/// Replacement tables read from configuration. Absent fields keep the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyOverrides {
    pub stopwords: Option<Vec<String>>,
    pub expansions: Option<BTreeMap<String, Vec<String>>>,
    pub technical_terms: Option<Vec<String>>,
    pub critical_terms: Option<Vec<String>>,
}

impl Vocabulary {
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Built-in tables with the given replacements. All entries are lowercased.
    pub fn with_overrides(overrides: &VocabularyOverrides) -> Arc<Self> {
        let mut vocabulary = (**BUILTIN).clone();

        if let Some(stopwords) = &overrides.stopwords {
            vocabulary.stopwords = stopwords.iter().map(|w| w.to_lowercase()).collect();
        }
        if let Some(expansions) = &overrides.expansions {
            vocabulary.expansions = expansions
                .iter()
                .map(|(term, related)| {
                    (
                        term.to_lowercase(),
                        related.iter().map(|r| r.to_lowercase()).collect(),
                    )
                })
                .collect();
        }
        if let Some(terms) = &overrides.technical_terms {
            vocabulary.technical_terms = terms.iter().map(|t| t.to_lowercase()).collect();
        }
        if let Some(terms) = &overrides.critical_terms {
            vocabulary.critical_terms = terms.iter().map(|t| t.to_lowercase()).collect();
        }

        Arc::new(vocabulary)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn expansions_for(&self, keyword: &str) -> &[String] {
        self.expansions
            .get(keyword)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_technical(&self, keyword: &str) -> bool {
        self.technical_terms.contains(keyword)
    }

    pub fn is_critical(&self, keyword: &str) -> bool {
        self.critical_terms.contains(keyword)
    }
}
