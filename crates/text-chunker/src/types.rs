use serde::{Deserialize, Serialize};

/// Build the fragment key for a (document, page, chunk) triple.
///
/// This is the only place the id format lives. Indexing, keyword hits,
/// scan hits and neighbor lookups all go through it.
#[must_use]
pub fn fragment_id(source: &str, page: usize, chunk: usize) -> String {
    format!("{source}_pag{page}_chunk{chunk}")
}

/// A retrievable piece of document text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fragment {
    /// Trimmed window content
    pub text: String,

    /// Position of the fragment inside its document
    pub metadata: FragmentMetadata,
}

impl Fragment {
    /// Create a new fragment
    #[must_use]
    pub const fn new(text: String, metadata: FragmentMetadata) -> Self {
        Self { text, metadata }
    }

    /// Deterministic key derived from the metadata
    #[must_use]
    pub fn id(&self) -> String {
        self.metadata.fragment_id()
    }

    /// Human-readable citation with 1-based page and fragment numbers
    #[must_use]
    pub fn citation(&self) -> String {
        format!(
            "{} | Page {} | Fragment {}",
            self.metadata.source,
            self.metadata.page + 1,
            self.metadata.chunk + 1
        )
    }
}

/// Metadata stored next to every fragment
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FragmentMetadata {
    /// Document name (file name)
    pub source: String,

    /// Page index (0-based)
    pub page: usize,

    /// Sequence number within the page (0-based)
    pub chunk: usize,

    /// Number of kept fragments on the page, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chunks_in_page: Option<usize>,
}

impl FragmentMetadata {
    pub fn new(source: impl Into<String>, page: usize, chunk: usize) -> Self {
        Self {
            source: source.into(),
            page,
            chunk,
            total_chunks_in_page: None,
        }
    }

    /// Builder: set the page chunk total
    #[must_use]
    pub const fn total_chunks_in_page(mut self, total: usize) -> Self {
        self.total_chunks_in_page = Some(total);
        self
    }

    #[must_use]
    pub fn fragment_id(&self) -> String {
        fragment_id(&self.source, self.page, self.chunk)
    }
}
