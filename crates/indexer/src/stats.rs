use serde::{Deserialize, Serialize};

/// Statistics about an indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents read successfully
    pub documents: usize,

    /// Pages that produced at least one fragment
    pub pages: usize,

    /// Pages too short to chunk, or with no kept window
    pub skipped_pages: usize,

    /// Fragments added to the store
    pub fragments: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Per-document errors, the run continues past them
    pub errors: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&mut self) {
        self.documents += 1;
    }

    pub fn add_page(&mut self, fragments: usize) {
        if fragments == 0 {
            self.skipped_pages += 1;
        } else {
            self.pages += 1;
            self.fragments += fragments;
        }
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pages_count_as_skipped() {
        let mut stats = IndexStats::new();
        stats.add_page(0);
        stats.add_page(3);
        stats.add_page(2);

        assert_eq!(stats.pages, 2);
        assert_eq!(stats.skipped_pages, 1);
        assert_eq!(stats.fragments, 5);
        assert!(!stats.has_errors());
    }
}
