use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::types::{Fragment, FragmentMetadata};

/// A kept window: trimmed text plus the character range it was cut from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChunk {
    pub text: String,

    /// First character of the window (inclusive)
    pub start: usize,

    /// Character after the last one in the window (exclusive)
    pub end: usize,
}

/// Main chunker interface for page text
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting configurations that cannot make progress
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Number of windows the sliding loop visits for a text of `char_len` characters
    #[must_use]
    pub const fn candidate_windows(&self, char_len: usize) -> usize {
        if char_len == 0 {
            return 0;
        }
        if char_len <= self.config.chunk_size {
            return 1;
        }
        let rest = char_len - self.config.chunk_size;
        1 + rest.div_ceil(self.config.step())
    }

    /// Split text into overlapping windows, keeping those with enough content
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<PageChunk> {
        // Byte offset of every char boundary, so windows are cut on characters.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(idx, _)| idx)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = bounds.len() - 1;
        let step = self.config.step();

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < char_len {
            let end = (start + self.config.chunk_size).min(char_len);
            let trimmed = text[bounds[start]..bounds[end]].trim();

            if trimmed.chars().count() >= self.config.min_length {
                chunks.push(PageChunk {
                    text: trimmed.to_string(),
                    start,
                    end,
                });
            }

            if end >= char_len {
                break;
            }
            start += step;
        }

        chunks
    }

    /// Chunk one page of a document into fragments.
    ///
    /// Pages whose raw text is not longer than `min_length` produce nothing.
    #[must_use]
    pub fn chunk_page(&self, source: &str, page: usize, text: &str) -> Vec<Fragment> {
        if text.chars().count() <= self.config.min_length {
            log::debug!("Skipping short page {page} of {source}");
            return Vec::new();
        }

        let chunks = self.split(text);
        let total = chunks.len();

        chunks
            .into_iter()
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                Fragment::new(
                    chunk.text,
                    FragmentMetadata::new(source, page, chunk_idx).total_chunks_in_page(total),
                )
            })
            .collect()
    }
}
