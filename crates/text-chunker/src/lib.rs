//! # Document Text Chunker
//!
//! Fixed-size, overlapping character windows over page text.
//!
//! ## Pipeline
//!
//! ```text
//! Page text
//!     │
//!     ├──> Page gate (skip pages not longer than min_length)
//!     │
//!     ├──> Sliding window (chunk_size chars, step chunk_size - overlap)
//!     │      └─> Keep windows whose trimmed length >= min_length
//!     │
//!     └──> Fragment[] with (source, page, chunk, total_chunks_in_page)
//! ```
//!
//! Every fragment carries a deterministic id derived from its metadata, so the
//! indexer and the retrieval side always agree on identity.
//!
//! ## Example
//!
//! ```rust
//! use docrag_text_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default()).unwrap();
//! let page = "Attention is all you need. ".repeat(40);
//!
//! let fragments = chunker.chunk_page("paper.pdf", 0, &page);
//! for fragment in &fragments {
//!     println!("{} -> {} chars", fragment.id(), fragment.text.chars().count());
//! }
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::{Chunker, PageChunk};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use types::{fragment_id, Fragment, FragmentMetadata};
