//! # Document Indexer
//!
//! Builds the fragment store from a folder of page dumps.
//!
//! ## Pipeline
//!
//! ```text
//! Docs folder
//!     │
//!     ├──> Document Scanner (accepted extensions, top level by default)
//!     │      └─> Text dumps
//!     │
//!     ├──> Page split (form feed) + Chunker
//!     │      └─> Fragments with (source, page, chunk, total_chunks_in_page)
//!     │
//!     └──> Memory Store (batch embed)
//!            └─> Searchable fragments
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docrag_indexer::{DocumentIndexer, IndexStatus};
//! use docrag_text_chunker::ChunkerConfig;
//! use docrag_vector_store::{HashingEmbedder, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut store = MemoryStore::new(Arc::new(HashingEmbedder::default()));
//!     let indexer = DocumentIndexer::new(ChunkerConfig::default(), vec!["txt".into()])?;
//!
//!     if let IndexStatus::Built(stats) = indexer.ensure_indexed("docs", &mut store).await? {
//!         println!("Indexed {} documents, {} fragments", stats.documents, stats.fragments);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
mod indexer;
mod pages;
mod scanner;
mod stats;

pub use error::{IndexerError, Result};
pub use indexer::{ChunkedDocument, DocumentIndexer, IndexStatus};
pub use pages::{decode_document, split_pages, PAGE_BREAK};
pub use scanner::{DocumentFile, DocumentScanner, MAX_DOCUMENT_SIZE_BYTES};
pub use stats::IndexStats;
