//! # Document Vector Store
//!
//! Storage contracts and an in-memory implementation for document fragments.
//!
//! ## Features
//!
//! - **Nearest-neighbor query** by cosine distance
//! - **Substring filtering** ranked by distance to the filter text
//! - **Id lookup** and **paged scans** over the whole corpus
//! - **Persistent storage** with JSON serialization
//!
//! ## Architecture
//!
//! ```text
//! Fragment[]
//!     │
//!     ├──> Embedder (Ollama / hashing)
//!     │      └─> Vector[dim]
//!     │
//!     ├──> Flat cosine index
//!     │      └─> Exhaustive k-NN
//!     │
//!     └──> Persistent Storage
//!            └─> JSON Format
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docrag_vector_store::{FragmentStore, HashingEmbedder, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let embedder = Arc::new(HashingEmbedder::default());
//!     let store = MemoryStore::load("fragments.json", embedder.clone()).await?;
//!
//!     let hits = store.query_containing_substring("attention", 5).await?;
//!     for hit in hits {
//!         println!("{}: {:.3}", hit.fragment.id(), hit.distance);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod index;
mod store;
mod types;

pub use embeddings::{cosine_similarity, Embedder, HashingEmbedder};
pub use error::{Result, VectorStoreError};
pub use store::{FragmentStore, MemoryStore, STORE_SCHEMA_VERSION};
pub use types::{StoreHit, StoredFragment};

// Re-export chunker types for convenience
pub use docrag_text_chunker::{fragment_id, Fragment, FragmentMetadata};
