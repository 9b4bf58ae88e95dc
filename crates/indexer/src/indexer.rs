use crate::error::{IndexerError, Result};
use crate::pages::{decode_document, split_pages};
use crate::scanner::{DocumentFile, DocumentScanner};
use crate::stats::IndexStats;
use docrag_text_chunker::{Chunker, ChunkerConfig, Fragment};
use docrag_vector_store::MemoryStore;
use std::path::Path;
use std::time::Instant;

/// Fragments embedded per store call
const EMBED_BATCH_SIZE: usize = 64;

/// What `ensure_indexed` found or did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    /// The store already held fragments; nothing was indexed
    Existing { fragments: usize },
    /// The store was empty and the docs folder was indexed
    Built(IndexStats),
}

/// Fragments of one document plus per-page outcomes
#[derive(Debug, Default)]
pub struct ChunkedDocument {
    pub fragments: Vec<Fragment>,
    /// Kept fragment count per page, 0 for skipped pages
    pub page_fragments: Vec<usize>,
}

/// Document indexer that scans, chunks, and embeds page dumps
pub struct DocumentIndexer {
    chunker: Chunker,
    extensions: Vec<String>,
    recursive: bool,
}

impl DocumentIndexer {
    /// Create new indexer; an invalid chunker configuration is rejected here
    pub fn new(config: ChunkerConfig, extensions: Vec<String>) -> Result<Self> {
        Ok(Self {
            chunker: Chunker::new(config)?,
            extensions,
            recursive: false,
        })
    }

    #[must_use]
    pub const fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub const fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Split a document into pages and chunk each of them
    pub fn chunk_document(&self, source: &str, text: &str) -> ChunkedDocument {
        let mut document = ChunkedDocument::default();
        for (page, page_text) in split_pages(text).into_iter().enumerate() {
            let fragments = self.chunker.chunk_page(source, page, page_text);
            document.page_fragments.push(fragments.len());
            document.fragments.extend(fragments);
        }
        document
    }

    /// Index every accepted document under `dir` into the store.
    ///
    /// Per-document failures are collected in the returned stats; only an
    /// unusable `dir` fails the whole run.
    pub async fn index_folder(
        &self,
        dir: impl AsRef<Path>,
        store: &mut MemoryStore,
    ) -> Result<IndexStats> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let start = Instant::now();
        let mut stats = IndexStats::new();
        let documents = DocumentScanner::new(dir, &self.extensions)
            .recursive(self.recursive)
            .scan();

        for document in &documents {
            log::info!("Indexing {}", document.source);
            if let Err(e) = self.index_document(document, store, &mut stats).await {
                log::warn!("Failed to index {}: {e}", document.source);
                stats.add_error(format!("{}: {e}", document.source));
            }
        }

        stats.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Indexed {} documents ({} pages, {} fragments) in {} ms",
            stats.documents,
            stats.pages,
            stats.fragments,
            stats.time_ms
        );
        Ok(stats)
    }

    /// Index `dir` only when the store holds no fragments yet
    pub async fn ensure_indexed(
        &self,
        dir: impl AsRef<Path>,
        store: &mut MemoryStore,
    ) -> Result<IndexStatus> {
        if !store.is_empty() {
            log::info!("Store already holds {} fragments", store.len());
            return Ok(IndexStatus::Existing {
                fragments: store.len(),
            });
        }
        Ok(IndexStatus::Built(self.index_folder(dir, store).await?))
    }

    async fn index_document(
        &self,
        document: &DocumentFile,
        store: &mut MemoryStore,
        stats: &mut IndexStats,
    ) -> Result<()> {
        let bytes = tokio::fs::read(&document.path).await?;
        let text = decode_document(&bytes);
        let chunked = self.chunk_document(&document.source, &text);

        let fresh: Vec<Fragment> = chunked
            .fragments
            .into_iter()
            .filter(|fragment| !store.contains(&fragment.id()))
            .collect();

        let mut batch = Vec::with_capacity(EMBED_BATCH_SIZE);
        for fragment in fresh {
            batch.push(fragment);
            if batch.len() == EMBED_BATCH_SIZE {
                store.add_fragments(std::mem::take(&mut batch)).await?;
            }
        }
        store.add_fragments(batch).await?;

        stats.add_document();
        for count in chunked.page_fragments {
            stats.add_page(count);
        }
        Ok(())
    }
}
