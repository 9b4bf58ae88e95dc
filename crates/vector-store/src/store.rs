use crate::embeddings::Embedder;
use crate::error::{Result, VectorStoreError};
use crate::index::FlatIndex;
use crate::types::{StoreHit, StoredFragment};
use async_trait::async_trait;
use docrag_text_chunker::Fragment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Read access to an indexed fragment collection.
///
/// Retrieval only ever reads through this trait, so any backend that can
/// answer these five queries can sit behind the engine.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// k nearest fragments to an already embedded query vector
    async fn query_by_vector(&self, vector: &[f32], k: usize) -> Result<Vec<StoreHit>>;

    /// Fragments whose text contains `needle` (case-sensitive), ranked by
    /// distance between their vector and the embedding of `needle`
    async fn query_containing_substring(&self, needle: &str, k: usize) -> Result<Vec<StoreHit>>;

    /// Fragments for the given ids, in request order. Unknown ids are skipped.
    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Fragment>>;

    /// Page through every fragment in insertion order
    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<Fragment>>;

    async fn count(&self) -> Result<usize>;
}

/// In-memory fragment store with JSON persistence
pub struct MemoryStore {
    fragments: Vec<StoredFragment>,
    by_id: HashMap<String, usize>,
    index: FlatIndex,
    embedder: Arc<dyn Embedder>,
}

#[derive(Serialize, Deserialize)]
struct PersistedStore {
    schema_version: u32,
    embedding_model: String,
    #[serde(default)]
    dimension: Option<usize>,
    fragments: Vec<StoredFragment>,
}

impl MemoryStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            fragments: Vec::new(),
            by_id: HashMap::new(),
            index: FlatIndex::new(),
            embedder,
        }
    }

    /// Load a persisted store. A missing file yields an empty store.
    ///
    /// A store embedded by a different model than `embedder` is rejected:
    /// its vectors cannot be compared with new query embeddings.
    pub async fn load(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let path = path.as_ref();
        let mut store = Self::new(embedder);

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No store at {}, starting empty", path.display());
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedStore = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != STORE_SCHEMA_VERSION {
            return Err(VectorStoreError::Other(format!(
                "Unsupported store schema_version {} (expected {STORE_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        if persisted.embedding_model != store.embedder.model_id() {
            return Err(VectorStoreError::ModelMismatch {
                stored: persisted.embedding_model,
                current: store.embedder.model_id().to_string(),
            });
        }

        for stored in persisted.fragments {
            store.insert(stored.fragment, stored.vector)?;
        }
        if let (Some(expected), Some(actual)) = (persisted.dimension, store.index.dimension()) {
            if expected != actual {
                return Err(VectorStoreError::InvalidDimension { expected, actual });
            }
        }

        log::info!("Loaded {} fragments from {}", store.len(), path.display());
        Ok(store)
    }

    /// Write the store as JSON (temp file + rename)
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let persisted = PersistedStore {
            schema_version: STORE_SCHEMA_VERSION,
            embedding_model: self.embedder.model_id().to_string(),
            dimension: self.index.dimension(),
            fragments: self.fragments.clone(),
        };
        let bytes = serde_json::to_vec(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        log::info!("Saved {} fragments to {}", self.len(), path.display());
        Ok(())
    }

    /// Insert a fragment with a precomputed vector. Duplicate ids are rejected.
    pub fn insert(&mut self, fragment: Fragment, vector: Vec<f32>) -> Result<()> {
        let id = fragment.id();
        if self.by_id.contains_key(&id) {
            return Err(VectorStoreError::DuplicateId(id));
        }

        let slot = self.index.push(vector.clone())?;
        debug_assert_eq!(slot, self.fragments.len());
        self.by_id.insert(id, slot);
        self.fragments.push(StoredFragment { fragment, vector });
        Ok(())
    }

    /// Embed and insert a batch of fragments, returning how many were added
    pub async fn add_fragments(&mut self, fragments: Vec<Fragment>) -> Result<usize> {
        if fragments.is_empty() {
            return Ok(0);
        }

        log::debug!("Embedding {} fragments", fragments.len());
        let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != fragments.len() {
            return Err(VectorStoreError::EmbeddingError(format!(
                "expected {} vectors, got {}",
                fragments.len(),
                vectors.len()
            )));
        }

        let added = fragments.len();
        for (fragment, vector) in fragments.into_iter().zip(vectors) {
            self.insert(fragment, vector)?;
        }
        Ok(added)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn embedder(&self) -> Arc<dyn Embedder> {
        Arc::clone(&self.embedder)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    fn hits(&self, ranked: Vec<(usize, f32)>) -> Vec<StoreHit> {
        ranked
            .into_iter()
            .filter_map(|(slot, distance)| {
                self.fragments.get(slot).map(|stored| StoreHit {
                    fragment: stored.fragment.clone(),
                    distance,
                })
            })
            .collect()
    }
}

#[async_trait]
impl FragmentStore for MemoryStore {
    async fn query_by_vector(&self, vector: &[f32], k: usize) -> Result<Vec<StoreHit>> {
        let ranked = self.index.search(vector, k)?;
        Ok(self.hits(ranked))
    }

    async fn query_containing_substring(&self, needle: &str, k: usize) -> Result<Vec<StoreHit>> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(needle).await?;
        let ranked = self.index.search_filtered(&vector, k, |slot| {
            self.fragments
                .get(slot)
                .is_some_and(|stored| stored.fragment.text.contains(needle))
        })?;
        Ok(self.hits(ranked))
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Fragment>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .filter_map(|&slot| self.fragments.get(slot))
            .map(|stored| stored.fragment.clone())
            .collect())
    }

    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<Fragment>> {
        Ok(self
            .fragments
            .iter()
            .skip(offset)
            .take(limit)
            .map(|stored| stored.fragment.clone())
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.fragments.len())
    }
}
