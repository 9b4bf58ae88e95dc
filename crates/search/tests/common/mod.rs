#![allow(dead_code)]

use async_trait::async_trait;
use docrag_search::{GenerationStream, Generator};
use docrag_text_chunker::{Fragment, FragmentMetadata};
use docrag_vector_store::{
    Embedder, FragmentStore, MemoryStore, Result, StoreHit, VectorStoreError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Embeds every text to the same vector, so stored vectors alone decide the ranking
pub struct FixedEmbedder(pub Vec<f32>);

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(self.0.clone())
    }

    fn model_id(&self) -> &str {
        "fixed"
    }
}

pub fn embedder() -> Arc<dyn Embedder> {
    Arc::new(FixedEmbedder(vec![1.0, 0.0]))
}

pub fn fragment(source: &str, page: usize, chunk: usize, total: usize, text: &str) -> Fragment {
    Fragment::new(
        text.to_string(),
        FragmentMetadata::new(source, page, chunk).total_chunks_in_page(total),
    )
}

/// One page of "spec.pdf" with three chunks; chunk 0 is nearest to every query
pub fn spec_store() -> MemoryStore {
    let mut store = MemoryStore::new(embedder());
    store
        .insert(
            fragment("spec.pdf", 0, 0, 3, "Introduction to the system and its goals."),
            vec![1.0, 0.0],
        )
        .unwrap();
    store
        .insert(
            fragment(
                "spec.pdf",
                0,
                1,
                3,
                "The zorblax stage. Zorblax buffers feed the ZORBLAX core.",
            ),
            vec![0.8, 0.6],
        )
        .unwrap();
    store
        .insert(
            fragment("spec.pdf", 0, 2, 3, "Closing remarks on deployment."),
            vec![0.0, 1.0],
        )
        .unwrap();
    store
}

/// Store wrapper that fails or stalls selected operations
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_substring: bool,
    pub stall_vector: bool,
    pub fail_ids: bool,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_substring: false,
            stall_vector: false,
            fail_ids: false,
        }
    }
}

#[async_trait]
impl FragmentStore for FlakyStore {
    async fn query_by_vector(&self, vector: &[f32], k: usize) -> Result<Vec<StoreHit>> {
        if self.stall_vector {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        self.inner.query_by_vector(vector, k).await
    }

    async fn query_containing_substring(&self, needle: &str, k: usize) -> Result<Vec<StoreHit>> {
        if self.fail_substring {
            return Err(VectorStoreError::IndexError("filter unavailable".into()));
        }
        self.inner.query_containing_substring(needle, k).await
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Fragment>> {
        if self.fail_ids {
            return Err(VectorStoreError::Other("lookup failed".into()));
        }
        self.inner.get_by_ids(ids).await
    }

    async fn scan(&self, offset: usize, limit: usize) -> Result<Vec<Fragment>> {
        self.inner.scan(offset, limit).await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

/// Generator that replays fixed increments and remembers the last prompt
#[derive(Default)]
pub struct RecordingGenerator {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> docrag_search::Result<GenerationStream> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(GenerationStream::from_increments(vec![
            "Zorblax ".to_string(),
            "buffers feed the core.".to_string(),
        ]))
    }

    fn model_id(&self) -> &str {
        "recording"
    }
}
