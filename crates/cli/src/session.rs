use crate::config::{AppConfig, EmbedMode};
use crate::offline::OfflineGenerator;
use crate::ollama::{OllamaClient, OllamaEmbedder, OllamaGenerator};
use anyhow::{Context as AnyhowContext, Result};
use docrag_indexer::{DocumentIndexer, IndexStats, IndexStatus};
use docrag_search::{Assistant, Generator, RetrievalEngine};
use docrag_vector_store::{Embedder, FragmentStore, HashingEmbedder, MemoryStore};
use std::sync::Arc;
use std::time::Duration;

/// Embedding and generation backends selected by `embedding_mode`
pub struct Backends {
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
}

impl Backends {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match config.models.embedding_mode {
            EmbedMode::Stub => {
                log::debug!("Using stub embeddings and offline generation");
                Ok(Self {
                    embedder: Arc::new(HashingEmbedder::default()),
                    generator: Arc::new(OfflineGenerator),
                })
            }
            EmbedMode::Ollama => {
                let client = OllamaClient::new(
                    &config.models.ollama_url,
                    Duration::from_secs(config.models.request_timeout_secs),
                )
                .context("Failed to build HTTP client")?;
                log::debug!(
                    "Using Ollama at {} ({} / {})",
                    config.models.ollama_url,
                    config.models.embedding_model,
                    config.models.chat_model
                );
                Ok(Self {
                    embedder: Arc::new(OllamaEmbedder::new(
                        client.clone(),
                        config.models.embedding_model.clone(),
                    )),
                    generator: Arc::new(OllamaGenerator::new(
                        client,
                        config.models.chat_model.clone(),
                    )),
                })
            }
        }
    }
}

pub fn indexer(config: &AppConfig) -> Result<DocumentIndexer> {
    Ok(
        DocumentIndexer::new(config.chunking.clone(), config.paths.extensions.clone())?
            .recursive(config.paths.recursive),
    )
}

/// Load the store from disk, or start empty when it does not exist yet
pub async fn load_store(config: &AppConfig, embedder: Arc<dyn Embedder>) -> Result<MemoryStore> {
    MemoryStore::load(&config.paths.store_path, embedder)
        .await
        .with_context(|| {
            format!(
                "Failed to load store {} (run `docrag index --force` to rebuild it)",
                config.paths.store_path.display()
            )
        })
}

/// Rebuild the store from scratch and persist it
pub async fn rebuild_index(config: &AppConfig, embedder: Arc<dyn Embedder>) -> Result<IndexStats> {
    let mut store = MemoryStore::new(embedder);
    let stats = indexer(config)?
        .index_folder(&config.paths.docs_dir, &mut store)
        .await?;
    store.save(&config.paths.store_path).await?;
    Ok(stats)
}

/// A loaded store plus the assistant answering over it
pub struct Session {
    pub config: AppConfig,
    pub store: Arc<MemoryStore>,
    pub assistant: Assistant,
    /// Set when this session had to build the index first
    pub built: Option<IndexStats>,
}

impl Session {
    /// Load the store, index the docs folder when it is empty, and wire the engine
    pub async fn open(config: AppConfig) -> Result<Self> {
        let backends = Backends::from_config(&config)?;
        let mut store = load_store(&config, Arc::clone(&backends.embedder)).await?;

        let built = match indexer(&config)?
            .ensure_indexed(&config.paths.docs_dir, &mut store)
            .await?
        {
            IndexStatus::Existing { fragments } => {
                log::info!("Loaded {fragments} indexed fragments");
                None
            }
            IndexStatus::Built(stats) => {
                if stats.fragments > 0 {
                    store.save(&config.paths.store_path).await?;
                } else {
                    log::warn!(
                        "No documents were indexed from {}",
                        config.paths.docs_dir.display()
                    );
                }
                Some(stats)
            }
        };

        let store = Arc::new(store);
        let engine = RetrievalEngine::new(
            Arc::clone(&store) as Arc<dyn FragmentStore>,
            backends.embedder,
            config.retrieval.clone(),
            config.vocabulary(),
        )?;

        Ok(Self {
            assistant: Assistant::new(engine, backends.generator),
            store,
            built,
            config,
        })
    }

    pub fn fragment_store(&self) -> &dyn FragmentStore {
        self.store.as_ref()
    }
}
