use anyhow::{Context as AnyhowContext, Result};
use clap::ValueEnum;
use docrag_search::{RetrievalConfig, Vocabulary, VocabularyOverrides};
use docrag_text_chunker::ChunkerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "docrag.toml";

pub const ENV_EMBEDDING_MODE: &str = "DOCRAG_EMBEDDING_MODE";
pub const ENV_OLLAMA_URL: &str = "DOCRAG_OLLAMA_URL";

/// Embedding backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// Ollama embeddings and generation over HTTP
    #[default]
    Ollama,
    /// Deterministic hashing embedder and offline generator (no network)
    Stub,
}

impl EmbedMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::Stub => "stub",
        }
    }
}

impl FromStr for EmbedMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "stub" => Ok(Self::Stub),
            other => anyhow::bail!("Unknown embedding mode '{other}' (expected ollama|stub)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder holding the page dumps to index
    pub docs_dir: PathBuf,

    /// JSON file backing the fragment store
    pub store_path: PathBuf,

    /// Accepted document extensions, without the dot
    pub extensions: Vec<String>,

    /// Descend into subfolders of `docs_dir`
    pub recursive: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("."),
            store_path: PathBuf::from("mi_vector_db/fragments.json"),
            extensions: vec!["txt".to_string()],
            recursive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub embedding_mode: EmbedMode,
    pub chat_model: String,
    pub embedding_model: String,
    pub ollama_url: String,
    /// Upper bound for one embedding request and for connecting to Ollama
    pub request_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_mode: EmbedMode::Ollama,
            chat_model: "gpt-oss:20b".to_string(),
            embedding_model: "nomic-embed-text:latest".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Everything the binary needs, resolved once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub models: ModelConfig,
    pub chunking: ChunkerConfig,
    pub retrieval: RetrievalConfig,
    pub vocabulary: Option<VocabularyOverrides>,
}

/// Command-line values that take precedence over file and environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub embed_mode: Option<EmbedMode>,
    pub docs_dir: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
}

impl AppConfig {
    /// File (explicit path, or `docrag.toml` when present), then environment, then flags
    pub fn resolve(config_path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(mode) = lookup(ENV_EMBEDDING_MODE).filter(|v| !v.trim().is_empty()) {
            self.models.embedding_mode = mode
                .parse()
                .with_context(|| format!("Invalid {ENV_EMBEDDING_MODE}"))?;
        }
        if let Some(url) = lookup(ENV_OLLAMA_URL).filter(|v| !v.trim().is_empty()) {
            self.models.ollama_url = url.trim().to_string();
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(mode) = overrides.embed_mode {
            self.models.embedding_mode = mode;
        }
        if let Some(dir) = &overrides.docs_dir {
            self.paths.docs_dir = dir.clone();
        }
        if let Some(path) = &overrides.store_path {
            self.paths.store_path = path.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking
            .validate()
            .context("Invalid [chunking] section")?;
        self.retrieval
            .validate()
            .context("Invalid [retrieval] section")?;
        if self.paths.extensions.is_empty() {
            anyhow::bail!("paths.extensions must name at least one extension");
        }
        if self.models.request_timeout_secs == 0 {
            anyhow::bail!("models.request_timeout_secs must be > 0");
        }
        if self.models.embedding_mode == EmbedMode::Ollama && self.models.ollama_url.is_empty() {
            anyhow::bail!("models.ollama_url must be set in ollama mode");
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> Arc<Vocabulary> {
        self.vocabulary
            .as_ref()
            .map_or_else(Vocabulary::builtin, Vocabulary::with_overrides)
    }
}
