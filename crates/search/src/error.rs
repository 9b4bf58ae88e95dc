use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Vector store error: {0}")]
    VectorStoreError(#[from] docrag_vector_store::VectorStoreError),

    #[error("Invalid retrieval configuration: {0}")]
    InvalidConfig(String),

    #[error("Empty query")]
    EmptyQuery,

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("{0}")]
    Other(String),
}

impl SearchError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
