use docrag_text_chunker::Fragment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFragment {
    pub fragment: Fragment,
    pub vector: Vec<f32>,
}

/// A fragment returned by a ranked store query
#[derive(Debug, Clone, PartialEq)]
pub struct StoreHit {
    pub fragment: Fragment,

    /// Cosine distance to the query (lower is closer)
    pub distance: f32,
}
