//! # Hybrid Retrieval
//!
//! Finds the fragments that best ground an answer to a question by combining:
//!
//! - **Semantic search** over up to three query variants (original, shortened, technical)
//! - **Keyword search** with case variants of synonym-expanded keywords
//! - **Exhaustive scan** for critical domain terms as a precision safety net
//! - **Reciprocal-rank fusion** with a relevance gate and neighbor-context expansion
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docrag_search::{RetrievalConfig, RetrievalEngine, RetrievalOutcome, Vocabulary};
//! use docrag_vector_store::{HashingEmbedder, MemoryStore};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let embedder = Arc::new(HashingEmbedder::default());
//! let store = Arc::new(MemoryStore::load("fragments.json", embedder.clone()).await?);
//! let config = RetrievalConfig::default();
//! let engine = RetrievalEngine::new(store, embedder, config, Vocabulary::builtin())?;
//!
//! match engine.retrieve("How does multi-head attention work?").await?.outcome {
//!     RetrievalOutcome::Context { fragments, .. } => println!("{} fragments", fragments.len()),
//!     other => println!("{other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

mod assistant;
mod config;
mod engine;
mod error;
mod exhaustive;
mod expansion;
mod fusion;
mod generation;
mod keyword_search;
mod keywords;
mod overview;
mod prompt;
mod query;
mod report;
mod semantic;
mod vocabulary;

pub use assistant::{Answer, Assistant, GroundedAnswer};
pub use config::RetrievalConfig;
pub use engine::{Retrieval, RetrievalEngine, RetrievalOutcome};
pub use error::{Result, SearchError};
pub use exhaustive::{ExhaustiveScanner, ScanMatch, ScanResults, TermMatcher};
pub use expansion::{neighbor_ids, ContextExpander};
pub use fusion::{FusionRanker, RankedFragments, ScoredFragment};
pub use generation::{GenerationSink, GenerationStream, Generator};
pub use keyword_search::{case_variants, KeywordHit, KeywordResults, KeywordSearcher};
pub use keywords::KeywordExtractor;
pub use overview::{
    corpus_overview, corpus_stats, frequent_terms, list_documents, CorpusStats, DocumentTopics,
};
pub use prompt::{build_prompt, format_context, format_sources, source_listings, SourceListing};
pub use query::{QueryPlan, QueryVariant, VariantKind};
pub use report::{FailureReason, RetrievalReport, SearchStage, SubQueryFailure};
pub use semantic::{SemanticResults, SemanticSearcher, VariantHits};
pub use vocabulary::{Vocabulary, VocabularyOverrides};
