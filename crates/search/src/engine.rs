use crate::config::RetrievalConfig;
use crate::error::{Result, SearchError};
use crate::exhaustive::{ExhaustiveScanner, ScanResults};
use crate::expansion::ContextExpander;
use crate::fusion::{FusionRanker, RankedFragments, ScoredFragment};
use crate::keyword_search::{KeywordResults, KeywordSearcher};
use crate::keywords::KeywordExtractor;
use crate::query::QueryPlan;
use crate::report::RetrievalReport;
use crate::semantic::SemanticSearcher;
use crate::vocabulary::Vocabulary;
use docrag_vector_store::{Embedder, FragmentStore};
use std::sync::Arc;

/// Result of one retrieval cycle
#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome {
    /// Nothing was retrieved at all
    NoInformation,

    /// Fragments were found but the best one scored below the relevance threshold
    OutOfScope { top_score: f32 },

    /// Selected fragments (best first) followed by context neighbors
    Context {
        fragments: Vec<ScoredFragment>,
        top_score: f32,
    },
}

#[derive(Debug, Clone)]
pub struct Retrieval {
    pub outcome: RetrievalOutcome,
    pub report: RetrievalReport,
}

/// Hybrid retrieval over a fragment store
///
/// ```text
/// question ─┬─> QueryPlan ──> SemanticSearcher ─┐
///           │                                   ├─> FusionRanker ─> gate ─> top-k ─> expand
///           └─> keywords ─┬─> KeywordSearcher ──┤
///                         └─> ExhaustiveScanner ┘
/// ```
pub struct RetrievalEngine {
    config: RetrievalConfig,
    extractor: KeywordExtractor,
    semantic: SemanticSearcher,
    keyword: KeywordSearcher,
    exhaustive: ExhaustiveScanner,
    fusion: FusionRanker,
    expander: ContextExpander,
}

impl RetrievalEngine {
    pub fn new(
        store: Arc<dyn FragmentStore>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
        vocabulary: Arc<Vocabulary>,
    ) -> Result<Self> {
        config.validate()?;
        let timeout = config.call_timeout();

        Ok(Self {
            extractor: KeywordExtractor::new(vocabulary),
            semantic: SemanticSearcher::new(
                Arc::clone(&store),
                embedder,
                config.n_semantic,
                timeout,
            ),
            keyword: KeywordSearcher::new(
                Arc::clone(&store),
                config.n_keyword,
                config.max_keywords,
                timeout,
            ),
            exhaustive: ExhaustiveScanner::new(
                Arc::clone(&store),
                config.scan_batch_size,
                config.exhaustive_cap,
                timeout,
            ),
            fusion: FusionRanker::new(
                config.semantic_weight,
                config.keyword_weight,
                config.rrf_k,
                config.exhaustive_weight,
            ),
            expander: ContextExpander::new(store, config.expand_top, config.neighbors, timeout),
            config,
        })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn plan(&self, question: &str) -> QueryPlan {
        QueryPlan::build(question, &self.extractor)
    }

    /// Full fused ranking for a question, before gating and truncation
    pub async fn rank(
        &self,
        plan: &QueryPlan,
        report: &mut RetrievalReport,
    ) -> Result<RankedFragments> {
        let semantic = self.semantic.search(plan).await;
        report.semantic_hits = semantic.hit_count();
        report.failures.extend(semantic.failures.iter().cloned());

        let keyword = if self.config.hybrid {
            self.keyword.search(&plan.keywords).await
        } else {
            KeywordResults::default()
        };
        report.keyword_hits = keyword.hits.len();
        report.failures.extend(keyword.failures.iter().cloned());

        let scan = if plan.critical_terms.is_empty() {
            ScanResults::default()
        } else {
            self.exhaustive.scan(&plan.critical_terms).await?
        };
        report.scan_matches = scan.matches.len();
        report.failures.extend(scan.failures.iter().cloned());

        let ranked = self
            .fusion
            .fuse(&semantic.lists, &keyword.hits, &scan.matches);
        report.candidates = ranked.len();
        Ok(ranked)
    }

    /// Retrieve, gate and expand context for one question
    pub async fn retrieve(&self, question: &str) -> Result<Retrieval> {
        if question.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let plan = self.plan(question);
        let mut report = RetrievalReport {
            variants: plan.variants.clone(),
            keywords: plan.keywords.clone(),
            critical_terms: plan.critical_terms.clone(),
            ..RetrievalReport::default()
        };

        let ranked = self.rank(&plan, &mut report).await?;
        let top_score = ranked.top_score();

        let outcome = if ranked.is_empty() {
            RetrievalOutcome::NoInformation
        } else if top_score < self.config.relevance_threshold {
            RetrievalOutcome::OutOfScope { top_score }
        } else {
            let mut fragments = ranked.fragments;
            fragments.truncate(self.config.top_k_final);

            if self.config.expand_context {
                let selected = fragments.len();
                let failures = self.expander.expand(&mut fragments).await;
                report.expanded = fragments.len() - selected;
                report.failures.extend(failures);
            }

            RetrievalOutcome::Context {
                fragments,
                top_score,
            }
        };

        log::info!(
            "Retrieved {} candidates (top score {:.4}, {} sub-query failures)",
            report.candidates,
            top_score,
            report.failures.len()
        );

        Ok(Retrieval { outcome, report })
    }
}
