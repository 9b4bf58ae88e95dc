use crate::exhaustive::ScanMatch;
use crate::keyword_search::KeywordHit;
use crate::semantic::VariantHits;
use docrag_text_chunker::Fragment;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A fragment annotated with the scores of one retrieval cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFragment {
    pub fragment: Fragment,

    /// Embedding distance when one is known, `f32::INFINITY` otherwise
    pub distance: f32,

    pub semantic_score: f32,
    pub keyword_score: f32,
    pub final_score: f32,

    /// Keywords and critical terms that hit this fragment
    pub matched_keywords: BTreeSet<String>,

    /// Indices of the semantic variants that retrieved it
    pub matched_variants: Vec<usize>,
}

impl ScoredFragment {
    fn new(fragment: Fragment, distance: f32) -> Self {
        Self {
            fragment,
            distance,
            semantic_score: 0.0,
            keyword_score: 0.0,
            final_score: 0.0,
            matched_keywords: BTreeSet::new(),
            matched_variants: Vec::new(),
        }
    }

    /// Neighbor fragment added for context only
    pub fn context(fragment: Fragment) -> Self {
        Self::new(fragment, f32::INFINITY)
    }

    pub fn id(&self) -> String {
        self.fragment.id()
    }
}

/// Fused ranking, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedFragments {
    pub fragments: Vec<ScoredFragment>,
}

impl RankedFragments {
    /// Best final score, 0.0 when nothing was retrieved
    pub fn top_score(&self) -> f32 {
        self.fragments.first().map_or(0.0, |f| f.final_score)
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }
}

/// Weighted reciprocal-rank fusion of semantic, keyword and scan results
#[derive(Debug, Clone)]
pub struct FusionRanker {
    /// RRF constant k (typically 60)
    rrf_k: f32,

    semantic_weight: f32,
    keyword_weight: f32,

    /// Keyword score per critical term matched by the scan
    exhaustive_weight: f32,
}

impl Default for FusionRanker {
    fn default() -> Self {
        Self::new(0.6, 0.4, 60, 0.5)
    }
}

impl FusionRanker {
    pub fn new(
        semantic_weight: f32,
        keyword_weight: f32,
        rrf_k: usize,
        exhaustive_weight: f32,
    ) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let rrf_k = rrf_k as f32;
        Self {
            rrf_k,
            semantic_weight,
            keyword_weight,
            exhaustive_weight,
        }
    }

    /// Contribution of a 1-based rank
    #[allow(clippy::cast_precision_loss)]
    fn rrf(&self, rank: usize) -> f32 {
        1.0 / (rank as f32 + self.rrf_k)
    }

    fn final_score(&self, semantic: f32, keyword: f32) -> f32 {
        self.semantic_weight * semantic + self.keyword_weight * keyword
    }

    /// Merge the three result sets keyed by fragment id.
    ///
    /// Semantic hits add `1/(rank+k)` to the semantic score for every variant
    /// list they appear in; keyword hits add `1/(rank+k)` to the keyword score,
    /// ranked over the whole emission order; scan matches add
    /// `exhaustive_weight * matches` to the keyword score. The sort is stable,
    /// so ties keep first-seen order.
    pub fn fuse(
        &self,
        semantic: &[VariantHits],
        keyword: &[KeywordHit],
        exhaustive: &[ScanMatch],
    ) -> RankedFragments {
        let mut pool = Pool::default();

        for list in semantic {
            for (idx, hit) in list.hits.iter().enumerate() {
                let contribution = self.rrf(idx + 1);
                let entry = pool.entry(&hit.fragment, hit.distance);
                entry.semantic_score += contribution;
                entry.matched_variants.push(list.variant);
            }
        }

        for (idx, hit) in keyword.iter().enumerate() {
            let contribution = self.rrf(idx + 1);
            let entry = pool.entry(&hit.fragment, hit.distance);
            entry.keyword_score += contribution;
            entry.matched_keywords.insert(hit.keyword.clone());
        }

        for matched in exhaustive {
            #[allow(clippy::cast_precision_loss)]
            let boost = self.exhaustive_weight * matched.match_count() as f32;
            let entry = pool.entry(&matched.fragment, f32::INFINITY);
            entry.keyword_score += boost;
            entry.matched_keywords.extend(matched.terms.iter().cloned());
        }

        let mut fragments = pool.into_fragments();
        for fragment in &mut fragments {
            fragment.final_score =
                self.final_score(fragment.semantic_score, fragment.keyword_score);
        }

        fragments.sort_by(|a, b| {
            b.final_score
                .partial_cmp(&a.final_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        RankedFragments { fragments }
    }
}

/// Insertion-ordered accumulator keyed by fragment id
#[derive(Default)]
struct Pool {
    order: Vec<ScoredFragment>,
    index: HashMap<String, usize>,
}

impl Pool {
    fn entry(&mut self, fragment: &Fragment, distance: f32) -> &mut ScoredFragment {
        let id = fragment.id();
        let slot = match self.index.get(&id) {
            Some(&slot) => slot,
            None => {
                self.order.push(ScoredFragment::new(fragment.clone(), distance));
                self.index.insert(id, self.order.len() - 1);
                self.order.len() - 1
            }
        };
        &mut self.order[slot]
    }

    fn into_fragments(self) -> Vec<ScoredFragment> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrag_text_chunker::FragmentMetadata;
    use docrag_vector_store::StoreHit;
    use proptest::prelude::*;

    fn fragment(chunk: usize) -> Fragment {
        Fragment::new(
            format!("text of chunk {chunk}"),
            FragmentMetadata::new("spec.pdf", 0, chunk),
        )
    }

    fn variant(variant: usize, chunks: &[usize]) -> VariantHits {
        VariantHits {
            variant,
            hits: chunks
                .iter()
                .enumerate()
                .map(|(i, &c)| StoreHit {
                    fragment: fragment(c),
                    distance: 0.1 * (i + 1) as f32,
                })
                .collect(),
        }
    }

    fn keyword_hit(chunk: usize, keyword: &str) -> KeywordHit {
        KeywordHit {
            fragment: fragment(chunk),
            distance: 0.5,
            keyword: keyword.to_string(),
        }
    }

    fn scan_match(chunk: usize, terms: &[&str]) -> ScanMatch {
        ScanMatch {
            fragment: fragment(chunk),
            terms: terms.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    fn find(ranked: &RankedFragments, chunk: usize) -> &ScoredFragment {
        ranked
            .fragments
            .iter()
            .find(|f| f.fragment.metadata.chunk == chunk)
            .unwrap()
    }

    #[test]
    fn empty_input_has_zero_top_score() {
        let ranked = FusionRanker::default().fuse(&[], &[], &[]);
        assert!(ranked.is_empty());
        assert_eq!(ranked.top_score(), 0.0);
    }

    #[test]
    fn semantic_scores_accumulate_across_variants() {
        let ranker = FusionRanker::default();
        let ranked = ranker.fuse(&[variant(0, &[0, 1]), variant(1, &[1])], &[], &[]);

        let first = find(&ranked, 1);
        assert!((first.semantic_score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-6);
        assert_eq!(first.matched_variants, vec![0, 1]);
        assert!((first.final_score - 0.6 * first.semantic_score).abs() < 1e-6);

        // Chunk 1 was retrieved twice and now outranks chunk 0
        assert_eq!(ranked.fragments[0].fragment.metadata.chunk, 1);
    }

    #[test]
    fn keyword_only_hits_start_with_zero_semantic_score() {
        let ranked = FusionRanker::default().fuse(&[], &[keyword_hit(4, "encoder")], &[]);
        let hit = find(&ranked, 4);
        assert_eq!(hit.semantic_score, 0.0);
        assert!((hit.keyword_score - 1.0 / 61.0).abs() < 1e-6);
        assert!(hit.matched_keywords.contains("encoder"));
        assert_eq!(hit.distance, 0.5);
    }

    #[test]
    fn scan_matches_get_infinite_distance() {
        let ranked =
            FusionRanker::default().fuse(&[], &[], &[scan_match(7, &["query", "key"])]);
        let hit = find(&ranked, 7);
        assert!(hit.distance.is_infinite());
        assert!((hit.keyword_score - 1.0).abs() < 1e-6);
        assert!((hit.final_score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn scan_keeps_known_distance() {
        let ranked = FusionRanker::default().fuse(
            &[variant(0, &[2])],
            &[],
            &[scan_match(2, &["value"])],
        );
        let hit = find(&ranked, 2);
        assert!((hit.distance - 0.1).abs() < 1e-6);
        assert!((hit.keyword_score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn ties_keep_insertion_order() {
        let ranked = FusionRanker::default().fuse(
            &[],
            &[],
            &[scan_match(3, &["key"]), scan_match(1, &["value"])],
        );
        let order: Vec<usize> = ranked
            .fragments
            .iter()
            .map(|f| f.fragment.metadata.chunk)
            .collect();
        assert_eq!(order, vec![3, 1]);
    }

    proptest! {
        #[test]
        fn adding_a_keyword_hit_never_lowers_final_score(
            semantic in proptest::collection::vec(0usize..6, 0..10),
            keywords in proptest::collection::vec(0usize..6, 0..10),
            extra in 0usize..6,
        ) {
            let ranker = FusionRanker::default();
            let semantic = vec![variant(0, &semantic)];
            let mut hits: Vec<KeywordHit> =
                keywords.iter().map(|&c| keyword_hit(c, "kw")).collect();

            let before = ranker.fuse(&semantic, &hits, &[]);
            hits.push(keyword_hit(extra, "kw"));
            let after = ranker.fuse(&semantic, &hits, &[]);

            let old = before
                .fragments
                .iter()
                .find(|f| f.fragment.metadata.chunk == extra)
                .map_or(0.0, |f| f.final_score);
            let new = find(&after, extra).final_score;
            prop_assert!(new >= old);
        }

        #[test]
        fn adding_a_scan_match_never_lowers_keyword_score(
            keywords in proptest::collection::vec(0usize..6, 0..10),
            scanned in proptest::collection::vec(0usize..6, 0..4),
            extra in 0usize..6,
        ) {
            let ranker = FusionRanker::default();
            let hits: Vec<KeywordHit> = keywords.iter().map(|&c| keyword_hit(c, "kw")).collect();
            let mut scans: Vec<ScanMatch> =
                scanned.iter().map(|&c| scan_match(c, &["key"])).collect();

            let before = ranker.fuse(&[], &hits, &scans);
            scans.push(scan_match(extra, &["query"]));
            let after = ranker.fuse(&[], &hits, &scans);

            let old = before
                .fragments
                .iter()
                .find(|f| f.fragment.metadata.chunk == extra)
                .map_or(0.0, |f| f.keyword_score);
            prop_assert!(find(&after, extra).keyword_score >= old);
        }

        #[test]
        fn higher_semantic_score_wins_on_equal_keyword_score(
            semantic_a in 0.0f32..1.0,
            delta in 0.001f32..1.0,
            keyword in 0.0f32..1.0,
        ) {
            let ranker = FusionRanker::default();
            let low = ranker.final_score(semantic_a, keyword);
            let high = ranker.final_score(semantic_a + delta, keyword);
            prop_assert!(high > low);
        }
    }
}
