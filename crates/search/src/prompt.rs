use crate::fusion::ScoredFragment;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const RULE: &str = "===============================================================================";

const INSTRUCTIONS: &str = "\
You are a helpful expert assistant. Answer questions using ONLY the document fragments provided below.

1. SOURCE OF INFORMATION
   - Answer only with information that appears explicitly in the fragments.
   - Never invent, assume or use outside knowledge.
   - If the information is not in the fragments, say so clearly.

2. ANSWER FORMAT
   - Answer clearly and in a structured way; use bullets or numbering where it helps.
   - Cite your sources at the end of the answer.

3. SPECIAL CASES
   a) The question is related to the documents but the specific information is missing:
      say that nothing specific was found, mention the related topics the fragments do
      cover, and offer to search for one of them.
   b) The question is completely outside the scope of the documents: say so, briefly
      describe what the fragments are about, and offer help with related questions.
   c) The fragments only partially answer the question: give what you found and state
      which aspects are not covered.

4. CITATIONS
   - Always end with a \"Sources\" section listing exactly where the information came from.
   - Citation format: \"Document: [name], Page: [number]\"
   - List every source when the information comes from several.";

/// Render the selected fragments as numbered, cited blocks
pub fn format_context(fragments: &[ScoredFragment]) -> String {
    fragments
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let meta = &scored.fragment.metadata;
            format!(
                "[FRAGMENT {}]\nDocument: {}\nPage: {} | Fragment: {}\n\n{}",
                i + 1,
                meta.source,
                meta.page + 1,
                meta.chunk + 1,
                scored.fragment.text
            )
        })
        .collect::<Vec<_>>()
        .join(&format!("\n\n{}\n\n", "-".repeat(50)))
}

/// Full generation prompt: instructions, fragments, question
pub fn build_prompt(question: &str, fragments: &[ScoredFragment]) -> String {
    format!(
        "{INSTRUCTIONS}\n\n{RULE}\nAVAILABLE DOCUMENT FRAGMENTS\n{RULE}\n\n{context}\n\n\
         {RULE}\nUSER QUESTION\n{RULE}\n\n{question}\n\n\
         {RULE}\nANSWER (based only on the fragments above)\n{RULE}\n",
        context = format_context(fragments),
        question = question.trim(),
    )
}

/// One consulted document and its 1-based pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceListing {
    pub document: String,
    pub pages: Vec<usize>,
}

/// Distinct documents behind the fragments, sorted by name, pages ascending
pub fn source_listings(fragments: &[ScoredFragment]) -> Vec<SourceListing> {
    let mut sources: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
    for scored in fragments {
        let meta = &scored.fragment.metadata;
        sources
            .entry(meta.source.as_str())
            .or_default()
            .insert(meta.page + 1);
    }

    sources
        .into_iter()
        .map(|(document, pages)| SourceListing {
            document: document.to_string(),
            pages: pages.into_iter().collect(),
        })
        .collect()
}

/// Human-readable source list printed after an answer
pub fn format_sources(sources: &[SourceListing]) -> String {
    sources
        .iter()
        .map(|source| {
            let pages = source
                .pages
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!("  {}\n     Pages consulted: {}", source.document, pages)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrag_text_chunker::{Fragment, FragmentMetadata};
    use pretty_assertions::assert_eq;

    fn scored(source: &str, page: usize, chunk: usize, text: &str) -> ScoredFragment {
        ScoredFragment::context(Fragment::new(
            text.to_string(),
            FragmentMetadata::new(source, page, chunk),
        ))
    }

    #[test]
    fn context_blocks_use_one_based_numbers() {
        let context = format_context(&[scored("spec.pdf", 0, 2, "Attention is all you need.")]);
        assert_eq!(
            context,
            "[FRAGMENT 1]\nDocument: spec.pdf\nPage: 1 | Fragment: 3\n\nAttention is all you need."
        );
    }

    #[test]
    fn prompt_contains_fragments_and_question() {
        let prompt = build_prompt(
            "  What is attention? ",
            &[
                scored("spec.pdf", 0, 0, "first"),
                scored("notes.txt", 4, 1, "second"),
            ],
        );
        assert!(prompt.contains("[FRAGMENT 2]\nDocument: notes.txt\nPage: 5 | Fragment: 2"));
        assert!(prompt.contains("USER QUESTION\n"));
        assert!(prompt.contains("\n\nWhat is attention?\n\n"));
        assert!(prompt.starts_with("You are a helpful expert assistant."));
    }

    #[test]
    fn sources_are_grouped_and_sorted() {
        let listings = source_listings(&[
            scored("spec.pdf", 3, 0, "a"),
            scored("b.pdf", 0, 0, "b"),
            scored("spec.pdf", 0, 1, "c"),
            scored("spec.pdf", 3, 1, "d"),
        ]);
        assert_eq!(
            listings,
            vec![
                SourceListing {
                    document: "b.pdf".into(),
                    pages: vec![1]
                },
                SourceListing {
                    document: "spec.pdf".into(),
                    pages: vec![1, 4]
                },
            ]
        );
        assert_eq!(
            format_sources(&listings),
            "  b.pdf\n     Pages consulted: 1\n  spec.pdf\n     Pages consulted: 1, 4"
        );
    }
}
