use anyhow::Result;
use docrag_indexer::IndexStats;
use docrag_search::{
    format_sources, Answer, CorpusStats, DocumentTopics, RetrievalReport, ScoredFragment,
    SourceListing,
};
use serde::Serialize;
use std::io::{self, Write};

pub const WIDTH: usize = 80;

pub const NO_INFORMATION: &str = "\
Sorry, I could not find specific information about your question in the available documents. This may be because:

  - the information is not contained in the indexed documents
  - the question could be phrased differently
  - the topic is outside the scope of the documents

Tip: rephrase the question, or ask about the main topics of the documents.";

pub const OUT_OF_SCOPE: &str = "\
This question seems to be outside the scope of the available documents. The indexed documents contain specific technical information.

Tip: type 'topics' for a summary of the available contents, or 'docs' for the list of documents.";

pub const WELCOME: &str = "\
Welcome to the document assistant!

I can help you find information in the indexed documents. Type your question and I will look for the most relevant answer.

Available commands:
  - 'exit' or 'quit'  end the session
  - 'stats'           database statistics
  - 'docs'            list indexed documents
  - 'topics'          summary of the available contents
  - 'help'            show this help";

pub const FAREWELL: &str = "Goodbye! Thanks for using the document assistant.";

/// Write a line to stdout, treating a closed pipe as success
pub fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

/// Write a fragment of streamed text without a newline
pub fn print_increment(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
        Err(err) if err.kind() != io::ErrorKind::BrokenPipe => Err(err.into()),
        _ => Ok(()),
    }
}

pub fn rule() -> String {
    "-".repeat(WIDTH)
}

pub fn banner(title: &str) -> String {
    let line = "=".repeat(WIDTH);
    format!("\n{line}\n  {title}\n{line}")
}

pub fn index_summary(stats: &IndexStats) -> String {
    let mut out = format!(
        "Indexed {} documents ({} pages, {} fragments) in {}ms",
        stats.documents, stats.pages, stats.fragments, stats.time_ms
    );
    if stats.skipped_pages > 0 {
        out.push_str(&format!("\nSkipped {} short pages", stats.skipped_pages));
    }
    for error in &stats.errors {
        out.push_str(&format!("\nError: {error}"));
    }
    out
}

pub fn stats_text(stats: &CorpusStats) -> String {
    let mut out = format!(
        "Vector database:\n  - Indexed fragments: {}\n  - Distinct documents: {}",
        stats.fragments,
        stats.documents.len()
    );
    if !stats.documents.is_empty() {
        out.push_str("\n\nIndexed documents:");
        for doc in &stats.documents {
            out.push_str(&format!("\n  - {doc}"));
        }
    }
    out
}

pub fn documents_text(documents: &[String]) -> String {
    if documents.is_empty() {
        return "No documents indexed.".to_string();
    }
    let mut out = format!("Found {} document(s):\n", documents.len());
    for (i, doc) in documents.iter().enumerate() {
        out.push_str(&format!("\n  {}. {doc}", i + 1));
    }
    out
}

pub fn topics_text(topics: &[DocumentTopics]) -> String {
    if topics.is_empty() {
        return "No documents indexed.".to_string();
    }
    let mut out = format!("Indexed documents: {}\n", topics.len());
    for doc in topics {
        out.push_str(&format!("\n{}\n{}\n", rule(), doc.document));
        out.push_str(&format!("\n  Indexed pages: {}", doc.pages));
        out.push_str(&format!("\n  Fragments: {}", doc.fragments));
        if !doc.top_terms.is_empty() {
            out.push_str(&format!("\n\n  Frequent terms: {}", doc.top_terms.join(", ")));
        }
        if !doc.sample.is_empty() {
            out.push_str(&format!("\n\n  Sample:\n    \"{}...\"", doc.sample));
        }
        out.push('\n');
    }
    out.push_str(&format!(
        "{}\n\nAsk a question about any of these topics.",
        rule()
    ));
    out
}

pub fn sources_text(sources: &[SourceListing]) -> String {
    format!("\nSources consulted:\n\n{}", format_sources(sources))
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    Grounded,
    NoInformation,
    OutOfScope,
}

#[derive(Debug, Serialize)]
pub struct FragmentOutput {
    pub id: String,
    pub source: String,
    /// 1-based
    pub page: usize,
    /// 1-based
    pub chunk: usize,
    pub final_score: f32,
    pub semantic_score: f32,
    pub keyword_score: f32,
    /// Added as a neighbor of a ranked fragment
    pub context: bool,
}

impl From<&ScoredFragment> for FragmentOutput {
    fn from(scored: &ScoredFragment) -> Self {
        let meta = &scored.fragment.metadata;
        Self {
            id: scored.id(),
            source: meta.source.clone(),
            page: meta.page + 1,
            chunk: meta.chunk + 1,
            final_score: scored.final_score,
            semantic_score: scored.semantic_score,
            keyword_score: scored.keyword_score,
            context: scored.distance.is_infinite() && scored.final_score == 0.0,
        }
    }
}

/// Machine-readable result of `ask --json`
#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub question: String,
    pub status: AnswerStatus,
    pub answer: Option<String>,
    pub top_score: Option<f32>,
    pub sources: Vec<SourceListing>,
    pub fragments: Vec<FragmentOutput>,
    pub report: RetrievalReport,
}

impl AskOutput {
    /// Consume the answer, draining the generation stream when there is one
    pub async fn collect(question: &str, answer: Answer) -> Result<Self> {
        let question = question.to_string();
        Ok(match answer {
            Answer::NoInformation { report } => Self {
                question,
                status: AnswerStatus::NoInformation,
                answer: None,
                top_score: None,
                sources: Vec::new(),
                fragments: Vec::new(),
                report,
            },
            Answer::OutOfScope { top_score, report } => Self {
                question,
                status: AnswerStatus::OutOfScope,
                answer: None,
                top_score: Some(top_score),
                sources: Vec::new(),
                fragments: Vec::new(),
                report,
            },
            Answer::Grounded(grounded) => Self {
                question,
                status: AnswerStatus::Grounded,
                fragments: grounded.fragments.iter().map(FragmentOutput::from).collect(),
                sources: grounded.sources,
                top_score: Some(grounded.top_score),
                report: grounded.report,
                answer: Some(grounded.stream.collect_text().await?),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn documents_are_numbered() {
        let docs = vec!["a.txt".to_string(), "b.txt".to_string()];
        assert_eq!(
            documents_text(&docs),
            "Found 2 document(s):\n\n  1. a.txt\n  2. b.txt"
        );
        assert_eq!(documents_text(&[]), "No documents indexed.");
    }

    #[test]
    fn index_summary_lists_errors() {
        let stats = IndexStats {
            documents: 1,
            pages: 2,
            skipped_pages: 1,
            fragments: 5,
            time_ms: 7,
            errors: vec!["b.txt: IO error".to_string()],
        };
        assert_eq!(
            index_summary(&stats),
            "Indexed 1 documents (2 pages, 5 fragments) in 7ms\n\
             Skipped 1 short pages\n\
             Error: b.txt: IO error"
        );
    }

    #[test]
    fn status_serializes_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&AnswerStatus::OutOfScope).unwrap(),
            "\"out_of_scope\""
        );
    }
}
