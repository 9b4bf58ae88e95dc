use crate::engine::{RetrievalEngine, RetrievalOutcome};
use crate::error::Result;
use crate::fusion::ScoredFragment;
use crate::generation::{GenerationStream, Generator};
use crate::prompt::{build_prompt, source_listings, SourceListing};
use crate::report::RetrievalReport;
use std::sync::Arc;

/// Answer to one question
#[derive(Debug)]
pub enum Answer {
    /// Nothing retrievable; generation was not invoked
    NoInformation { report: RetrievalReport },

    /// Best fragment below the relevance gate; generation was not invoked
    OutOfScope {
        top_score: f32,
        report: RetrievalReport,
    },

    /// Streaming response grounded on the selected fragments
    Grounded(GroundedAnswer),
}

#[derive(Debug)]
pub struct GroundedAnswer {
    pub stream: GenerationStream,
    pub fragments: Vec<ScoredFragment>,
    pub sources: Vec<SourceListing>,
    pub top_score: f32,
    pub report: RetrievalReport,
}

impl Answer {
    pub fn report(&self) -> &RetrievalReport {
        match self {
            Self::NoInformation { report } | Self::OutOfScope { report, .. } => report,
            Self::Grounded(answer) => &answer.report,
        }
    }
}

/// Retrieval followed by grounded generation
pub struct Assistant {
    engine: RetrievalEngine,
    generator: Arc<dyn Generator>,
}

impl Assistant {
    pub fn new(engine: RetrievalEngine, generator: Arc<dyn Generator>) -> Self {
        Self { engine, generator }
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let retrieval = self.engine.retrieve(question).await?;
        let report = retrieval.report;

        match retrieval.outcome {
            RetrievalOutcome::NoInformation => Ok(Answer::NoInformation { report }),
            RetrievalOutcome::OutOfScope { top_score } => {
                log::info!("Best score {top_score:.4} is below the relevance threshold");
                Ok(Answer::OutOfScope { top_score, report })
            }
            RetrievalOutcome::Context {
                fragments,
                top_score,
            } => {
                let prompt = build_prompt(question, &fragments);
                log::debug!(
                    "Generating with {} from {} fragments ({} prompt chars)",
                    self.generator.model_id(),
                    fragments.len(),
                    prompt.chars().count()
                );
                let stream = self.generator.generate(&prompt).await?;

                Ok(Answer::Grounded(GroundedAnswer {
                    stream,
                    sources: source_listings(&fragments),
                    fragments,
                    top_score,
                    report,
                }))
            }
        }
    }
}
