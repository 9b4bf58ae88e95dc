use async_trait::async_trait;
use docrag_search::{GenerationStream, Generator};

const FRAGMENT_MARKER: &str = "[FRAGMENT ";

/// Generator used in stub mode: reports what would have been sent to a model.
///
/// Keeps `ask` and `chat` usable without a running Ollama server.
#[derive(Debug, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl Generator for OfflineGenerator {
    async fn generate(&self, prompt: &str) -> docrag_search::Result<GenerationStream> {
        let fragments = prompt.matches(FRAGMENT_MARKER).count();
        Ok(GenerationStream::from_increments(vec![
            format!("Offline mode: {fragments} fragments retrieved. "),
            "Configure an Ollama backend to generate an answer.".to_string(),
        ]))
    }

    fn model_id(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_fragment_blocks() {
        let prompt = "intro\n[FRAGMENT 1]\nDocument: a\n---\n[FRAGMENT 2]\nDocument: b\n";
        let text = OfflineGenerator
            .generate(prompt)
            .await
            .unwrap()
            .collect_text()
            .await
            .unwrap();
        assert!(text.starts_with("Offline mode: 2 fragments retrieved."));
    }
}
