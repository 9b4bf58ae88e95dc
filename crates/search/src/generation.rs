use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Text-generation backend
#[async_trait]
pub trait Generator: Send + Sync {
    /// Start generating a response for `prompt`
    async fn generate(&self, prompt: &str) -> Result<GenerationStream>;

    fn model_id(&self) -> &str;
}

/// Lazy, finite sequence of response increments.
///
/// Not restartable. Dropping the stream aborts the producing task, which
/// closes the underlying request.
pub struct GenerationStream {
    rx: mpsc::Receiver<Result<String>>,
    producer: Option<JoinHandle<()>>,
}

/// Sending half handed to a producer task
pub type GenerationSink = mpsc::Sender<Result<String>>;

impl GenerationStream {
    /// Spawn `produce` with a sink; the stream ends when the sink is dropped
    pub fn spawn<F, Fut>(buffer: usize, produce: F) -> Self
    where
        F: FnOnce(GenerationSink) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let producer = tokio::spawn(produce(tx));
        Self {
            rx,
            producer: Some(producer),
        }
    }

    /// Stream over already available text, one increment per item
    pub fn from_increments<I>(increments: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let increments: Vec<String> = increments.into_iter().collect();
        let (tx, rx) = mpsc::channel(increments.len().max(1));
        for increment in increments {
            // Capacity covers every item.
            let _ = tx.try_send(Ok(increment));
        }
        Self { rx, producer: None }
    }

    /// Next increment, `None` once the response is complete
    pub async fn next(&mut self) -> Option<Result<String>> {
        self.rx.recv().await
    }

    /// Drain the stream into one string, stopping at the first error
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(increment) = self.next().await {
            text.push_str(&increment?);
        }
        Ok(text)
    }
}

impl Drop for GenerationStream {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}

impl std::fmt::Debug for GenerationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationStream")
            .field("has_producer", &self.producer.is_some())
            .finish()
    }
}
