use async_trait::async_trait;
use docrag_search::{GenerationSink, GenerationStream, Generator, SearchError};
use docrag_vector_store::{Embedder, VectorStoreError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Increments buffered between the HTTP reader and the consumer
const STREAM_BUFFER: usize = 32;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One NDJSON line of a streamed `/api/generate` response
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Shared HTTP client for one Ollama server
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Embeddings from `/api/embeddings`
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> docrag_vector_store::Result<Vec<f32>> {
        let url = self.client.url("/api/embeddings");
        let response = self
            .client
            .client
            .post(&url)
            .timeout(self.client.request_timeout)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| VectorStoreError::EmbeddingError(format!("POST {url}: {e}")))?;

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::EmbeddingError(format!("Invalid embedding body: {e}")))?;
        if body.embedding.is_empty() {
            return Err(VectorStoreError::EmbeddingError(format!(
                "Model {} returned an empty embedding",
                self.model
            )));
        }
        Ok(body.embedding)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Streaming completions from `/api/generate`
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
}

impl OllamaGenerator {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> docrag_search::Result<GenerationStream> {
        let url = self.client.url("/api/generate");
        let response = self
            .client
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: true,
            })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SearchError::Generation(format!("POST {url}: {e}")))?;

        Ok(GenerationStream::spawn(STREAM_BUFFER, move |tx| {
            forward_ndjson(response, tx)
        }))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

async fn forward_ndjson(mut response: reqwest::Response, tx: GenerationSink) {
    let mut lines = LineBuffer::default();
    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                let _ = tx
                    .send(Err(SearchError::Generation(format!("Stream interrupted: {e}"))))
                    .await;
                return;
            }
        };
        for line in lines.push(&chunk) {
            if !forward_line(&line, &tx).await {
                return;
            }
        }
    }
    if let Some(line) = lines.finish() {
        forward_line(&line, &tx).await;
    }
}

/// Send one decoded line; false once the stream should stop
async fn forward_line(line: &str, tx: &GenerationSink) -> bool {
    match decode_line(line) {
        Ok(None) => true,
        Ok(Some(chunk)) => {
            if let Some(error) = chunk.error {
                let _ = tx.send(Err(SearchError::Generation(error))).await;
                return false;
            }
            if !chunk.response.is_empty() && tx.send(Ok(chunk.response)).await.is_err() {
                return false;
            }
            !chunk.done
        }
        Err(e) => {
            let _ = tx.send(Err(e)).await;
            false
        }
    }
}

/// Parse one NDJSON line; blank lines yield nothing
pub fn decode_line(line: &str) -> docrag_search::Result<Option<GenerateChunk>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| SearchError::Generation(format!("Invalid stream line: {e}")))
}

/// Splits a byte stream into complete lines, keeping the unfinished tail
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    pub fn finish(self) -> Option<String> {
        (!self.pending.is_empty()).then(|| String::from_utf8_lossy(&self.pending).into_owned())
    }
}
