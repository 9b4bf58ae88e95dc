use crate::error::Result;
use async_trait::async_trait;
use ndarray::ArrayView1;

/// Text embedding backend
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts, in order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Identifier of the model behind the vectors
    fn model_id(&self) -> &str;
}

/// Deterministic feature-hashing embedder.
///
/// Every lowercase alphanumeric token is hashed (FNV-1a) into a signed bucket,
/// so texts sharing vocabulary land close to each other. Needs no model files,
/// which makes it the offline backend for tests and the `stub` mode.
#[derive(Clone, Debug)]
pub struct HashingEmbedder {
    dimension: usize,
    model_id: String,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl HashingEmbedder {
    /// The model id carries the dimension, so stores built at another size are refused on load
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model_id: format!("hashing-{dimension}"),
        }
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    #[must_use]
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimension];
        let mut tokens = 0usize;

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = fnv1a_64(token.to_lowercase().as_bytes());
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
            tokens += 1;
        }

        if tokens == 0 {
            return noise_embed(text, self.dimension);
        }

        normalize(&mut vec);
        vec
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Cosine similarity of two equally sized vectors (0.0 on zero norm or size mismatch)
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    a.dot(&b) / (norm_a * norm_b)
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}

// Pseudo-random unit vector seeded by the text, for inputs without any token.
fn noise_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        let embedder = HashingEmbedder::new(64);
        assert_eq!(
            embedder.embed_sync("scaled dot-product attention"),
            embedder.embed_sync("scaled dot-product attention")
        );
    }

    #[test]
    fn shared_vocabulary_is_closer() {
        let embedder = HashingEmbedder::default();
        let query = embedder.embed_sync("encoder decoder attention");
        let related = embedder.embed_sync("the encoder and the decoder both use attention layers");
        let unrelated = embedder.embed_sync("quarterly revenue grew in every region");

        assert!(
            cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated),
            "related text should be closer"
        );
    }

    #[test]
    fn model_id_names_the_dimension() {
        assert_eq!(HashingEmbedder::default().model_id(), "hashing-384");
        assert_eq!(HashingEmbedder::new(0).model_id(), "hashing-1");
    }

    #[test]
    fn case_does_not_change_the_vector() {
        let embedder = HashingEmbedder::new(32);
        assert_eq!(embedder.embed_sync("Transformer"), embedder.embed_sync("transformer"));
    }

    #[test]
    fn punctuation_only_text_still_has_unit_norm() {
        let embedder = HashingEmbedder::new(16);
        let vector = embedder.embed_sync("?!");
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn cosine_handles_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn batch_matches_single_calls() {
        let embedder = HashingEmbedder::new(48);
        let batch = embedder.embed_batch(&["query", "key value"]).await.unwrap();
        assert_eq!(batch[0], embedder.embed("query").await.unwrap());
        assert_eq!(batch[1], embedder.embed("key value").await.unwrap());
    }
}
