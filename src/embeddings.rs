//! Embedding provider seam.
//!
//! [`EmbeddingProvider`] is the substitution point for the hosted embedding
//! API: production code adapts a rig-core [`EmbeddingModel`], tests use the
//! deterministic [`MockEmbeddingProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use rig::client::EmbeddingsClient;
use rig::embeddings::embedding::EmbeddingModel;
use rig::providers::openai;

use crate::types::RagError;

/// Text-to-vector service used for both chunk and query embeddings.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Identifier used in logs and telemetry.
    fn id(&self) -> &str;

    /// Embeds a batch of texts, one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// Embeds a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("provider returned no vector for query".to_string()))
    }
}

/// Adapter from any rig-core [`EmbeddingModel`] to [`EmbeddingProvider`].
///
/// Requests are issued in windows of the model's `MAX_DOCUMENTS` so oversized
/// batches never reach the provider.
#[derive(Clone)]
pub struct RigEmbeddingProvider<E> {
    model: E,
    id: String,
}

impl<E> RigEmbeddingProvider<E>
where
    E: EmbeddingModel,
{
    pub fn new(model: E, id: impl Into<String>) -> Self {
        Self {
            model,
            id: id.into(),
        }
    }
}

#[async_trait]
impl<E> EmbeddingProvider for RigEmbeddingProvider<E>
where
    E: EmbeddingModel + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for window in texts.chunks(E::MAX_DOCUMENTS.max(1)) {
            let embeddings = self
                .model
                .embed_texts(window.to_vec())
                .await
                .map_err(|err| RagError::Embedding(err.to_string()))?;
            vectors.extend(embeddings.into_iter().map(|embedding| {
                embedding
                    .vec
                    .into_iter()
                    .map(|value| value as f32)
                    .collect::<Vec<f32>>()
            }));
        }
        if vectors.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "provider returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }
}

/// OpenAI-backed provider for the given model name.
pub fn openai_embeddings(
    api_key: &str,
    model: &str,
) -> Result<Arc<dyn EmbeddingProvider>, RagError> {
    let client: openai::Client = openai::Client::new(api_key)
        .map_err(|err| RagError::Config(format!("failed to build OpenAI client: {err}")))?;
    Ok(Arc::new(RigEmbeddingProvider::new(
        client.embedding_model(model),
        model,
    )))
}

/// Deterministic hash-derived embeddings for tests and offline runs.
///
/// The same text always produces the same vector; distinct texts almost
/// always differ.
#[derive(Debug, Clone)]
pub struct MockEmbeddingProvider {
    dims: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dims: 8 }
    }

    pub fn with_dims(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn id(&self) -> &str {
        "mock"
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts
            .iter()
            .map(|text| hash_to_vec(text, self.dims))
            .collect())
    }
}

fn hash_to_vec(text: &str, dims: usize) -> Vec<f32> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    let seed = hasher.finish();
    (0..dims)
        .map(|i| {
            let bits = seed.rotate_left((i * 8) as u32) ^ ((i as u64) << 24);
            (bits as f32) / u32::MAX as f32
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let provider = MockEmbeddingProvider::new();
        let inputs = vec![
            "Hello world".to_string(),
            "Goodbye world".to_string(),
            "Hello world".to_string(),
        ];

        let first = provider.embed_batch(&inputs).await.unwrap();
        let second = provider.embed_batch(&inputs).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], first[2]);
        assert_ne!(first[0], first[1]);
    }

    #[tokio::test]
    async fn query_embedding_matches_batch_embedding() {
        let provider = MockEmbeddingProvider::new();
        let batch = provider
            .embed_batch(&["sample text".to_string()])
            .await
            .unwrap();
        let query = provider.embed_query("sample text").await.unwrap();
        assert_eq!(batch[0], query);
    }

    #[test]
    fn openai_provider_constructs_and_reports_model_id() {
        let provider = openai_embeddings("sk-test", "text-embedding-ada-002").unwrap();
        assert_eq!(provider.id(), "text-embedding-ada-002");
    }

    #[tokio::test]
    async fn vectors_have_requested_dimensions() {
        let provider = MockEmbeddingProvider::with_dims(16);
        let vectors = provider.embed_batch(&["x".to_string()]).await.unwrap();
        assert_eq!(vectors[0].len(), 16);
    }
}
