//! The four-step pipeline: load, split, embed/index, retrieve + generate.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::config::{PipelineConfig, PromptSpec};
use crate::embeddings::{EmbeddingProvider, openai_embeddings};
use crate::generation::{ChatModel, openai_chat};
use crate::index::{ScoredChunk, VectorIndex};
use crate::ingestion::{TextSplitter, load_document};
use crate::prompt::{PromptTemplate, fetch_template};
use crate::types::RagError;

/// Retrieval-augmented question answering over one fixed web document.
///
/// The vector index and the prompt template are resolved lazily on the first
/// call to [`answer`](Self::answer) and cached for the lifetime of the
/// pipeline value; a fresh pipeline rebuilds both from scratch.
pub struct RagPipeline {
    config: PipelineConfig,
    http: Client,
    embedder: Arc<dyn EmbeddingProvider>,
    chat: Arc<dyn ChatModel>,
    index: OnceCell<VectorIndex>,
    template: OnceCell<PromptTemplate>,
}

impl RagPipeline {
    /// Wires a pipeline with explicit provider implementations.
    pub fn new(
        config: PipelineConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatModel>,
    ) -> Result<Self, RagError> {
        config.validate()?;
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .use_rustls_tls()
            .build()?;
        Ok(Self {
            config,
            http,
            embedder,
            chat,
            index: OnceCell::new(),
            template: OnceCell::new(),
        })
    }

    /// Wires a pipeline against the hosted OpenAI embedding and chat models
    /// named in `config`.
    pub fn from_config(config: PipelineConfig) -> Result<Self, RagError> {
        let embedder = openai_embeddings(&config.api_key, &config.embedding_model)?;
        let chat = openai_chat(&config.api_key, &config.chat_model, config.temperature)?;
        Self::new(config, embedder, chat)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answers `question` from the source document.
    ///
    /// An empty question still drives the full sequence; the model is asked
    /// to answer an empty question over the retrieved context.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let template = self
            .template
            .get_or_try_init(|| self.resolve_template())
            .await?;
        let index = self.index.get_or_try_init(|| self.build_index()).await?;

        let query = self.embedder.embed_query(question).await?;
        let hits = index.top_k(&query, self.config.top_k)?;
        debug!(
            hits = hits.len(),
            top_score = hits.first().map(|hit| f64::from(hit.score)),
            "retrieved context chunks"
        );

        let context = format_context(&hits);
        let prompt = template.render(&context, question);
        let answer = self.chat.generate(&prompt).await?;
        info!(
            model = self.chat.id(),
            answer_bytes = answer.len(),
            "generated answer"
        );
        Ok(answer)
    }

    async fn resolve_template(&self) -> Result<PromptTemplate, RagError> {
        match &self.config.prompt {
            PromptSpec::Inline(text) => PromptTemplate::new(text.clone()),
            PromptSpec::Registry { base_url, id } => {
                fetch_template(&self.http, base_url, id).await
            }
        }
    }

    async fn build_index(&self) -> Result<VectorIndex, RagError> {
        let document = load_document(
            &self.http,
            &self.config.source_url,
            &self.config.content_classes,
        )
        .await?;

        let splitter = TextSplitter::new(self.config.chunk_size, self.config.chunk_overlap)?;
        let chunks = splitter.split(&document);
        if chunks.is_empty() {
            return Err(RagError::Chunking(
                "source document produced no chunks".to_string(),
            ));
        }
        info!(
            chunks = chunks.len(),
            source = %document.source,
            embedder = self.embedder.id(),
            "split and embedding source document"
        );

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        VectorIndex::from_embedded(chunks, embeddings)
    }
}

/// Joins retrieved chunks with blank lines, best match first.
pub fn format_context(hits: &[ScoredChunk<'_>]) -> String {
    hits.iter()
        .map(|hit| hit.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
