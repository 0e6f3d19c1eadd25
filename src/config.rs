//! Explicit pipeline configuration.
//!
//! All knobs the pipeline needs, the API credential included, travel in a
//! [`PipelineConfig`] value handed to the pipeline constructor. Nothing is
//! read from ambient process state at use time; [`PipelineConfig::from_env`]
//! exists as an explicit, fallible entry point for binaries.

use url::Url;

use crate::prompt;
use crate::types::RagError;

/// Blog post the pipeline answers questions about by default.
pub const DEFAULT_SOURCE_URL: &str = "https://lilianweng.github.io/posts/2023-06-23-agent/";

/// CSS classes whose elements make up the post body.
pub const DEFAULT_CONTENT_CLASSES: [&str; 3] = ["post-content", "post-title", "post-header"];

/// Registry identifier of the default RAG prompt.
pub const DEFAULT_PROMPT_ID: &str = "rlm/rag-prompt";

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_USER_AGENT: &str = concat!("ragpost/", env!("CARGO_PKG_VERSION"));

/// Where the prompt template comes from.
#[derive(Debug, Clone)]
pub enum PromptSpec {
    /// Pull the template by identifier from a remote registry over HTTP.
    Registry { base_url: Url, id: String },
    /// Use the given template text as-is.
    Inline(String),
}

impl Default for PromptSpec {
    fn default() -> Self {
        Self::Inline(prompt::DEFAULT_TEMPLATE.to_string())
    }
}

/// Configuration for a [`RagPipeline`](crate::pipeline::RagPipeline).
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Credential for the hosted embedding and chat APIs.
    pub api_key: String,
    /// The single document the pipeline answers questions about.
    pub source_url: Url,
    /// CSS classes selecting the content regions to extract.
    pub content_classes: Vec<String>,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared between adjacent chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Hosted embedding model name.
    pub embedding_model: String,
    /// Hosted chat model name.
    pub chat_model: String,
    /// Sampling temperature for generation.
    pub temperature: f64,
    /// Prompt template source.
    pub prompt: PromptSpec,
    /// User agent sent with page and registry fetches.
    pub user_agent: String,
}

impl PipelineConfig {
    /// Start building a configuration from the one value without a default.
    pub fn builder(api_key: impl Into<String>) -> PipelineConfigBuilder {
        PipelineConfigBuilder::new(api_key)
    }

    /// Build a configuration from the process environment.
    ///
    /// Loads `.env` if present, then requires `OPENAI_API_KEY` and honors the
    /// optional `RAGPOST_*` overrides. Fails with [`RagError::Config`] when
    /// the credential is absent, before any network activity.
    pub fn from_env() -> Result<Self, RagError> {
        dotenvy::dotenv().ok();
        Self::from_env_source(|key| std::env::var(key).ok())
    }

    /// Environment-reading core of [`from_env`](Self::from_env), generic
    /// over the variable source so it can be exercised without touching
    /// process state.
    pub fn from_env_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RagError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| RagError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let mut builder = Self::builder(api_key);
        if let Some(raw) = lookup("RAGPOST_SOURCE_URL") {
            builder = builder.source_url_str(&raw)?;
        }
        if let Some(model) = lookup("RAGPOST_EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Some(model) = lookup("RAGPOST_CHAT_MODEL") {
            builder = builder.chat_model(model);
        }
        if let Some(registry) = lookup("RAGPOST_PROMPT_REGISTRY") {
            let id = lookup("RAGPOST_PROMPT_ID").unwrap_or_else(|| DEFAULT_PROMPT_ID.to_string());
            builder = builder.prompt_registry_str(&registry, id)?;
        }
        builder.build()
    }

    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.api_key.trim().is_empty() {
            return Err(RagError::Config("api_key must not be empty".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be positive".to_string()));
        }
        if self.content_classes.is_empty() {
            return Err(RagError::Config(
                "at least one content class is required".to_string(),
            ));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(RagError::Config(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    api_key: String,
    source_url: Option<Url>,
    content_classes: Vec<String>,
    chunk_size: usize,
    chunk_overlap: usize,
    top_k: usize,
    embedding_model: String,
    chat_model: String,
    temperature: f64,
    prompt: PromptSpec,
    user_agent: String,
}

impl PipelineConfigBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            source_url: None,
            content_classes: DEFAULT_CONTENT_CLASSES
                .iter()
                .map(|class| (*class).to_string())
                .collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.0,
            prompt: PromptSpec::default(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    #[must_use]
    pub fn source_url(mut self, url: Url) -> Self {
        self.source_url = Some(url);
        self
    }

    pub fn source_url_str(self, raw: &str) -> Result<Self, RagError> {
        let url = Url::parse(raw)
            .map_err(|err| RagError::Config(format!("invalid source URL '{raw}': {err}")))?;
        Ok(self.source_url(url))
    }

    #[must_use]
    pub fn content_classes<I, S>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    #[must_use]
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.chunk_overlap = overlap;
        self
    }

    #[must_use]
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[must_use]
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    #[must_use]
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.chat_model = model.into();
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: PromptSpec) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn prompt_registry_str(self, base_url: &str, id: impl Into<String>) -> Result<Self, RagError> {
        let base_url = Url::parse(base_url).map_err(|err| {
            RagError::Config(format!("invalid prompt registry URL '{base_url}': {err}"))
        })?;
        Ok(self.prompt(PromptSpec::Registry {
            base_url,
            id: id.into(),
        }))
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Result<PipelineConfig, RagError> {
        let source_url = match self.source_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_SOURCE_URL)
                .map_err(|err| RagError::Config(format!("invalid default source URL: {err}")))?,
        };
        let config = PipelineConfig {
            api_key: self.api_key,
            source_url,
            content_classes: self.content_classes,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
            embedding_model: self.embedding_model,
            chat_model: self.chat_model,
            temperature: self.temperature,
            prompt: self.prompt,
            user_agent: self.user_agent,
        };
        config.validate()?;
        Ok(config)
    }
}
