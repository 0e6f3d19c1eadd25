//! Shared error type for the question-answering pipeline.

use thiserror::Error;

/// Errors surfaced by pipeline stages.
///
/// Every stage returns a typed error instead of letting upstream failures
/// propagate as opaque faults; the invocation envelope itself defines no
/// error-status shape, so callers receive these through `Result`.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or missing configuration (credentials, chunking parameters).
    #[error("configuration error: {0}")]
    Config(String),

    /// Network failure while fetching the source page or a prompt template.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The fetched page could not be parsed or matched no content regions.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The splitter produced no usable chunks.
    #[error("chunking error: {0}")]
    Chunking(String),

    /// The embedding provider failed or returned malformed vectors.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Vector index construction or lookup failure.
    #[error("vector index error: {0}")]
    Index(String),

    /// Prompt template fetch, parse, or placeholder validation failure.
    #[error("prompt template error: {0}")]
    Prompt(String),

    /// The chat model failed or returned no text content.
    #[error("generation error: {0}")]
    Generation(String),

    /// Envelope serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
