//! Retrieval-augmented question answering over a single web document.
//!
//! ```text
//! PipelineConfig ──► RagPipeline
//!
//! ingestion::fetch ──► Document ──► ingestion::splitter ──► Vec<Chunk>
//!                                                 │
//!                                                 ▼
//!                       embeddings::EmbeddingProvider ──► index::VectorIndex
//!
//! question ──► embed_query ──► VectorIndex::top_k ──► prompt::PromptTemplate
//!                                                 │
//!                                                 ▼
//!                        generation::ChatModel ──► handler::QuestionResponse
//! ```
//!
//! Every external collaborator (the page fetch, the embedding API, the
//! prompt registry, the chat model) sits behind a typed seam so each stage
//! can be substituted with a deterministic fake in tests.

pub mod config;
pub mod embeddings;
pub mod generation;
pub mod handler;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod prompt;
pub mod types;

pub use config::{PipelineConfig, PromptSpec};
pub use handler::{QuestionEvent, QuestionResponse, handle};
pub use pipeline::RagPipeline;
pub use types::RagError;
