//! Turning the source page into chunks ready for embedding.
//!
//! * [`fetch`]: network fetch plus class-restricted HTML text extraction.
//! * [`splitter`]: fixed-size overlapping character windows.

pub mod fetch;
pub mod splitter;

pub use fetch::{Document, extract_content, fetch_page, load_document};
pub use splitter::{Chunk, TextSplitter};
