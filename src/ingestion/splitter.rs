//! Fixed-size overlapping text chunker.

use uuid::Uuid;

use super::fetch::Document;
use crate::types::RagError;

/// One bounded-length window over the source document.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub id: Uuid,
    /// Zero-based position of this chunk within the document.
    pub index: usize,
    pub content: String,
    /// URL of the document this chunk came from.
    pub source: String,
}

/// Splits text into windows of at most `chunk_size` characters, adjacent
/// windows sharing exactly `chunk_overlap` characters.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::Chunking("chunk_size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Chunking(format!(
                "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Produces the chunk windows for `document`.
    ///
    /// Windows advance by `chunk_size - chunk_overlap` characters, so every
    /// adjacent pair overlaps by exactly `chunk_overlap` characters; only the
    /// final window may be shorter than `chunk_size`. Offsets are counted in
    /// `char`s, never splitting a code point. An empty document yields no
    /// chunks.
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        let text = document.content.as_str();
        let offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        let total = offsets.len();
        if total == 0 {
            return Vec::new();
        }

        let step = self.chunk_size - self.chunk_overlap;
        let source = document.source.to_string();
        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(total);
            let byte_start = offsets[start];
            let byte_end = if end == total { text.len() } else { offsets[end] };
            chunks.push(Chunk {
                id: Uuid::new_v4(),
                index: chunks.len(),
                content: text[byte_start..byte_end].to_string(),
                source: source.clone(),
            });
            if end == total {
                break;
            }
            start += step;
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn document(content: &str) -> Document {
        Document {
            source: Url::parse("https://example.com/post/").unwrap(),
            content: content.to_string(),
        }
    }

    fn cyclic_text(len: usize) -> String {
        "abcdefghij".chars().cycle().take(len).collect()
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let splitter = TextSplitter::new(1000, 200).unwrap();
        let doc = document(&cyclic_text(2500));
        let chunks = splitter.split(&doc);

        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.content.chars().count() <= 1000);
        }
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].content.chars().collect();
            let tail: String = prev[prev.len() - 200..].iter().collect();
            let head: String = pair[1].content.chars().take(200).collect();
            assert_eq!(tail, head, "adjacent chunks must share exactly 200 chars");
        }
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let splitter = TextSplitter::new(100, 20).unwrap();
        let doc = document(&cyclic_text(450));
        let chunks = splitter.split(&doc);
        for (expected, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, expected);
        }
    }

    #[test]
    fn short_document_is_a_single_chunk() {
        let splitter = TextSplitter::new(1000, 200).unwrap();
        let doc = document("short text");
        let chunks = splitter.split(&doc);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short text");
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let splitter = TextSplitter::new(1000, 200).unwrap();
        assert!(splitter.split(&document("")).is_empty());
    }

    #[test]
    fn splits_on_char_boundaries() {
        let splitter = TextSplitter::new(4, 1).unwrap();
        let doc = document("αβγδεζηθ");
        let chunks = splitter.split(&doc);
        assert!(!chunks.is_empty());
        let reassembled: String = chunks[0].content.chars().collect();
        assert_eq!(reassembled.chars().count(), 4);
    }

    #[test]
    fn windows_cover_the_whole_document() {
        let splitter = TextSplitter::new(100, 20).unwrap();
        let text = cyclic_text(777);
        let doc = document(&text);
        let chunks = splitter.split(&doc);

        let mut rebuilt = chunks[0].content.clone();
        for chunk in &chunks[1..] {
            let fresh: String = chunk.content.chars().skip(20).collect();
            rebuilt.push_str(&fresh);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn overlap_must_be_smaller_than_size() {
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
    }
}
