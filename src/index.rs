//! Ephemeral in-memory vector index.
//!
//! Holds every chunk embedding for one pipeline instance and answers
//! nearest-neighbor lookups by cosine similarity. Nothing is persisted; the
//! index lives and dies with the pipeline that built it.

use std::cmp::Ordering;

use crate::ingestion::Chunk;
use crate::types::RagError;

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

#[derive(Debug, Clone)]
struct Entry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// In-process nearest-neighbor index over chunk embeddings.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<Entry>,
    dims: usize,
}

impl VectorIndex {
    /// Builds an index from chunks and their embeddings, in matching order.
    ///
    /// Every embedding must have the same non-zero dimension count.
    pub fn from_embedded(
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, RagError> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::Index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        let dims = embeddings.first().map(Vec::len).unwrap_or(0);
        if !embeddings.is_empty() && dims == 0 {
            return Err(RagError::Index("embeddings have zero dimensions".to_string()));
        }

        let mut entries = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if embedding.len() != dims {
                return Err(RagError::Index(format!(
                    "chunk {} has {} dimensions, expected {dims}",
                    chunk.index,
                    embedding.len()
                )));
            }
            entries.push(Entry { chunk, embedding });
        }
        Ok(Self { entries, dims })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Returns up to `k` chunks most similar to `query`, best first.
    ///
    /// Ties are broken by chunk index, so retrieval is deterministic for a
    /// given query vector and index contents.
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk<'_>>, RagError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dims {
            return Err(RagError::Index(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dims
            )));
        }

        let mut scored: Vec<ScoredChunk<'_>> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: &entry.chunk,
                score: cosine_similarity(query, &entry.embedding),
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.chunk.index.cmp(&b.chunk.index))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

/// Cosine similarity; 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chunk(index: usize, content: &str) -> Chunk {
        Chunk {
            id: Uuid::new_v4(),
            index,
            content: content.to_string(),
            source: "https://example.com/post/".to_string(),
        }
    }

    fn sample_index() -> VectorIndex {
        let chunks = vec![chunk(0, "north"), chunk(1, "east"), chunk(2, "diagonal")];
        let embeddings = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.7, 0.7],
        ];
        VectorIndex::from_embedded(chunks, embeddings).unwrap()
    }

    #[test]
    fn top_k_orders_by_similarity() {
        let index = sample_index();
        let hits = index.top_k(&[0.0, 1.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].chunk.content, "north");
        assert_eq!(hits[1].chunk.content, "diagonal");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn retrieval_is_deterministic() {
        let index = sample_index();
        let first: Vec<usize> = index
            .top_k(&[0.5, 0.5], 3)
            .unwrap()
            .iter()
            .map(|hit| hit.chunk.index)
            .collect();
        let second: Vec<usize> = index
            .top_k(&[0.5, 0.5], 3)
            .unwrap()
            .iter()
            .map(|hit| hit.chunk.index)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn ties_break_by_chunk_index() {
        let chunks = vec![chunk(0, "a"), chunk(1, "b")];
        let embeddings = vec![vec![1.0, 0.0], vec![1.0, 0.0]];
        let index = VectorIndex::from_embedded(chunks, embeddings).unwrap();
        let hits = index.top_k(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].chunk.index, 0);
        assert_eq!(hits[1].chunk.index, 1);
    }

    #[test]
    fn query_dimension_mismatch_is_an_error() {
        let index = sample_index();
        let err = index.top_k(&[1.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(err, RagError::Index(_)));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = VectorIndex::from_embedded(vec![chunk(0, "a")], vec![]).unwrap_err();
        assert!(matches!(err, RagError::Index(_)));
    }

    #[test]
    fn mixed_dimensions_are_rejected() {
        let err = VectorIndex::from_embedded(
            vec![chunk(0, "a"), chunk(1, "b")],
            vec![vec![1.0, 0.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, RagError::Index(_)));
    }

    #[test]
    fn zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn empty_index_returns_no_hits() {
        let index = VectorIndex::default();
        assert!(index.top_k(&[1.0], 3).unwrap().is_empty());
    }
}
