//! Data types for chunks, retrieval results and ingestion records.

use serde::{Deserialize, Serialize};

/// A window of an uploaded document together with its vector embedding.
///
/// Chunks are created once during ingestion and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// Name of the file this chunk was cut from.
    pub source_file: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Create a chunk with a freshly generated identifier.
    pub fn new(source_file: impl Into<String>, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_file: source_file.into(),
            text: text.into(),
            embedding,
        }
    }
}

/// A retrieved [`Chunk`] paired with its relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query, conceptually in `[-1, 1]`.
    pub score: f32,
}

/// Display metadata for a file that went through ingestion.
///
/// This does not own chunk data; `chunks_count` is the number of chunks that
/// were embedded and stored successfully.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRecord {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub processed: bool,
    pub chunks_count: usize,
}

/// Read-only view of the knowledge store for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct KnowledgeSnapshot {
    /// Total number of chunks held.
    pub total_chunks: usize,
    /// Chunk count per source file, in the order files were first seen.
    pub files: Vec<(String, usize)>,
}
