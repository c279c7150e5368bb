//! In-memory knowledge store.
//!
//! This module provides [`KnowledgeStore`], an append-only, insertion-ordered
//! list of embedded chunks behind a `tokio::sync::RwLock`. Retrieval scans the
//! whole list, which is adequate for the small corpora a support widget holds.
//! An indexed backend can replace the `Vec` without changing
//! [`append`](KnowledgeStore::append) or [`all`](KnowledgeStore::all).

use tokio::sync::RwLock;

use crate::document::{Chunk, KnowledgeSnapshot};
use crate::error::{RagError, Result};

/// Append-only collection of embedded chunks.
///
/// Each chunk is pushed under one write lock, so concurrent readers never see
/// a partially appended chunk.
///
/// # Example
///
/// ```rust,ignore
/// use oriana_rag::{Chunk, KnowledgeStore};
///
/// let store = KnowledgeStore::new();
/// store.append(Chunk::new("faq.txt", "text", vec![0.1, 0.2])).await?;
/// assert_eq!(store.len().await, 1);
/// ```
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    chunks: RwLock<Vec<Chunk>>,
}

impl KnowledgeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk at the end of the store.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::KnowledgeStoreError`] if the chunk has an empty
    /// embedding or its dimensionality differs from the chunks already held.
    pub async fn append(&self, chunk: Chunk) -> Result<()> {
        if chunk.embedding.is_empty() {
            return Err(RagError::KnowledgeStoreError(format!(
                "chunk '{}' has an empty embedding",
                chunk.id
            )));
        }

        let mut chunks = self.chunks.write().await;
        if let Some(first) = chunks.first() {
            if first.embedding.len() != chunk.embedding.len() {
                return Err(RagError::KnowledgeStoreError(format!(
                    "embedding dimensionality {} does not match store dimensionality {}",
                    chunk.embedding.len(),
                    first.embedding.len()
                )));
            }
        }
        chunks.push(chunk);
        Ok(())
    }

    /// Return every chunk in insertion order.
    pub async fn all(&self) -> Vec<Chunk> {
        self.chunks.read().await.clone()
    }

    /// Run `f` over the stored chunks under the read lock.
    pub async fn with_chunks<R>(&self, f: impl FnOnce(&[Chunk]) -> R) -> R {
        let chunks = self.chunks.read().await;
        f(&chunks)
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    /// Dimensionality shared by all stored embeddings, if any chunk is held.
    pub async fn dimensions(&self) -> Option<usize> {
        self.chunks.read().await.first().map(|c| c.embedding.len())
    }

    /// Summarise the store for display: total chunks and per-file counts.
    pub async fn snapshot(&self) -> KnowledgeSnapshot {
        let chunks = self.chunks.read().await;
        let mut files: Vec<(String, usize)> = Vec::new();
        for chunk in chunks.iter() {
            match files.iter_mut().find(|(name, _)| *name == chunk.source_file) {
                Some((_, count)) => *count += 1,
                None => files.push((chunk.source_file.clone(), 1)),
            }
        }
        KnowledgeSnapshot { total_chunks: chunks.len(), files }
    }
}
