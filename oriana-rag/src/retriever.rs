//! Similarity ranking over the knowledge store.

use tracing::debug;

use crate::config::RagConfig;
use crate::document::{Chunk, ScoredChunk};
use crate::error::{RagError, Result};
use crate::similarity::cosine_similarity;
use crate::store::KnowledgeStore;

/// Ranks stored chunks against a query vector.
///
/// Every chunk is scored with [`cosine_similarity`], the list is sorted by
/// descending score (ties keep insertion order), truncated to `top_k`, and
/// anything scoring below `similarity_threshold` is dropped. The threshold
/// favours answering "not trained on this" over answering from weak matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retriever {
    top_k: usize,
    similarity_threshold: f32,
}

impl Default for Retriever {
    fn default() -> Self {
        Self { top_k: 4, similarity_threshold: 0.45 }
    }
}

impl Retriever {
    pub fn new(top_k: usize, similarity_threshold: f32) -> Self {
        Self { top_k, similarity_threshold }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.top_k, config.similarity_threshold)
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    /// Return the most relevant chunks for `query`, best first.
    ///
    /// An empty store yields an empty result without scoring anything.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::KnowledgeStoreError`] if the query vector's
    /// dimensionality differs from the stored embeddings.
    pub async fn retrieve(&self, query: &[f32], store: &KnowledgeStore) -> Result<Vec<ScoredChunk>> {
        let results = store
            .with_chunks(|chunks| {
                let Some(first) = chunks.first() else {
                    return Ok(Vec::new());
                };

                let dimensions = first.embedding.len();
                if dimensions != query.len() {
                    return Err(RagError::KnowledgeStoreError(format!(
                        "query dimensionality {} does not match store dimensionality {dimensions}",
                        query.len()
                    )));
                }

                Ok(rank(query, chunks, self.top_k, self.similarity_threshold))
            })
            .await?;

        debug!(
            result_count = results.len(),
            top_score = results.first().map(|r| r.score),
            "retrieval completed"
        );
        Ok(results)
    }
}

/// Score, stable-sort, truncate to `top_k`, then filter by `threshold`.
///
/// All chunks must share the query's dimensionality. Only the kept chunks
/// are cloned into the result.
pub fn rank(query: &[f32], chunks: &[Chunk], top_k: usize, threshold: f32) -> Vec<ScoredChunk> {
    let mut scored: Vec<(usize, f32)> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| (index, cosine_similarity(query, &chunk.embedding)))
        .collect();

    // `sort_by` is stable, so equal scores keep insertion order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);
    scored
        .into_iter()
        .filter(|&(_, score)| score >= threshold)
        .map(|(index, score)| ScoredChunk { chunk: chunks[index].clone(), score })
        .collect()
}
