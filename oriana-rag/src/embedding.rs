//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that turns text into a fixed-length vector.
///
/// Every invocation of [`embed`](EmbeddingProvider::embed) is a single call
/// to the external service; no retries are attempted. Chunk and query
/// embeddings are only comparable when they come from the same provider
/// configuration, so one instance should serve both ingestion and querying.
///
/// # Example
///
/// ```rust,ignore
/// use oriana_rag::EmbeddingProvider;
///
/// let provider = GeminiClient::new(GeminiConfig::from_env()?)?;
/// let embedding = provider.embed("hello world").await?;
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`](crate::RagError::EmbeddingError)
    /// when the service is unreachable, rejects the credential, or returns
    /// no vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Identifier of the embedding model behind this provider.
    fn model(&self) -> &str;
}
