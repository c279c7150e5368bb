//! Error types for the `oriana-rag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval and answering pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// Missing or invalid configuration, including an absent API credential.
    ///
    /// Raised before any network call is attempted.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The embedding service failed or returned no vector.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation service call itself failed (network, auth, bad status).
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A file could not be read or contained no text.
    #[error("Ingestion error ({file}): {message}")]
    IngestionError {
        /// Name of the file being ingested.
        file: String,
        /// A description of the failure.
        message: String,
    },

    /// The knowledge store rejected a write.
    #[error("Knowledge store error: {0}")]
    KnowledgeStoreError(String),

    /// Admin credentials were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
