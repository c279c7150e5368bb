//! # oriana-rag
//!
//! Retrieval-augmented answering for the Oriana customer-support assistant.
//!
//! ## Overview
//!
//! Admin-uploaded documents are split into overlapping windows, embedded
//! through an external embedding service and kept in an in-memory,
//! append-only [`KnowledgeStore`]. Customer questions are embedded with the
//! same model, ranked against the store by cosine similarity, and the best
//! matches above a threshold are handed to a generation model together with a
//! strict context-only [`SYSTEM_INSTRUCTION`].
//!
//! - [`IngestionPipeline`] - read → chunk → embed → store
//! - [`Retriever`] - linear-scan top-k ranking with a relevance threshold
//! - [`AnswerGenerator`] - grounded prompt assembly and generation
//! - [`ChatSession`] - customer-facing transcript with fixed fallback replies
//! - [`GeminiClient`] - Gemini REST client (feature `gemini`, on by default)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oriana_rag::*;
//!
//! let config = RagConfig::default();
//! let client = Arc::new(GeminiClient::new(GeminiConfig::from_env()?)?);
//! let store = Arc::new(KnowledgeStore::new());
//!
//! let admin = SharedSecretAuthenticator::new("Admin", "secret")?
//!     .authenticate("Admin", "secret")
//!     .await?;
//! let ingestion = IngestionPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(client.clone())
//!     .store(store.clone())
//!     .build()?;
//! ingestion.ingest_file(&admin, "catalogue.txt", &|_| {}).await?;
//!
//! let generator = AnswerGenerator::new(config, client.clone(), client);
//! let answer = generator.answer("What gold purity does Oriana offer?", &store).await?;
//! ```

pub mod auth;
pub mod chat;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod generation;
pub mod ingestion;
pub mod prompt;
pub mod retriever;
pub mod similarity;
pub mod store;

pub use auth::{AdminSession, Authenticator, SharedSecretAuthenticator};
pub use chat::{ChatMessage, ChatSession, Role};
pub use chunking::{Chunker, FixedSizeChunker, chunk_text};
pub use config::{GeminiConfig, RagConfig, RagConfigBuilder};
pub use document::{Chunk, FileRecord, KnowledgeSnapshot, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;
pub use generation::{AnswerGenerator, GenerationProvider, GenerationRequest};
pub use ingestion::{IngestProgress, IngestionPipeline, IngestionPipelineBuilder};
pub use prompt::{
    EMPTY_RESPONSE_APOLOGY, GENERIC_FAILURE_MESSAGE, NO_KNOWLEDGE_MESSAGE, NOT_CONFIGURED_MESSAGE,
    OUT_OF_SCOPE_MESSAGE, SYSTEM_INSTRUCTION, WELCOME_MESSAGE,
};
pub use retriever::Retriever;
pub use similarity::cosine_similarity;
pub use store::KnowledgeStore;
