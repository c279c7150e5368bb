//! Grounded answer generation.
//!
//! The [`AnswerGenerator`] runs the query half of the pipeline:
//! embed the question, retrieve context from the [`KnowledgeStore`], and ask
//! a [`GenerationProvider`] to answer from that context only.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oriana_rag::{AnswerGenerator, GeminiClient, GeminiConfig, KnowledgeStore, RagConfig};
//!
//! let client = Arc::new(GeminiClient::new(GeminiConfig::from_env()?)?);
//! let generator = AnswerGenerator::new(RagConfig::default(), client.clone(), client);
//! let reply = generator.answer("What gold purity does Oriana offer?", &store).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::prompt::{
    EMPTY_RESPONSE_APOLOGY, NO_KNOWLEDGE_MESSAGE, SYSTEM_INSTRUCTION, build_context,
    build_user_content,
};
use crate::retriever::Retriever;
use crate::store::KnowledgeStore;

/// A single-turn request to a text generation model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// Model the request targets, as reported by the provider.
    pub model: String,
    pub system_instruction: String,
    pub user_content: String,
    pub temperature: f32,
}

/// A text generation backend.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Run one generation call.
    ///
    /// Returns `Ok(None)` when the service answered without text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationError`] when the call itself fails.
    async fn generate(&self, request: GenerationRequest) -> Result<Option<String>>;

    /// Identifier of the generation model behind this provider.
    fn model(&self) -> &str;
}

/// Answers customer questions from the knowledge store.
pub struct AnswerGenerator {
    config: RagConfig,
    retriever: Retriever,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generation_provider: Arc<dyn GenerationProvider>,
}

impl AnswerGenerator {
    pub fn new(
        config: RagConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        generation_provider: Arc<dyn GenerationProvider>,
    ) -> Self {
        let retriever = Retriever::from_config(&config);
        Self { config, retriever, embedding_provider, generation_provider }
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Build the generation request for `query` given a context block.
    pub fn build_request(&self, query: &str, context: &str) -> GenerationRequest {
        GenerationRequest {
            model: self.generation_provider.model().to_string(),
            system_instruction: SYSTEM_INSTRUCTION.to_string(),
            user_content: build_user_content(context, query),
            temperature: self.config.temperature,
        }
    }

    /// Answer `query` using only chunks retrieved from `store`.
    ///
    /// With an empty store this returns [`NO_KNOWLEDGE_MESSAGE`] without
    /// calling either external service. When no chunk passes the similarity
    /// threshold the request still goes out with an empty context block and
    /// the system instruction directs the model to the out-of-scope sentence.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if the question cannot be
    /// embedded and [`RagError::GenerationError`] if the generation call
    /// fails. The store is never modified.
    pub async fn answer(&self, query: &str, store: &KnowledgeStore) -> Result<String> {
        if store.is_empty().await {
            info!("query received with empty knowledge base");
            return Ok(NO_KNOWLEDGE_MESSAGE.to_string());
        }

        // 1. Embed the query
        let query_embedding = self
            .embedding_provider
            .embed(query)
            .await
            .inspect_err(|e| error!(error = %e, "embedding failed during query"))?;

        // 2. Rank stored chunks
        let results = self
            .retriever
            .retrieve(&query_embedding, store)
            .await
            .inspect_err(|e| error!(error = %e, "retrieval failed"))?;
        info!(context_chunks = results.len(), "retrieved context");

        // 3. Assemble the grounded prompt
        let context = build_context(&results);
        let request = self.build_request(query, &context);

        // 4. Generate
        let text = self.generation_provider.generate(request).await.map_err(|e| {
            error!(model = self.generation_provider.model(), error = %e, "generation failed");
            match e {
                RagError::GenerationError { .. } => e,
                other => RagError::GenerationError {
                    provider: self.generation_provider.model().to_string(),
                    message: other.to_string(),
                },
            }
        })?;

        Ok(match text {
            Some(text) if !text.trim().is_empty() => text,
            _ => EMPTY_RESPONSE_APOLOGY.to_string(),
        })
    }
}
