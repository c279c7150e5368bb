//! Configuration for the retrieval pipeline and the Gemini client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for chunking, retrieval and generation.
///
/// The defaults (500/50 character windows, top 4 results, 0.45 similarity
/// threshold, temperature 0.3) are reasonable starting points rather than
/// tuned values; all of them can be overridden through [`RagConfig::builder`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results kept from the similarity ranking.
    pub top_k: usize,
    /// Minimum similarity score for results (results below this are filtered out).
    pub similarity_threshold: f32,
    /// Sampling temperature sent with every generation request.
    pub temperature: f32,
    /// Pause between successive chunk embeddings during ingestion.
    pub embed_delay: Duration,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 4,
            similarity_threshold: 0.45,
            temperature: 0.3,
            embed_delay: Duration::from_millis(100),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results kept from the ranking.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum similarity threshold for filtering results.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the generation temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the pause between chunk embeddings during ingestion.
    pub fn embed_delay(mut self, delay: Duration) -> Self {
        self.config.embed_delay = delay;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `similarity_threshold` is outside `[-1, 1]`
    /// - `temperature` is outside `[0, 2]`
    pub fn build(self) -> Result<RagConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if !(-1.0..=1.0).contains(&self.config.similarity_threshold) {
            return Err(RagError::ConfigError(format!(
                "similarity_threshold ({}) must be within [-1, 1]",
                self.config.similarity_threshold
            )));
        }
        if !(0.0..=2.0).contains(&self.config.temperature) {
            return Err(RagError::ConfigError(format!(
                "temperature ({}) must be within [0, 2]",
                self.config.temperature
            )));
        }
        Ok(self.config)
    }
}

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Fallback environment variable for the Gemini API key.
pub const API_KEY_ENV_FALLBACK: &str = "GEMINI_API_KEY";

/// Connection settings for the Gemini REST API.
///
/// Both the embedding and the generation client are built from one of these,
/// so chunk and query vectors always come from the same embedding model.
#[derive(Debug, Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub embedding_model: String,
    pub generation_model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com/v1beta/";
    pub const DEFAULT_EMBEDDING_MODEL: &'static str = "text-embedding-004";
    pub const DEFAULT_GENERATION_MODEL: &'static str = "gemini-2.5-flash";

    /// Create a configuration with default models and endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the key is empty or blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::ConfigError("API key must not be empty".to_string()));
        }
        Ok(Self {
            api_key,
            embedding_model: Self::DEFAULT_EMBEDDING_MODEL.to_string(),
            generation_model: Self::DEFAULT_GENERATION_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Create a configuration from `GOOGLE_API_KEY` (or `GEMINI_API_KEY`).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .or_else(|_| std::env::var(API_KEY_ENV_FALLBACK))
            .map_err(|_| {
                RagError::ConfigError(format!(
                    "neither {API_KEY_ENV} nor {API_KEY_ENV_FALLBACK} is set"
                ))
            })?;
        Self::new(api_key)
    }

    /// Override the embedding model (e.g. `gemini-embedding-001`).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Override the generation model.
    pub fn with_generation_model(mut self, model: impl Into<String>) -> Self {
        self.generation_model = model.into();
        self
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
