//! Gemini embedding and generation client over the public REST API.
//!
//! This module is only available when the `gemini` feature is enabled.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Response, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GeminiConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{GenerationProvider, GenerationRequest};

/// A client for the Gemini `embedContent` and `generateContent` endpoints.
///
/// One client serves both ingestion and querying so that chunk and query
/// vectors come from the same embedding model. The API key is sent in the
/// `x-goog-api-key` header.
///
/// # Example
///
/// ```rust,ignore
/// use oriana_rag::{GeminiClient, GeminiConfig};
///
/// let client = GeminiClient::new(GeminiConfig::from_env()?)?;
/// let embedding = client.embed("hello world").await?;
/// ```
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: Url,
    embedding_model: String,
    generation_model: String,
}

impl GeminiClient {
    /// Create a client from a validated [`GeminiConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the key cannot be used as a header
    /// value, the base URL does not parse, or the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(RagError::ConfigError("API key must not be empty".to_string()));
        }

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| RagError::ConfigError(format!("invalid API key: {e}")))?;
        let headers = HeaderMap::from_iter([(HeaderName::from_static("x-goog-api-key"), api_key)]);

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = config.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)
            .map_err(|e| RagError::ConfigError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            embedding_model: config.embedding_model,
            generation_model: config.generation_model,
        })
    }

    /// Create a client from `GOOGLE_API_KEY` with default models.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    fn model_url(&self, model: &str, action: &str) -> std::result::Result<Url, String> {
        self.base_url.join(&format!("models/{model}:{action}")).map_err(|e| e.to_string())
    }

    async fn post<Req: Serialize, Res: for<'de> Deserialize<'de>>(
        &self,
        url: Url,
        body: &Req,
    ) -> std::result::Result<Res, String> {
        let response = self
            .http_client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        let response = check_response(response).await?;
        response.json().await.map_err(|e| format!("failed to parse response: {e}"))
    }
}

/// Turn a non-success status into a readable message.
async fn check_response(response: Response) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(format!("API key rejected ({status}): {detail}"));
    }
    Err(format!("API returned {status}: {detail}"))
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

// ── Provider implementations ───────────────────────────────────────

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", model = %self.embedding_model, text_len = text.len(), "embedding single text");

        let embedding_error =
            |message: String| RagError::EmbeddingError { provider: "Gemini".into(), message };

        let url = self.model_url(&self.embedding_model, "embedContent").map_err(embedding_error)?;
        let request = EmbedContentRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content { role: None, parts: vec![Part { text }] },
        };

        let response: EmbedContentResponse = self.post(url, &request).await.map_err(|message| {
            error!(provider = "Gemini", error = %message, "embedding request failed");
            embedding_error(message)
        })?;

        match response.embedding {
            Some(embedding) if !embedding.values.is_empty() => Ok(embedding.values),
            _ => Err(embedding_error("response contained no embedding vector".into())),
        }
    }

    fn model(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl GenerationProvider for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Option<String>> {
        debug!(
            provider = "Gemini",
            model = %request.model,
            prompt_len = request.user_content.len(),
            temperature = request.temperature,
            "generating content"
        );

        let generation_error =
            |message: String| RagError::GenerationError { provider: "Gemini".into(), message };

        let url = self.model_url(&request.model, "generateContent").map_err(generation_error)?;
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: &request.system_instruction }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &request.user_content }],
            }],
            generation_config: GenerationConfig { temperature: request.temperature },
        };

        let response: GenerateContentResponse = self.post(url, &body).await.map_err(|message| {
            error!(provider = "Gemini", error = %message, "generation request failed");
            generation_error(message)
        })?;

        Ok(response.text())
    }

    fn model(&self) -> &str {
        &self.generation_model
    }
}
