//! Document ingestion.
//!
//! The [`IngestionPipeline`] turns one uploaded file into stored chunks:
//! read → chunk → embed each chunk → append to the [`KnowledgeStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use oriana_rag::{IngestionPipeline, KnowledgeStore, RagConfig};
//!
//! let store = Arc::new(KnowledgeStore::new());
//! let pipeline = IngestionPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(client)
//!     .store(store.clone())
//!     .build()?;
//!
//! let record = pipeline.ingest_file(&admin, "faq.txt", &|p| println!("{p}")).await?;
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::auth::AdminSession;
use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::{Chunk, FileRecord};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::store::KnowledgeStore;

const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Progress events emitted while a file is ingested.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestProgress {
    Reading { file: String },
    /// PDF bytes are read as raw text; extraction quality is best effort.
    PdfBestEffort { file: String },
    Chunking { file: String },
    Embedding { file: String, total: usize },
    ChunkFailed { file: String, index: usize, error: String },
    Done { file: String, stored: usize, total: usize },
}

impl fmt::Display for IngestProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reading { file } => write!(f, "Reading {file}..."),
            Self::PdfBestEffort { .. } => write!(
                f,
                "Note: PDF detected. Attempting raw text extraction. For best results, convert to .txt"
            ),
            Self::Chunking { .. } => write!(f, "Chunking text..."),
            Self::Embedding { total, .. } => {
                write!(f, "Vectorizing {total} chunks (this may take a moment)...")
            }
            Self::ChunkFailed { index, error, .. } => {
                write!(f, "Failed to embed chunk {index}: {error}")
            }
            Self::Done { file, stored, total } => {
                write!(f, "Processed {file}: {stored}/{total} chunks stored")
            }
        }
    }
}

/// Chunks, embeds and stores uploaded documents.
///
/// Runs are serialized: a second call waits until the first finishes, so
/// chunks of one file are appended contiguously and in order. Per-chunk
/// embedding failures are logged and skipped; the file is still recorded with
/// the number of chunks that made it into the store.
pub struct IngestionPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    store: Arc<KnowledgeStore>,
    chunker: Arc<dyn Chunker>,
    files: RwLock<Vec<FileRecord>>,
    run_lock: Mutex<()>,
}

impl IngestionPipeline {
    /// Create a new [`IngestionPipelineBuilder`].
    pub fn builder() -> IngestionPipelineBuilder {
        IngestionPipelineBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<KnowledgeStore> {
        &self.store
    }

    /// Records of every file ingested so far, oldest first.
    pub async fn files(&self) -> Vec<FileRecord> {
        self.files.read().await.clone()
    }

    /// Read a file from disk and ingest its contents.
    ///
    /// Bytes are decoded as UTF-8, replacing invalid sequences. The content
    /// type is guessed from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestionError`] if the file cannot be read or
    /// holds no text.
    pub async fn ingest_file(
        &self,
        session: &AdminSession,
        path: impl AsRef<Path>,
        on_progress: &(dyn Fn(IngestProgress) + Sync),
    ) -> Result<FileRecord> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = mime_guess::from_path(path).first_or_octet_stream().to_string();

        on_progress(IngestProgress::Reading { file: name.clone() });
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            error!(file = %name, error = %e, "failed to read file");
            RagError::IngestionError { file: name.clone(), message: format!("failed to read file content: {e}") }
        })?;
        let text = String::from_utf8_lossy(&bytes);

        self.ingest_content(session, &name, &content_type, bytes.len() as u64, &text, on_progress)
            .await
    }

    /// Ingest already-decoded text under the given file name.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IngestionError`] if `text` is empty or whitespace.
    pub async fn ingest_text(
        &self,
        session: &AdminSession,
        name: &str,
        content_type: &str,
        text: &str,
        on_progress: &(dyn Fn(IngestProgress) + Sync),
    ) -> Result<FileRecord> {
        self.ingest_content(session, name, content_type, text.len() as u64, text, on_progress).await
    }

    async fn ingest_content(
        &self,
        session: &AdminSession,
        name: &str,
        content_type: &str,
        size: u64,
        text: &str,
        on_progress: &(dyn Fn(IngestProgress) + Sync),
    ) -> Result<FileRecord> {
        let _run = self.run_lock.lock().await;

        if content_type == PDF_CONTENT_TYPE {
            warn!(file = name, "PDF ingested as raw text");
            on_progress(IngestProgress::PdfBestEffort { file: name.to_string() });
        }

        if text.trim().is_empty() {
            return Err(RagError::IngestionError {
                file: name.to_string(),
                message: "file appears empty or content could not be read".to_string(),
            });
        }

        // 1. Chunk the text
        on_progress(IngestProgress::Chunking { file: name.to_string() });
        let pieces = self.chunker.chunk(text);
        let total = pieces.len();

        // 2. Embed and append chunk by chunk
        on_progress(IngestProgress::Embedding { file: name.to_string(), total });
        let mut stored = 0;
        for (index, piece) in pieces.into_iter().enumerate() {
            let embedding = match self.embedding_provider.embed(&piece).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    error!(file = name, chunk_index = index, error = %e, "failed to embed chunk");
                    on_progress(IngestProgress::ChunkFailed {
                        file: name.to_string(),
                        index,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(e) = self.store.append(Chunk::new(name, piece, embedding)).await {
                error!(file = name, chunk_index = index, error = %e, "failed to store chunk");
                on_progress(IngestProgress::ChunkFailed {
                    file: name.to_string(),
                    index,
                    error: e.to_string(),
                });
                continue;
            }
            stored += 1;

            // pace requests to the embedding service
            if index + 1 < total && !self.config.embed_delay.is_zero() {
                tokio::time::sleep(self.config.embed_delay).await;
            }
        }

        let record = FileRecord {
            name: name.to_string(),
            size,
            content_type: content_type.to_string(),
            processed: true,
            chunks_count: stored,
        };
        self.files.write().await.push(record.clone());

        info!(file = name, admin = session.username(), chunk_count = stored, total, "ingested file");
        on_progress(IngestProgress::Done { file: name.to_string(), stored, total });

        Ok(record)
    }
}

/// Builder for constructing an [`IngestionPipeline`].
///
/// `embedding_provider` and `store` are required. The chunker defaults to a
/// [`FixedSizeChunker`] sized from the config.
#[derive(Default)]
pub struct IngestionPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<KnowledgeStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    files: Vec<FileRecord>,
}

impl IngestionPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the knowledge store chunks are appended to.
    pub fn store(mut self, store: Arc<KnowledgeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the default chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Carry over the file history of a previous pipeline.
    pub fn files(mut self, files: Vec<FileRecord>) -> Self {
        self.files = files;
        self
    }

    /// Build the [`IngestionPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or the
    /// configured chunk size and overlap are inconsistent.
    pub fn build(self) -> Result<IngestionPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| RagError::ConfigError("store is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?),
        };

        Ok(IngestionPipeline {
            config,
            embedding_provider,
            store,
            chunker,
            files: RwLock::new(self.files),
            run_lock: Mutex::new(()),
        })
    }
}
