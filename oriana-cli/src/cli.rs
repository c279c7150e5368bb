//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use oriana_rag::{RagConfig, Result};

/// Oriana customer-support assistant.
#[derive(Debug, Parser)]
#[command(name = "oriana", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an interactive chat session.
    Chat(SessionArgs),
    /// Answer a single question and exit.
    Ask {
        /// The question to answer.
        question: String,
        #[command(flatten)]
        session: SessionArgs,
    },
}

/// Options shared by every command that builds a session.
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Files to ingest before the session starts (requires admin login).
    #[arg(long = "ingest", value_name = "FILE")]
    pub ingest: Vec<PathBuf>,

    /// Username presented at admin login. Checked against `ORIANA_ADMIN_USER`.
    #[arg(long, env = "ORIANA_LOGIN_USER")]
    pub admin_user: Option<String>,

    /// Password presented at admin login. Checked against `ORIANA_ADMIN_PASSWORD`.
    #[arg(long, env = "ORIANA_LOGIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Number of chunks kept after ranking.
    #[arg(long, default_value_t = 4)]
    pub top_k: usize,

    /// Minimum cosine similarity for a chunk to be used as context.
    #[arg(long, default_value_t = 0.45)]
    pub threshold: f32,

    /// Chunk window size in characters.
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Overlap between chunk windows in characters.
    #[arg(long, default_value_t = 50)]
    pub chunk_overlap: usize,

    /// Pause between chunk embeddings, in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub embed_delay_ms: u64,
}

impl SessionArgs {
    pub fn rag_config(&self) -> Result<RagConfig> {
        RagConfig::builder()
            .top_k(self.top_k)
            .similarity_threshold(self.threshold)
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .embed_delay(std::time::Duration::from_millis(self.embed_delay_ms))
            .build()
    }
}
