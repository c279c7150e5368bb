//! Wiring of the library components for one terminal session.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use oriana_rag::{
    AdminSession, AnswerGenerator, Authenticator, ChatMessage, ChatSession, FileRecord,
    GeminiClient, GeminiConfig, IngestionPipeline, KnowledgeSnapshot, KnowledgeStore, RagConfig,
    RagError, SharedSecretAuthenticator,
};
use tracing::{info, warn};

use crate::cli::SessionArgs;

const ADMIN_USER_ENV: &str = "ORIANA_ADMIN_USER";
const ADMIN_PASSWORD_ENV: &str = "ORIANA_ADMIN_PASSWORD";
const DEFAULT_ADMIN_USER: &str = "Admin";

/// One assistant session: shared store, ingestion and chat.
pub struct App {
    config: RagConfig,
    store: Arc<KnowledgeStore>,
    ingestion: Option<IngestionPipeline>,
    chat: ChatSession,
    authenticator: Option<SharedSecretAuthenticator>,
    admin: Option<AdminSession>,
    admin_user: Option<String>,
    admin_password: Option<String>,
}

impl App {
    /// Build the session from arguments and environment.
    ///
    /// A missing API key is not fatal: chat then answers with the
    /// not-configured message and ingestion is refused.
    pub fn new(args: &SessionArgs) -> anyhow::Result<Self> {
        let config = args.rag_config().context("invalid retrieval settings")?;
        let store = Arc::new(KnowledgeStore::new());

        let (ingestion, generator) = match GeminiClient::from_env() {
            Ok(client) => {
                let (ingestion, generator) = connect(&config, &store, client, Vec::new())?;
                (Some(ingestion), Some(generator))
            }
            Err(e) => {
                warn!(error = %e, "Gemini client not configured");
                (None, None)
            }
        };

        let authenticator = match std::env::var(ADMIN_PASSWORD_ENV) {
            Ok(password) => {
                let user = std::env::var(ADMIN_USER_ENV)
                    .unwrap_or_else(|_| DEFAULT_ADMIN_USER.to_string());
                Some(SharedSecretAuthenticator::new(user, password)?)
            }
            Err(_) => None,
        };

        Ok(Self {
            chat: ChatSession::new(generator, store.clone()),
            config,
            store,
            ingestion,
            authenticator,
            admin: None,
            admin_user: args.admin_user.clone(),
            admin_password: args.admin_password.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.chat.is_configured()
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Authenticate once and reuse the admin session afterwards.
    async fn admin_session(&mut self) -> anyhow::Result<AdminSession> {
        if let Some(admin) = &self.admin {
            return Ok(admin.clone());
        }
        let Some(authenticator) = &self.authenticator else {
            bail!("admin login is disabled: set {ADMIN_PASSWORD_ENV} to enable admin commands");
        };

        let user = match &self.admin_user {
            Some(user) => user.clone(),
            None => prompt("Admin username: ")?,
        };
        let password = match &self.admin_password {
            Some(password) => password.clone(),
            None => rpassword::prompt_password("Admin password: ")?,
        };

        let admin = authenticator.authenticate(&user, &password).await?;
        info!(admin = admin.username(), "admin authenticated");
        self.admin = Some(admin.clone());
        Ok(admin)
    }

    /// Ingest a file into the shared store, printing progress.
    pub async fn ingest(&mut self, path: &Path) -> anyhow::Result<FileRecord> {
        if self.ingestion.is_none() {
            return Err(not_configured().into());
        }
        let admin = self.admin_session().await?;
        let ingestion = self.ingestion.as_ref().ok_or_else(not_configured)?;

        let record = ingestion
            .ingest_file(&admin, path, &|progress| println!("  {progress}"))
            .await
            .with_context(|| format!("failed to ingest {}", path.display()))?;
        Ok(record)
    }

    /// Switch the session to a new API key. Requires admin login.
    ///
    /// Ingestion and chat are rebuilt around one new client; the knowledge
    /// store and file history are kept.
    pub async fn set_api_key(&mut self, api_key: &str) -> anyhow::Result<()> {
        let admin = self.admin_session().await?;
        let client = GeminiClient::new(GeminiConfig::new(api_key)?)?;
        let files = match &self.ingestion {
            Some(ingestion) => ingestion.files().await,
            None => Vec::new(),
        };

        let (ingestion, generator) = connect(&self.config, &self.store, client, files)?;
        self.ingestion = Some(ingestion);
        self.chat.configure(generator);
        info!(admin = admin.username(), "API key updated");
        Ok(())
    }

    pub async fn ask(&mut self, question: &str) -> Option<ChatMessage> {
        self.chat.ask(question).await
    }

    pub fn clear(&mut self) {
        self.chat.clear();
    }

    pub async fn knowledge(&self) -> KnowledgeSnapshot {
        self.store.snapshot().await
    }

    pub async fn files(&self) -> Vec<FileRecord> {
        match &self.ingestion {
            Some(ingestion) => ingestion.files().await,
            None => Vec::new(),
        }
    }
}

/// Build the ingestion pipeline and answer generator over one client.
fn connect(
    config: &RagConfig,
    store: &Arc<KnowledgeStore>,
    client: GeminiClient,
    files: Vec<FileRecord>,
) -> anyhow::Result<(IngestionPipeline, Arc<AnswerGenerator>)> {
    let client = Arc::new(client);
    let ingestion = IngestionPipeline::builder()
        .config(config.clone())
        .embedding_provider(client.clone())
        .store(store.clone())
        .files(files)
        .build()?;
    let generator = Arc::new(AnswerGenerator::new(config.clone(), client.clone(), client));
    Ok((ingestion, generator))
}

fn not_configured() -> RagError {
    RagError::ConfigError(
        "API key not set; configure GOOGLE_API_KEY or use /key before uploading documents"
            .to_string(),
    )
}

fn prompt(label: &str) -> anyhow::Result<String> {
    let mut editor = rustyline::DefaultEditor::new()?;
    Ok(editor.readline(label)?.trim().to_string())
}
