//! End-to-end tests of ingestion, answering and the chat session with
//! in-process embedding and generation fakes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use oriana_rag::{
    AdminSession, AnswerGenerator, Authenticator, ChatSession, EMPTY_RESPONSE_APOLOGY,
    EmbeddingProvider, GENERIC_FAILURE_MESSAGE, GenerationProvider, GenerationRequest,
    IngestProgress, IngestionPipeline, KnowledgeStore, NO_KNOWLEDGE_MESSAGE,
    NOT_CONFIGURED_MESSAGE, OUT_OF_SCOPE_MESSAGE, RagConfig, RagError, Role,
    SYSTEM_INSTRUCTION, SharedSecretAuthenticator, WELCOME_MESSAGE,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

const VOCABULARY: [&str; 8] = ["oriana", "gold", "ring", "18k", "22k", "silver", "diamond", "shipping"];

/// Bag-of-words embedder over a tiny jewellery vocabulary.
#[derive(Default)]
struct KeywordEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> oriana_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lower = text.to_lowercase();
        let tokens: Vec<&str> =
            lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()).collect();
        Ok(VOCABULARY
            .iter()
            .map(|word| tokens.iter().filter(|t| t.starts_with(word)).count() as f32)
            .collect())
    }

    fn model(&self) -> &str {
        "keyword-test"
    }
}

/// Returns preset vectors and fails for any text containing `FAIL`.
struct ScriptedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> oriana_rag::Result<Vec<f32>> {
        if text.contains("FAIL") {
            return Err(RagError::EmbeddingError {
                provider: "scripted".into(),
                message: "simulated outage".into(),
            });
        }
        Ok(self.vectors.get(text).cloned().unwrap_or_else(|| self.fallback.clone()))
    }

    fn model(&self) -> &str {
        "scripted-test"
    }
}

/// Records every request; answers with the out-of-scope sentence on empty context.
#[derive(Default)]
struct RecordingGenerator {
    requests: Mutex<Vec<GenerationRequest>>,
    reply: Option<String>,
    fail: bool,
}

impl RecordingGenerator {
    fn replying(reply: &str) -> Self {
        Self { reply: Some(reply.to_string()), ..Default::default() }
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for RecordingGenerator {
    async fn generate(&self, request: GenerationRequest) -> oriana_rag::Result<Option<String>> {
        let empty_context = request.user_content.starts_with("Context Information:\n\n");
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(RagError::GenerationError {
                provider: "recording".into(),
                message: "connection reset".into(),
            });
        }
        if empty_context {
            return Ok(Some(OUT_OF_SCOPE_MESSAGE.to_string()));
        }
        Ok(self.reply.clone())
    }

    fn model(&self) -> &str {
        "recording-test"
    }
}

fn fast_config() -> RagConfig {
    RagConfig::builder().embed_delay(Duration::ZERO).build().unwrap()
}

fn admin() -> AdminSession {
    AdminSession::grant("Admin")
}

fn ingestion(embedder: Arc<dyn EmbeddingProvider>, store: Arc<KnowledgeStore>, config: RagConfig) -> IngestionPipeline {
    IngestionPipeline::builder().config(config).embedding_provider(embedder).store(store).build().unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scenario_a_single_document_is_retrieved_into_context() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let generator = Arc::new(RecordingGenerator::replying("- 18K gold\n- 22K gold"));
    let store = Arc::new(KnowledgeStore::new());
    let document = "Oriana rings come in 18K and 22K gold.";

    let pipeline = ingestion(embedder.clone(), store.clone(), fast_config());
    let record = pipeline.ingest_text(&admin(), "rings.txt", "text/plain", document, &|_| {}).await.unwrap();
    assert_eq!(record.chunks_count, 1);
    assert!(record.processed);

    let chunks = store.all().await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, document);
    assert_eq!(chunks[0].embedding.len(), VOCABULARY.len());

    let answerer = AnswerGenerator::new(fast_config(), embedder.clone(), generator.clone());
    let answer = answerer.answer("What gold purity does Oriana offer?", &store).await.unwrap();
    assert_eq!(answer, "- 18K gold\n- 22K gold");

    let requests = generator.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].user_content.contains(document));
    assert!(requests[0].user_content.contains("User Question: What gold purity does Oriana offer?"));
    assert_eq!(requests[0].model, "recording-test");
    assert_eq!(requests[0].system_instruction, SYSTEM_INSTRUCTION);
    assert!((requests[0].temperature - 0.3).abs() < f32::EPSILON);
}

#[tokio::test]
async fn scenario_b_empty_store_short_circuits_without_external_calls() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let generator = Arc::new(RecordingGenerator::replying("unused"));
    let store = KnowledgeStore::new();

    let answerer = AnswerGenerator::new(fast_config(), embedder.clone(), generator.clone());
    let answer = answerer.answer("Do you ship abroad?", &store).await.unwrap();

    assert_eq!(answer, NO_KNOWLEDGE_MESSAGE);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn scenario_c_below_threshold_match_sends_empty_context() {
    let chunk_text = "Our showroom opens at 10am.";
    let query = "Do you sell platinum?";
    // cosine(query, chunk) = 0.30
    let embedder = Arc::new(ScriptedEmbedder {
        vectors: HashMap::from([
            (chunk_text.to_string(), vec![1.0, 0.0]),
            (query.to_string(), vec![0.3, (1.0f32 - 0.09).sqrt()]),
        ]),
        fallback: vec![0.0, 1.0],
    });
    let generator = Arc::new(RecordingGenerator::replying("should not be used"));
    let store = Arc::new(KnowledgeStore::new());

    ingestion(embedder.clone(), store.clone(), fast_config())
        .ingest_text(&admin(), "hours.txt", "text/plain", chunk_text, &|_| {})
        .await
        .unwrap();

    let answerer = AnswerGenerator::new(fast_config(), embedder, generator.clone());
    let answer = answerer.answer(query, &store).await.unwrap();

    let requests = generator.requests();
    assert_eq!(requests.len(), 1, "generation request must still be issued");
    assert!(requests[0].user_content.starts_with("Context Information:\n\nUser Question:"));
    assert!(!requests[0].user_content.contains(chunk_text));
    assert_eq!(answer, OUT_OF_SCOPE_MESSAGE);
}

#[tokio::test]
async fn empty_generation_text_becomes_apology() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let generator = Arc::new(RecordingGenerator::default());
    let store = Arc::new(KnowledgeStore::new());
    ingestion(embedder.clone(), store.clone(), fast_config())
        .ingest_text(&admin(), "rings.txt", "text/plain", "Oriana gold rings", &|_| {})
        .await
        .unwrap();

    let answerer = AnswerGenerator::new(fast_config(), embedder, generator);
    assert_eq!(answerer.answer("oriana gold", &store).await.unwrap(), EMPTY_RESPONSE_APOLOGY);
}

#[tokio::test]
async fn generation_failure_is_a_generation_error_and_store_is_untouched() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let generator = Arc::new(RecordingGenerator { fail: true, ..Default::default() });
    let store = Arc::new(KnowledgeStore::new());
    ingestion(embedder.clone(), store.clone(), fast_config())
        .ingest_text(&admin(), "rings.txt", "text/plain", "Oriana gold rings", &|_| {})
        .await
        .unwrap();

    let answerer = AnswerGenerator::new(fast_config(), embedder, generator);
    let err = answerer.answer("oriana gold", &store).await.unwrap_err();
    assert!(matches!(err, RagError::GenerationError { .. }));
    assert_eq!(store.len().await, 1);
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_chunk_embeddings_are_skipped() {
    let embedder = Arc::new(ScriptedEmbedder { vectors: HashMap::new(), fallback: vec![1.0, 1.0] });
    let store = Arc::new(KnowledgeStore::new());
    let config = RagConfig::builder().chunk_size(10).chunk_overlap(0).embed_delay(Duration::ZERO).build().unwrap();
    let events = Mutex::new(Vec::new());

    let record = ingestion(embedder, store.clone(), config)
        .ingest_text(&admin(), "mixed.txt", "text/plain", "aaaaaaaaaaFAILbbbbbbcccccccccc", &|e| {
            events.lock().unwrap().push(e)
        })
        .await
        .unwrap();

    assert!(record.processed);
    assert_eq!(record.chunks_count, 2);
    let texts: Vec<String> = store.all().await.into_iter().map(|c| c.text).collect();
    assert_eq!(texts, vec!["aaaaaaaaaa", "cccccccccc"]);

    let events = events.into_inner().unwrap();
    assert!(events.iter().any(|e| matches!(e, IngestProgress::ChunkFailed { index: 1, .. })));
    assert_eq!(
        events.last(),
        Some(&IngestProgress::Done { file: "mixed.txt".into(), stored: 2, total: 3 })
    );
}

#[tokio::test]
async fn whitespace_only_text_is_rejected() {
    let store = Arc::new(KnowledgeStore::new());
    let pipeline = ingestion(Arc::new(KeywordEmbedder::default()), store.clone(), fast_config());
    let err = pipeline.ingest_text(&admin(), "blank.txt", "text/plain", "  \n\t ", &|_| {}).await.unwrap_err();
    assert!(matches!(err, RagError::IngestionError { .. }));
    assert!(store.is_empty().await);
    assert!(pipeline.files().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn embeddings_are_paced_by_configured_delay() {
    let store = Arc::new(KnowledgeStore::new());
    let config = RagConfig::builder()
        .chunk_size(10)
        .chunk_overlap(0)
        .embed_delay(Duration::from_millis(100))
        .build()
        .unwrap();
    let pipeline = ingestion(Arc::new(KeywordEmbedder::default()), store, config);

    let start = tokio::time::Instant::now();
    pipeline.ingest_text(&admin(), "gold.txt", "text/plain", &"gold ring ".repeat(3), &|_| {}).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn ingest_file_reads_disk_and_records_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalogue.txt");
    std::fs::write(&path, "Oriana rings come in 18K and 22K gold.").unwrap();

    let store = Arc::new(KnowledgeStore::new());
    let pipeline = ingestion(Arc::new(KeywordEmbedder::default()), store.clone(), fast_config());
    let record = pipeline.ingest_file(&admin(), &path, &|_| {}).await.unwrap();

    assert_eq!(record.name, "catalogue.txt");
    assert_eq!(record.size, 38);
    assert_eq!(record.content_type, "text/plain");
    assert_eq!(pipeline.files().await, vec![record]);

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.total_chunks, 1);
    assert_eq!(snapshot.files, vec![("catalogue.txt".to_string(), 1)]);
}

#[tokio::test]
async fn rebuilt_pipeline_keeps_file_history_and_store() {
    let store = Arc::new(KnowledgeStore::new());
    let first = ingestion(Arc::new(KeywordEmbedder::default()), store.clone(), fast_config());
    first.ingest_text(&admin(), "rings.txt", "text/plain", "Oriana gold rings", &|_| {}).await.unwrap();

    let second = IngestionPipeline::builder()
        .config(fast_config())
        .embedding_provider(Arc::new(KeywordEmbedder::default()))
        .store(store.clone())
        .files(first.files().await)
        .build()
        .unwrap();
    second.ingest_text(&admin(), "shipping.txt", "text/plain", "Free shipping", &|_| {}).await.unwrap();

    let names: Vec<String> = second.files().await.into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["rings.txt", "shipping.txt"]);
    assert!(Arc::ptr_eq(second.store(), &store));
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn missing_file_is_an_ingestion_error() {
    let pipeline = ingestion(Arc::new(KeywordEmbedder::default()), Arc::new(KnowledgeStore::new()), fast_config());
    let err = pipeline.ingest_file(&admin(), "/definitely/not/here.txt", &|_| {}).await.unwrap_err();
    assert!(matches!(err, RagError::IngestionError { .. }));
}

#[tokio::test]
async fn pdf_files_emit_best_effort_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brochure.pdf");
    std::fs::write(&path, "Oriana diamond collection").unwrap();
    let events = Mutex::new(Vec::new());

    let pipeline = ingestion(Arc::new(KeywordEmbedder::default()), Arc::new(KnowledgeStore::new()), fast_config());
    let record = pipeline.ingest_file(&admin(), &path, &|e| events.lock().unwrap().push(e)).await.unwrap();

    assert_eq!(record.content_type, "application/pdf");
    assert!(events.into_inner().unwrap().contains(&IngestProgress::PdfBestEffort { file: "brochure.pdf".into() }));
}

#[tokio::test]
async fn concurrent_ingestion_runs_do_not_interleave() {
    let store = Arc::new(KnowledgeStore::new());
    let config = RagConfig::builder().chunk_size(5).chunk_overlap(0).embed_delay(Duration::ZERO).build().unwrap();
    let pipeline = ingestion(Arc::new(KeywordEmbedder::default()), store.clone(), config);

    let admin = admin();
    let (gold, ring) = ("gold ".repeat(4), "ring ".repeat(4));
    let (a, b) = tokio::join!(
        pipeline.ingest_text(&admin, "a.txt", "text/plain", &gold, &|_| {}),
        pipeline.ingest_text(&admin, "b.txt", "text/plain", &ring, &|_| {}),
    );
    a.unwrap();
    b.unwrap();

    let sources: Vec<String> = store.all().await.into_iter().map(|c| c.source_file).collect();
    let switches = sources.windows(2).filter(|w| w[0] != w[1]).count();
    assert_eq!(sources.len(), 8);
    assert_eq!(switches, 1);
}

// ---------------------------------------------------------------------------
// Chat session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chat_without_configuration_reports_missing_key() {
    let mut session = ChatSession::new(None, Arc::new(KnowledgeStore::new()));
    assert_eq!(session.messages()[0].text, WELCOME_MESSAGE);

    let reply = session.ask("hello").await.unwrap();
    assert_eq!(reply.text, NOT_CONFIGURED_MESSAGE);
    assert_eq!(reply.role, Role::Model);
}

#[tokio::test]
async fn chat_turns_failures_into_generic_message() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let store = Arc::new(KnowledgeStore::new());
    ingestion(embedder.clone(), store.clone(), fast_config())
        .ingest_text(&admin(), "rings.txt", "text/plain", "Oriana gold rings", &|_| {})
        .await
        .unwrap();
    let generator = Arc::new(RecordingGenerator { fail: true, ..Default::default() });
    let answerer = Arc::new(AnswerGenerator::new(fast_config(), embedder, generator));

    let mut session = ChatSession::new(Some(answerer), store.clone());
    let reply = session.ask("oriana gold?").await.unwrap();

    assert_eq!(reply.text, GENERIC_FAILURE_MESSAGE);
    let roles: Vec<Role> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::Model, Role::User, Role::Model]);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn chat_turns_query_embedding_failure_into_generic_message() {
    let embedder = Arc::new(ScriptedEmbedder { vectors: HashMap::new(), fallback: vec![1.0, 0.0] });
    let store = Arc::new(KnowledgeStore::new());
    ingestion(embedder.clone(), store.clone(), fast_config())
        .ingest_text(&admin(), "rings.txt", "text/plain", "Oriana gold rings", &|_| {})
        .await
        .unwrap();
    let generator = Arc::new(RecordingGenerator::replying("unused"));
    let answerer = Arc::new(AnswerGenerator::new(fast_config(), embedder, generator.clone()));

    let mut session = ChatSession::new(Some(answerer), store.clone());
    let reply = session.ask("FAIL on purpose").await.unwrap();

    assert_eq!(reply.text, GENERIC_FAILURE_MESSAGE);
    assert!(generator.requests().is_empty());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn configuring_a_session_enables_answers() {
    let embedder = Arc::new(KeywordEmbedder::default());
    let store = Arc::new(KnowledgeStore::new());
    ingestion(embedder.clone(), store.clone(), fast_config())
        .ingest_text(&admin(), "rings.txt", "text/plain", "Oriana gold rings", &|_| {})
        .await
        .unwrap();

    let mut session = ChatSession::new(None, store);
    assert!(!session.is_configured());
    assert_eq!(session.ask("oriana gold?").await.unwrap().text, NOT_CONFIGURED_MESSAGE);

    let generator = Arc::new(RecordingGenerator::replying("- 18K gold"));
    session.configure(Arc::new(AnswerGenerator::new(fast_config(), embedder, generator)));
    assert!(session.is_configured());
    assert_eq!(session.ask("oriana gold?").await.unwrap().text, "- 18K gold");
}

#[tokio::test]
async fn chat_ignores_blank_questions_and_clears() {
    let generator = Arc::new(RecordingGenerator::replying("ok"));
    let answerer = Arc::new(AnswerGenerator::new(fast_config(), Arc::new(KeywordEmbedder::default()), generator));
    let mut session = ChatSession::new(Some(answerer), Arc::new(KnowledgeStore::new()));

    assert!(session.ask("   ").await.is_none());
    assert_eq!(session.ask("anything").await.unwrap().text, NO_KNOWLEDGE_MESSAGE);
    assert_eq!(session.messages().len(), 3);

    session.clear();
    assert_eq!(session.messages().len(), 1);
}

#[tokio::test]
async fn shared_secret_authenticator_grants_ingestion_session() {
    let auth = SharedSecretAuthenticator::new("Admin", "Admin@1234").unwrap();
    let session = auth.authenticate("Admin", "Admin@1234").await.unwrap();
    let store = Arc::new(KnowledgeStore::new());
    ingestion(Arc::new(KeywordEmbedder::default()), store.clone(), fast_config())
        .ingest_text(&session, "faq.txt", "text/plain", "Free shipping on gold", &|_| {})
        .await
        .unwrap();
    assert_eq!(store.len().await, 1);
}
