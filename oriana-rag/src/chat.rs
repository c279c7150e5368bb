//! Chat session transcript.
//!
//! [`ChatSession`] is the boundary between the answering pipeline and the
//! customer: every failure is logged and turned into a fixed, friendly reply
//! so raw errors never reach the end user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::generation::AnswerGenerator;
use crate::prompt::{GENERIC_FAILURE_MESSAGE, NOT_CONFIGURED_MESSAGE, WELCOME_MESSAGE};
use crate::store::KnowledgeStore;

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One entry of the chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4().to_string(), role, text: text.into(), timestamp: Utc::now() }
    }
}

/// A single customer conversation over a shared knowledge store.
///
/// The session starts with a welcome message. Without a configured
/// [`AnswerGenerator`] (no API key yet) every question is answered with
/// [`NOT_CONFIGURED_MESSAGE`].
pub struct ChatSession {
    generator: Option<Arc<AnswerGenerator>>,
    store: Arc<KnowledgeStore>,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(generator: Option<Arc<AnswerGenerator>>, store: Arc<KnowledgeStore>) -> Self {
        Self { generator, store, messages: vec![ChatMessage::new(Role::Model, WELCOME_MESSAGE)] }
    }

    /// Swap in a generator built for a new configuration.
    pub fn configure(&mut self, generator: Arc<AnswerGenerator>) {
        self.generator = Some(generator);
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Ask a question, record both turns, and return the reply.
    ///
    /// Blank questions are ignored and return `None`.
    pub async fn ask(&mut self, query: &str) -> Option<ChatMessage> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let Some(generator) = self.generator.clone() else {
            let reply = ChatMessage::new(Role::Model, NOT_CONFIGURED_MESSAGE);
            self.messages.push(reply.clone());
            return Some(reply);
        };

        self.messages.push(ChatMessage::new(Role::User, query));

        let text = match generator.answer(query, &self.store).await {
            Ok(text) => {
                info!(reply_len = text.len(), "answered query");
                text
            }
            Err(e) => {
                error!(error = %e, "query failed");
                GENERIC_FAILURE_MESSAGE.to_string()
            }
        };

        let reply = ChatMessage::new(Role::Model, text);
        self.messages.push(reply.clone());
        Some(reply)
    }

    /// The transcript, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Reset the transcript to the welcome message.
    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage::new(Role::Model, WELCOME_MESSAGE)];
    }
}
