//! Fixed assistant texts and prompt assembly.

use crate::document::ScoredChunk;

/// Returned when a question arrives before any document was ingested.
pub const NO_KNOWLEDGE_MESSAGE: &str = "I currently have no documents loaded in my knowledge base. Please ask the Admin to upload some training material.";

/// The exact sentence the model is instructed to use for unanswerable questions.
pub const OUT_OF_SCOPE_MESSAGE: &str =
    "Sorry, I am not trained on this topic yet. Please contact our support team for further assistance.";

/// Returned when the generation service answers without any text.
pub const EMPTY_RESPONSE_APOLOGY: &str = "I apologize, I couldn't generate a response.";

/// Shown to the customer when a query fails for any reason.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "I encountered an error connecting to my brain. Please try again.";

/// Shown when chat is attempted before an API key was configured.
pub const NOT_CONFIGURED_MESSAGE: &str = "System Error: Admin has not configured the API Key yet.";

/// First message of every chat transcript.
pub const WELCOME_MESSAGE: &str = "Hai! I am Oriana bot. How can I help you today?";

/// Separator placed between chunk texts in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// System instruction sent with every generation request.
pub const SYSTEM_INSTRUCTION: &str = concat!(
    "You are the \"Oriana Assistant\", a helpful AI support agent for GRT Jewels' Oriana brand.\n",
    "Your goal is to assist customers with questions about Oriana products, brand details, and policies based STRICTLY on the provided context.\n",
    "\n",
    "STRICT GUIDELINES:\n",
    "1. **Context Only:** You must answer ONLY using the information provided in the \"Context\" section of the prompt.\n",
    "2. **Out of Scope:** If the answer is not in the context, say exactly: \"",
    "Sorry, I am not trained on this topic yet. Please contact our support team for further assistance.",
    "\"\n",
    "3. **Format:** Strictly use bullet points for lists and keep answers very short and concise.\n",
    "4. **Language:** Detect the language of the user's query (English, Tamil, Telugu, or Kannada) and reply in the SAME language.\n",
    "5. **Tone:** Professional, polite, and luxurious (fitting a jewelry brand).\n",
    "6. **Opening:** Never repeat your opening phrase. Just answer the specific question.\n",
    "\n",
    "Do not hallucinate facts. If the context is empty, give the \"Out of Scope\" message.\n",
);

/// Join retrieved chunk texts into one context block, best match first.
///
/// Returns an empty string when nothing passed the threshold.
pub fn build_context(results: &[ScoredChunk]) -> String {
    results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

/// Build the user turn from the context block and the customer's question.
pub fn build_user_content(context: &str, question: &str) -> String {
    format!(
        "Context Information:\n{context}\n\nUser Question: {question}\n\nRemember strict instructions: Short bullet points, only from context.\n"
    )
}
