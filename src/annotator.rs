//! AI Annotator — turns free-form user text into a one-line task description.
//!
//! Thin glue over the LLM provider: one completion request with a bounded
//! output-length hint, result trimmed and handed to the store's create
//! operation by the caller. No retries; if the provider fails, nothing is
//! persisted.

use std::sync::Arc;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Output-length hint for annotation requests.
const MAX_ANNOTATION_TOKENS: u64 = 100;

/// Derives todo descriptions from free-form input.
pub struct Annotator {
    llm: Arc<dyn LlmProvider>,
    system_prompt: String,
}

impl Annotator {
    pub fn new(llm: Arc<dyn LlmProvider>, system_prompt: impl Into<String>) -> Self {
        Self {
            llm,
            system_prompt: system_prompt.into(),
        }
    }

    /// The model backing this annotator.
    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Derive a task description from the user's message.
    ///
    /// Issues one completion request and returns the completion text with
    /// surrounding whitespace trimmed.
    pub async fn annotate(&self, message: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(message),
        ])
        .with_max_tokens(MAX_ANNOTATION_TOKENS);

        let response = self.llm.complete(request).await?;
        let text = response.content.trim().to_string();
        tracing::debug!(model = self.llm.model_name(), derived = %text, "Annotation complete");
        Ok(text)
    }
}
