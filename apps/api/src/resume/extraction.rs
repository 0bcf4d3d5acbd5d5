//! Extraction service — fills the résumé prompt, makes one model call, and reads
//! the reply back as a `ParsedResume` when it is a strict JSON object.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::llm_client::{LlmError, TextGenerator};
use crate::resume::models::{ExtractionOutcome, ParsedResume, RawReply};
use crate::resume::prompts::{fill_template, RESUME_PARSE_PROMPT};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No text to parse")]
    EmptyText,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Holds the prompt template and the model handle. Built once at startup and
/// shared read-only between requests.
pub struct ExtractionService {
    template: &'static str,
    generator: Arc<dyn TextGenerator>,
}

impl ExtractionService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self::with_template(RESUME_PARSE_PROMPT, generator)
    }

    /// `template` must contain a `{resume_text}` placeholder.
    pub fn with_template(template: &'static str, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            template,
            generator,
        }
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Sends `resume_text` to the model exactly once.
    ///
    /// Whitespace-only text is refused before any call is made. A reply that is
    /// not a JSON object comes back as `Ok(Err(RawReply))`, untouched.
    pub async fn build_and_send(&self, resume_text: &str) -> Result<ExtractionOutcome, ExtractionError> {
        if resume_text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }

        let prompt = fill_template(self.template, resume_text);
        info!(
            "Requesting résumé extraction ({} chars) from {}",
            resume_text.chars().count(),
            self.generator.model()
        );

        let reply = self.generator.generate(&prompt).await?;
        Ok(decode_reply(reply))
    }
}

/// Strict decode: the whole reply must be a JSON object. No fence stripping.
pub fn decode_reply(reply: String) -> ExtractionOutcome {
    match serde_json::from_str::<Value>(&reply) {
        Ok(value @ Value::Object(_)) => match serde_json::from_value::<ParsedResume>(value) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!("Model reply is JSON but not a résumé object: {e}");
                Err(RawReply(reply))
            }
        },
        Ok(_) => {
            warn!("Model reply is JSON but not an object");
            Err(RawReply(reply))
        }
        Err(e) => {
            warn!("Model reply is not valid JSON: {e}");
            Err(RawReply(reply))
        }
    }
}
