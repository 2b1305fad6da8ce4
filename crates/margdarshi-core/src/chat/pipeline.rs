//! Chat pipeline orchestration

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use super::classifier::{ClassifiedError, ErrorClassifier};
use super::provider::AnswerProvider;
use super::validator::ChatRequestValidator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Success { question: String, answer: String },
    Failure(ClassifiedError),
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub outcome: ChatOutcome,
    pub timestamp: DateTime<Utc>,
}

impl ChatResponse {
    fn new(outcome: ChatOutcome) -> Self {
        Self {
            outcome,
            timestamp: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ChatOutcome::Success { .. })
    }

    /// HTTP status for this response.
    pub fn status(&self) -> u16 {
        match &self.outcome {
            ChatOutcome::Success { .. } => 200,
            ChatOutcome::Failure(err) => err.status,
        }
    }
}

pub struct ChatPipeline {
    validator: ChatRequestValidator,
    provider: Arc<dyn AnswerProvider>,
    classifier: ErrorClassifier,
}

impl ChatPipeline {
    pub fn new(provider: Arc<dyn AnswerProvider>, classifier: ErrorClassifier) -> Self {
        Self {
            validator: ChatRequestValidator::new(),
            provider,
            classifier,
        }
    }

    /// Validate, then make exactly one upstream call. Never retries and
    /// never returns an error: every failure becomes a `Failure` outcome.
    pub async fn handle(&self, raw: Option<&Value>) -> ChatResponse {
        // 1. Validate locally; nothing goes upstream on failure
        let question = match self.validator.validate(raw) {
            Ok(q) => q,
            Err(e) => {
                warn!("Invalid question received: {}", e);
                return ChatResponse::new(ChatOutcome::Failure(e.into()));
            }
        };

        info!("Processing question ({} chars)", question.as_str().chars().count());

        // 2. Single upstream call
        let started = Instant::now();
        let result = self.provider.answer(question.as_str()).await;
        let elapsed_ms = started.elapsed().as_millis();

        // 3. Success or classified failure
        match result {
            Ok(answer) => {
                info!("Upstream answered in {}ms", elapsed_ms);
                ChatResponse::new(ChatOutcome::Success {
                    question: question.into_inner(),
                    answer,
                })
            }
            Err(e) => {
                let classified = self.classifier.classify(&e);
                error!(
                    "Chat upstream error after {}ms (classified as {}): {}",
                    elapsed_ms,
                    classified.kind.as_str(),
                    e
                );
                ChatResponse::new(ChatOutcome::Failure(classified))
            }
        }
    }

    pub async fn handle_text(&self, question: &str) -> ChatResponse {
        self.handle(Some(&Value::String(question.to_string()))).await
    }
}
