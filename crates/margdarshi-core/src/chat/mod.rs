//! Question pipeline: validate, ask upstream once, classify failures.

pub mod classifier;
pub mod pipeline;
pub mod provider;
pub mod validator;

pub use classifier::{ClassifiedError, ErrorClassifier, ErrorKind};
pub use pipeline::{ChatOutcome, ChatPipeline, ChatResponse};
pub use provider::{AnswerProvider, UpstreamError};
pub use validator::{ChatRequestValidator, ValidQuestion, ValidationError};

#[cfg(test)]
pub use provider::MockAnswerProvider;
