//! Upstream answer provider (port)

use async_trait::async_trait;
use thiserror::Error;

/// Every way the single upstream call can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// The service answered with a non-success HTTP status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Connect, DNS, timeout or other I/O failure before a status was seen.
    #[error("upstream transport failure: {0}")]
    Transport(String),

    /// A success status whose body could not be turned into an answer.
    #[error("upstream response invalid: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    /// Ask the AI service one question. Implementations must not retry.
    async fn answer(&self, question: &str) -> Result<String, UpstreamError>;
}
