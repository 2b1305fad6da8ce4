use thiserror::Error;

use margdarshi_core::chat::ValidationError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed session token: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    /// User-safe message, shown as is.
    #[error("{0}")]
    Rejected(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error(transparent)]
    InvalidQuestion(#[from] ValidationError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
