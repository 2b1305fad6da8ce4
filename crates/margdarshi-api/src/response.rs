//! JSON response shapes

use serde::Serialize;

use margdarshi_core::chat::{ChatOutcome, ChatResponse};
use margdarshi_core::services::UserInfo;

/// `{success, message}` used for every failure and for plain acknowledgements.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&UserInfo> for UserDto {
    fn from(user: &UserInfo) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Wire body for `POST /api/chat/geeta`.
#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl From<ChatResponse> for ChatReply {
    fn from(response: ChatResponse) -> Self {
        match response.outcome {
            ChatOutcome::Success { question, answer } => Self {
                success: true,
                question: Some(question),
                answer: Some(answer),
                message: None,
                error: None,
                timestamp: Some(
                    response
                        .timestamp
                        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                ),
            },
            ChatOutcome::Failure(err) => Self {
                success: false,
                question: None,
                answer: None,
                message: Some(err.message),
                error: err.detail,
                timestamp: None,
            },
        }
    }
}
