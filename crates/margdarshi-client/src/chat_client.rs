//! Asking questions as the signed-in user

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use margdarshi_core::chat::ChatRequestValidator;

use crate::error::ClientError;
use crate::gateway::server_message;
use crate::guard::SessionGuard;

const CHAT_FALLBACK: &str =
    "I apologize, but I encountered an issue. Please try again or rephrase your question.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAnswer {
    pub question: String,
    pub answer: String,
    pub timestamp: Option<String>,
}

#[derive(Serialize)]
struct AskBody<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct AskReply {
    question: Option<String>,
    answer: Option<String>,
    timestamp: Option<String>,
}

pub struct ChatClient {
    http: Client,
    base_url: String,
    guard: Arc<SessionGuard>,
    validator: ChatRequestValidator,
}

impl ChatClient {
    pub fn new(base_url: &str, guard: Arc<SessionGuard>) -> Self {
        Self::with_client(Client::new(), base_url, guard)
    }

    pub fn with_client(http: Client, base_url: &str, guard: Arc<SessionGuard>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            guard,
            validator: ChatRequestValidator::new(),
        }
    }

    pub async fn ask(&self, question: &str) -> Result<ChatAnswer, ClientError> {
        // 1. Gate on a usable session
        let session = self.guard.require_session()?;

        // 2. Same checks as the server, before any traffic
        let question = self.validator.validate_text(question)?;

        debug!("Asking as {}", session.claims.display_name);

        // 3. Single request with the bearer token
        let response = self
            .http
            .post(format!("{}/api/chat/geeta", self.base_url))
            .bearer_auth(&session.token)
            .json(&AskBody {
                question: question.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Chat request failed: {}", e);
                ClientError::Rejected(CHAT_FALLBACK.to_string())
            })?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            info!("Server rejected the session, signing out");
            self.guard.end()?;
            return Err(ClientError::Unauthorized);
        }

        if !status.is_success() {
            let message = server_message(response)
                .await
                .unwrap_or_else(|| CHAT_FALLBACK.to_string());
            warn!("Chat failed with {}: {}", status, message);
            return Err(ClientError::Rejected(message));
        }

        let reply: AskReply = response.json().await.map_err(|e| {
            warn!("Unexpected chat response: {}", e);
            ClientError::Rejected(CHAT_FALLBACK.to_string())
        })?;

        let answer = reply
            .answer
            .ok_or_else(|| ClientError::Rejected(CHAT_FALLBACK.to_string()))?;

        Ok(ChatAnswer {
            question: reply.question.unwrap_or_else(|| question.into_inner()),
            answer,
            timestamp: reply.timestamp,
        })
    }
}
