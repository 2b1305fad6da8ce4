//! Gemini answer provider (OpenAI-compatible chat completions endpoint)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use margdarshi_core::chat::{AnswerProvider, UpstreamError};
use margdarshi_shared::config::AiSettings;

#[derive(Clone)]
pub struct GeminiAnswerProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl GeminiAnswerProvider {
    pub fn new(settings: &AiSettings) -> Result<Self, reqwest::Error> {
        // The transport timeout is the only timeout on the chat path.
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            system_prompt: settings.system_prompt.clone(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl AnswerProvider for GeminiAnswerProvider {
    async fn answer(&self, question: &str) -> Result<String, UpstreamError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            stream: false,
        };

        debug!("Calling {} with model {}", self.completions_url(), self.model);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::InvalidResponse(format!("Failed to parse completion: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| UpstreamError::InvalidResponse("No answer returned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings(base_url: &str) -> AiSettings {
        AiSettings {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            model: "gemini-test".to_string(),
            timeout_seconds: 5,
            system_prompt: "You are a guide.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_answer_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "gemini-test",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "You are a guide."},
                    {"role": "user", "content": "What is dharma?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": " Dharma is duty. "}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiAnswerProvider::new(&settings(&server.uri())).unwrap();
        let answer = provider.answer("What is dharma?").await.unwrap();
        assert_eq!(answer, "Dharma is duty.");
    }

    #[tokio::test]
    async fn test_status_errors_are_reported_once() {
        for status in [401u16, 429, 500] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/chat/completions"))
                .respond_with(ResponseTemplate::new(status).set_body_string("upstream says no"))
                .expect(1)
                .mount(&server)
                .await;

            let provider = GeminiAnswerProvider::new(&settings(&server.uri())).unwrap();
            let err = provider.answer("What is karma?").await.unwrap_err();
            assert_eq!(
                err,
                UpstreamError::Status {
                    status,
                    body: "upstream says no".to_string()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let provider = GeminiAnswerProvider::new(&settings(&server.uri())).unwrap();
        let err = provider.answer("What is karma?").await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = GeminiAnswerProvider::new(&settings(&server.uri())).unwrap();
        let err = provider.answer("What is karma?").await.unwrap_err();
        assert!(matches!(err, UpstreamError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport() {
        let provider = GeminiAnswerProvider::new(&settings("http://127.0.0.1:1")).unwrap();
        let err = provider.answer("What is karma?").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }

    #[tokio::test]
    async fn test_configured_timeout_is_applied() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [{"message": {"content": "late"}}] }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut slow = settings(&server.uri());
        slow.timeout_seconds = 1;
        let provider = GeminiAnswerProvider::new(&slow).unwrap();

        let err = provider.answer("What is karma?").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let provider = GeminiAnswerProvider::new(&settings("http://localhost:9999/v1/")).unwrap();
        assert_eq!(provider.completions_url(), "http://localhost:9999/v1/chat/completions");
    }
}
