use std::sync::Arc;

use margdarshi_core::chat::ChatPipeline;
use margdarshi_core::services::AuthService;
use margdarshi_security::JwtService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub jwt: Arc<JwtService>,
    pub pipeline: Arc<ChatPipeline>,
}
