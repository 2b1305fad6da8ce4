// ============================================================================
// Margdarshi API - Routes
// File: crates/margdarshi-api/src/routes.rs
// ============================================================================

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, chat, health};
use crate::middleware::require_bearer;
use crate::state::AppState;

/// Build the application router. CORS is layered on by the binary.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));

    let chat_routes = Router::new()
        .route("/geeta", post(chat::ask))
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/chat", chat_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
