use anyhow::{bail, Context};
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use margdarshi_api::{build_router, AppState};
use margdarshi_core::chat::{ChatPipeline, ErrorClassifier};
use margdarshi_core::services::AuthService;
use margdarshi_infrastructure::{GeminiAnswerProvider, InMemoryUserRepository};
use margdarshi_security::JwtService;
use margdarshi_shared::config::AppConfig;
use margdarshi_shared::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize telemetry (keep the guard alive to flush file logs)
    let _log_guard = init_telemetry(&config.log)?;

    info!("{} starting in {} mode...", config.app.name, config.app.env);

    if config.jwt.secret.trim().is_empty() {
        error!("jwt.secret is empty; set MARGDARSHI__JWT__SECRET");
        bail!("jwt.secret must not be empty");
    }
    if config.ai.api_key.is_empty() {
        warn!("ai.api_key is empty; every question will fail upstream");
    }

    // Wire services
    let jwt = Arc::new(JwtService::new(
        config.jwt.secret.clone(),
        config.jwt.expiry_seconds,
    ));
    let user_repo = Arc::new(InMemoryUserRepository::new());
    let auth_service = Arc::new(AuthService::new(user_repo, jwt.clone()));

    let provider = Arc::new(
        GeminiAnswerProvider::new(&config.ai).context("Failed to build AI HTTP client")?,
    );
    let classifier = ErrorClassifier::for_env(config.runtime_env());
    let pipeline = Arc::new(ChatPipeline::new(provider, classifier));
    info!("Using model {} at {}", config.ai.model, config.ai.base_url);

    let state = AppState {
        auth_service,
        jwt,
        pipeline,
    };

    let app = build_router(state).layer(cors_layer(&config.app.cors_origin)?);

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// `*` allows any origin, otherwise a comma separated list.
fn cors_layer(origins: &str) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origins.trim() == "*" {
        AllowOrigin::any()
    } else {
        let list = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(HeaderValue::from_str)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid app.cors_origin: {}", origins))?;
        AllowOrigin::list(list)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}
