// ============================================================================
// Margdarshi API - Auth Handlers
// File: crates/margdarshi-api/src/handlers/auth.rs
// ============================================================================
//! Authentication HTTP handlers (login, register)

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use margdarshi_core::domain::NewUser;

use crate::error::ApiError;
use crate::response::UserDto;
use crate::state::AppState;

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Register request payload
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub age: u32,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserDto,
}

/// Login handler - POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        debug!("Rejected body: {}", e.body_text());
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Please provide email and password".to_string(),
        ));
    }

    let result = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        token: result.token,
        user: UserDto::from(&result.user),
    }))
}

/// Register handler - POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| {
        debug!("Rejected body: {}", e.body_text());
        ApiError::BadRequest("Invalid request body".to_string())
    })?;

    let result = state
        .auth_service
        .register(NewUser {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            age: payload.age,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully. Please login.".to_string(),
            user: UserDto::from(&result.user),
        }),
    ))
}
