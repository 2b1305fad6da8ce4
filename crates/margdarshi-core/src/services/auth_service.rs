// ============================================================================
// Margdarshi Core - Authentication Service
// File: crates/margdarshi-core/src/services/auth_service.rs
// ============================================================================
//! Authentication service with login and register flows

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use margdarshi_security::{JwtService, PasswordService};

use crate::domain::{NewUser, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;

/// Authentication service for handling user login/register flows
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { user_repo, jwt }
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResult, DomainError> {
        let email = User::normalize_email(email);
        info!("Login attempt for email: {}", email);

        // 1. Find user by email
        let user = self.user_repo.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed: email not found: {}", email);
            DomainError::InvalidCredentials
        })?;

        // 2. Verify password off the async runtime
        let stored_hash = user.password_hash.clone();
        let password_owned = password.to_string();
        let password_valid = tokio::task::spawn_blocking(move || {
            PasswordService::verify(&password_owned, &stored_hash)
        })
        .await
        .map_err(|e| DomainError::InternalError(e.to_string()))?
        .map_err(|_| DomainError::InvalidCredentials)?;

        if !password_valid {
            warn!("Login failed: invalid password for: {}", email);
            return Err(DomainError::InvalidCredentials);
        }

        // 3. Issue token
        let token = self
            .jwt
            .generate_token(&user.id.to_string(), &user.name, &user.email)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        info!("Login successful for: {}", email);

        Ok(LoginResult {
            user: UserInfo::from(&user),
            token,
        })
    }

    /// Register a new user. No session is created; the caller logs in afterwards.
    pub async fn register(&self, new_user: NewUser) -> Result<RegisterResult, DomainError> {
        let email = User::normalize_email(&new_user.email);
        info!("Registration attempt for email: {}", email);

        // 1. Validate payload
        new_user.check().map_err(DomainError::ValidationError)?;

        // 2. Check if email already exists
        if self.user_repo.find_by_email(&email).await?.is_some() {
            warn!("Registration failed: email already exists: {}", email);
            return Err(DomainError::EmailAlreadyExists(email));
        }

        // 3. Hash password
        let password = new_user.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || PasswordService::hash(&password))
            .await
            .map_err(|e| DomainError::InternalError(e.to_string()))?
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;

        // 4. Save
        let user = User::new(new_user.name, email.clone(), password_hash, new_user.age);
        let created = self.user_repo.create(&user).await?;

        info!("Registration successful for: {}", email);

        Ok(RegisterResult {
            user: UserInfo::from(&created),
        })
    }
}

/// Result of successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: UserInfo,
    pub token: String,
}

/// Result of successful registration
#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub user: UserInfo,
}

/// User info returned in auth responses
#[derive(Debug, Clone)]
pub struct UserInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
