// ============================================================================
// Margdarshi Client - Auth Gateway
// File: crates/margdarshi-client/src/gateway.rs
// ============================================================================
//! Login, signup and logout against the auth endpoints

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::ValidateEmail;

use margdarshi_shared::constants::{MAX_AGE, MIN_AGE, MIN_PASSWORD_LENGTH};

use crate::decoder::Session;
use crate::error::ClientError;
use crate::guard::SessionGuard;

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const REGISTRATION_SUCCEEDED: &str = "Registration successful! Please login.";
const FILL_ALL_FIELDS: &str = "Please fill in all fields";

/// Signup form as typed by the user. `age` stays text until checked.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub age: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Form checks in display order. Returns the parsed age.
    pub fn check(&self) -> Result<u32, String> {
        if [
            &self.name,
            &self.email,
            &self.age,
            &self.password,
            &self.confirm_password,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
        {
            return Err(FILL_ALL_FIELDS.to_string());
        }

        if !self.email.trim().validate_email() {
            return Err("Please enter a valid email address".to_string());
        }

        let age = self
            .age
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
            .ok_or_else(|| format!("Please enter a valid age ({}-{})", MIN_AGE, MAX_AGE))?;

        if (self.password.chars().count() as u64) < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            ));
        }

        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }

        Ok(age)
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    email: &'a str,
    password: &'a str,
    name: &'a str,
    age: u32,
}

#[derive(Deserialize)]
struct LoginReply {
    token: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
}

/// Pull `message` out of a failed response, if the server sent one.
pub(crate) async fn server_message(response: Response) -> Option<String> {
    response
        .json::<ErrorPayload>()
        .await
        .ok()
        .and_then(|p| p.message)
        .filter(|m| !m.trim().is_empty())
}

pub struct AuthGateway {
    http: Client,
    base_url: String,
    guard: Arc<SessionGuard>,
}

impl AuthGateway {
    pub fn new(base_url: &str, guard: Arc<SessionGuard>) -> Self {
        Self::with_client(Client::new(), base_url, guard)
    }

    pub fn with_client(http: Client, base_url: &str, guard: Arc<SessionGuard>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            guard,
        }
    }

    /// Sign in and keep the issued token. Failures carry a message fit for
    /// the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::Rejected(FILL_ALL_FIELDS.to_string()));
        }

        info!("Logging in as {}", email);

        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&LoginBody { email, password })
            .send()
            .await
            .map_err(|e| {
                warn!("Login request failed: {}", e);
                ClientError::Rejected(LOGIN_FAILED.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = server_message(response)
                .await
                .unwrap_or_else(|| LOGIN_FAILED.to_string());
            warn!("Login rejected with {}: {}", status, message);
            return Err(ClientError::Rejected(message));
        }

        let reply: LoginReply = response.json().await.map_err(|e| {
            warn!("Unexpected login response: {}", e);
            ClientError::Rejected(LOGIN_FAILED.to_string())
        })?;

        // A token we cannot use is the server's fault, not the user's.
        let session = self.guard.establish(&reply.token).map_err(|e| match e {
            ClientError::Decode(_) | ClientError::Unauthorized => {
                warn!("Login returned an unusable token: {}", e);
                ClientError::Rejected(LOGIN_FAILED.to_string())
            }
            other => other,
        })?;
        info!("Signed in as {}", session.claims.display_name);
        Ok(session)
    }

    /// Register a new account. No session is created; the user logs in
    /// afterwards.
    pub async fn signup(&self, form: &SignupForm) -> Result<String, ClientError> {
        let age = form.check().map_err(ClientError::Rejected)?;

        let response = self
            .http
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&RegisterBody {
                email: form.email.trim(),
                password: &form.password,
                name: form.name.trim(),
                age,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Register request failed: {}", e);
                ClientError::Rejected(REGISTRATION_FAILED.to_string())
            })?;

        if !response.status().is_success() {
            let message = server_message(response)
                .await
                .unwrap_or_else(|| REGISTRATION_FAILED.to_string());
            return Err(ClientError::Rejected(message));
        }

        info!("Registered {}", form.email.trim());
        Ok(REGISTRATION_SUCCEEDED.to_string())
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.guard.end()?;
        info!("Signed out");
        Ok(())
    }
}
