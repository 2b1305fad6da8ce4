//! JWT token handling
//!
//! The server issues HS256 tokens carrying the user's id, display name and
//! email. Clients read the same claims back without a round trip; whether
//! they also check the signature is their choice (see [`decode_claims`]).

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token creation failed: {0}")]
    CreationError(String),
    #[error("Token validation failed: {0}")]
    ValidationError(String),
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub exp: i64,
}

pub struct JwtService {
    secret: String,
    expiry_seconds: i64,
}

impl JwtService {
    pub fn new(secret: String, expiry_seconds: i64) -> Self {
        Self {
            secret,
            expiry_seconds,
        }
    }

    /// Issue a token valid for the configured expiry from now.
    pub fn generate_token(&self, user_id: &str, name: &str, email: &str) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            iat: Some(now.timestamp()),
            exp: (now + Duration::seconds(self.expiry_seconds)).timestamp(),
        };
        self.encode_claims(&claims)
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| JwtError::CreationError(e.to_string()))
    }

    /// Full server-side validation: signature and expiry, no leeway.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            _ => JwtError::ValidationError(e.to_string()),
        })
    }
}

/// Decode a token's claims without judging expiry.
///
/// With `secret = None` the signature is not checked; only the shape of the
/// token and its claims is. With `Some(secret)` the HS256 signature must
/// match as well.
pub fn decode_claims(token: &str, secret: Option<&[u8]>) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.set_required_spec_claims(&["exp"]);

    let key = match secret {
        Some(secret) => DecodingKey::from_secret(secret),
        None => {
            validation.insecure_disable_signature_validation();
            DecodingKey::from_secret(&[])
        }
    };

    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| JwtError::ValidationError(e.to_string()))
}
