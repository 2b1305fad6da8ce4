//! User domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String, age: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email: Self::normalize_email(&email),
            password_hash,
            age,
            created_at: Utc::now(),
        }
    }

    /// Emails are compared trimmed and lowercased.
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }
}

/// Registration payload as accepted by the auth service.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, max = 100, message = "Please provide your name"))]
    pub name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(range(min = 13, max = 120, message = "Please enter a valid age (13-120)"))]
    pub age: u32,
}

impl NewUser {
    /// Validate and return the first failing rule's message, fields in
    /// alphabetical order.
    pub fn check(&self) -> Result<(), String> {
        let trimmed = Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            age: self.age,
        };
        trimmed.validate().map_err(|e| first_message(&e))
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().collect();
    fields.sort();

    fields
        .first()
        .and_then(|field| field_errors.get(*field))
        .and_then(|errs| errs.first())
        .and_then(|err| err.message.as_ref())
        .map(|msg| msg.to_string())
        .unwrap_or_else(|| "Invalid registration details".to_string())
}
