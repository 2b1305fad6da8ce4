//! Question normalization and bounds checking

use serde_json::Value;
use thiserror::Error;

use margdarshi_shared::constants::MAX_QUESTION_CHARS;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please provide a valid question")]
    Empty,
    #[error("Question is too long. Please keep it under 1000 characters.")]
    TooLong,
}

/// A trimmed question of 1..=1000 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidQuestion(String);

impl ValidQuestion {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatRequestValidator;

impl ChatRequestValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw JSON value. `None`, non-strings and blank strings are
    /// all [`ValidationError::Empty`].
    pub fn validate(&self, raw: Option<&Value>) -> Result<ValidQuestion, ValidationError> {
        match raw {
            Some(Value::String(text)) => self.validate_text(text),
            _ => Err(ValidationError::Empty),
        }
    }

    pub fn validate_text(&self, text: &str) -> Result<ValidQuestion, ValidationError> {
        let trimmed = text.trim_matches(is_trimmable);
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }
        if trimmed.chars().count() > MAX_QUESTION_CHARS {
            return Err(ValidationError::TooLong);
        }
        Ok(ValidQuestion(trimmed.to_string()))
    }
}

/// Unicode whitespace plus the byte order mark, which `str::trim` keeps.
fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}
