//! Maps upstream failures to user-facing outcomes

use margdarshi_shared::RuntimeEnv;

use super::provider::UpstreamError;
use super::validator::ValidationError;

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please wait a moment and try again.";
pub const MISCONFIGURED_MESSAGE: &str = "AI service configuration error. Please contact support.";
pub const UNKNOWN_MESSAGE: &str =
    "I apologize for the inconvenience. Please try again or rephrase your question.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    RateLimited,
    UpstreamMisconfigured,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::RateLimited => "rate_limited",
            Self::UpstreamMisconfigured => "upstream_misconfigured",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    pub kind: ErrorKind,
    /// HTTP status surfaced to the caller.
    pub status: u16,
    pub message: String,
    /// Technical detail, only in development and only for `Unknown`.
    pub detail: Option<String>,
}

impl From<ValidationError> for ClassifiedError {
    fn from(err: ValidationError) -> Self {
        Self {
            kind: ErrorKind::Validation,
            status: 400,
            message: err.to_string(),
            detail: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifier {
    expose_detail: bool,
}

impl ErrorClassifier {
    pub fn new(expose_detail: bool) -> Self {
        Self { expose_detail }
    }

    pub fn for_env(env: RuntimeEnv) -> Self {
        Self::new(env.exposes_error_detail())
    }

    /// First match wins: 429, then 401, then everything else.
    pub fn classify(&self, err: &UpstreamError) -> ClassifiedError {
        match err.status() {
            Some(429) => ClassifiedError {
                kind: ErrorKind::RateLimited,
                status: 429,
                message: RATE_LIMITED_MESSAGE.to_string(),
                detail: None,
            },
            Some(401) => ClassifiedError {
                kind: ErrorKind::UpstreamMisconfigured,
                status: 500,
                message: MISCONFIGURED_MESSAGE.to_string(),
                detail: None,
            },
            _ => ClassifiedError {
                kind: ErrorKind::Unknown,
                status: 500,
                message: UNKNOWN_MESSAGE.to_string(),
                detail: self.expose_detail.then(|| err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> UpstreamError {
        UpstreamError::Status {
            status,
            body: "{\"error\":\"quota exceeded for key AIza-secret\"}".to_string(),
        }
    }

    #[test]
    fn test_rate_limited() {
        let c = ErrorClassifier::new(true).classify(&status(429));
        assert_eq!(c.kind, ErrorKind::RateLimited);
        assert_eq!(c.status, 429);
        assert_eq!(c.message, "Too many requests. Please wait a moment and try again.");
        assert!(c.detail.is_none());
    }

    #[test]
    fn test_upstream_unauthorized_is_hidden() {
        let c = ErrorClassifier::new(true).classify(&status(401));
        assert_eq!(c.kind, ErrorKind::UpstreamMisconfigured);
        assert_eq!(c.status, 500);
        assert!(c.message.contains("configuration error"));
        assert!(!c.message.contains("401"));
        assert!(c.detail.is_none());
    }

    #[test]
    fn test_unknown_detail_only_in_development() {
        let err = UpstreamError::Transport("dns error: no such host".to_string());

        let dev = ErrorClassifier::for_env(RuntimeEnv::Development).classify(&err);
        assert_eq!(dev.kind, ErrorKind::Unknown);
        assert_eq!(dev.status, 500);
        assert!(dev.detail.unwrap().contains("no such host"));

        let prod = ErrorClassifier::for_env(RuntimeEnv::Production).classify(&err);
        assert_eq!(prod.message, UNKNOWN_MESSAGE);
        assert!(prod.detail.is_none());

        let test = ErrorClassifier::for_env(RuntimeEnv::Test).classify(&err);
        assert!(test.detail.is_none());
    }

    #[test]
    fn test_unrecognised_env_names_hide_detail() {
        let err = UpstreamError::Status {
            status: 400,
            body: "API key not valid. Please pass a valid API key.".to_string(),
        };
        for name in ["staging", "prod-eu", "live", ""] {
            let c = ErrorClassifier::for_env(RuntimeEnv::from_name(name)).classify(&err);
            assert_eq!(c.kind, ErrorKind::Unknown);
            assert!(c.detail.is_none(), "detail leaked for env {:?}", name);
        }
    }

    #[test]
    fn test_other_statuses_and_invalid_responses_are_unknown() {
        let classifier = ErrorClassifier::new(false);
        for err in [
            status(500),
            status(403),
            status(503),
            UpstreamError::InvalidResponse("no choices".to_string()),
        ] {
            let c = classifier.classify(&err);
            assert_eq!(c.kind, ErrorKind::Unknown);
            assert_eq!(c.status, 500);
        }
    }

    #[test]
    fn test_validation_conversion() {
        let c = ClassifiedError::from(ValidationError::TooLong);
        assert_eq!(c.kind, ErrorKind::Validation);
        assert_eq!(c.status, 400);
        assert_eq!(
            c.message,
            "Question is too long. Please keep it under 1000 characters."
        );
    }
}
