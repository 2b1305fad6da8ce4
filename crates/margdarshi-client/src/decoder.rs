//! Local reading of session tokens
//!
//! By default the client trusts the issuing server and only checks that a
//! token is well formed and not yet expired. [`SessionDecoder::verified`]
//! additionally checks the HS256 signature when the client shares the
//! server's secret.

use chrono::Utc;
use margdarshi_security::{decode_claims, Claims};

use crate::error::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub subject_id: String,
    pub display_name: String,
    pub email: String,
    /// Epoch seconds
    pub expires_at: i64,
}

impl From<Claims> for SessionClaims {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            display_name: claims.name,
            email: claims.email,
            expires_at: claims.exp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub claims: SessionClaims,
    pub issued_at: Option<i64>,
}

impl Session {
    pub fn is_usable_at(&self, now: i64) -> bool {
        now < self.claims.expires_at
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionDecoder {
    secret: Option<Vec<u8>>,
}

impl SessionDecoder {
    pub fn unverified() -> Self {
        Self { secret: None }
    }

    pub fn verified(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Some(secret.into()),
        }
    }

    pub fn verifies_signature(&self) -> bool {
        self.secret.is_some()
    }

    /// `Ok(None)` means the token is well formed but expired.
    pub fn decode(&self, token: &str) -> Result<Option<Session>, DecodeError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    pub fn decode_at(&self, token: &str, now: i64) -> Result<Option<Session>, DecodeError> {
        let claims = decode_claims(token, self.secret.as_deref())
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;

        let issued_at = claims.iat;
        let session = Session {
            token: token.to_string(),
            claims: claims.into(),
            issued_at,
        };

        Ok(session.is_usable_at(now).then_some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use margdarshi_security::JwtService;

    fn token_expiring_at(secret: &str, exp: i64) -> String {
        JwtService::new(secret.to_string(), 3600)
            .encode_claims(&Claims {
                sub: "user-1".to_string(),
                name: "Arjuna".to_string(),
                email: "arjuna@example.com".to_string(),
                iat: Some(exp - 3600),
                exp,
            })
            .unwrap()
    }

    #[test]
    fn test_decode_live_token() {
        let token = token_expiring_at("server-secret", 2_000);
        let session = SessionDecoder::unverified()
            .decode_at(&token, 1_000)
            .unwrap()
            .unwrap();

        assert_eq!(session.token, token);
        assert_eq!(session.claims.subject_id, "user-1");
        assert_eq!(session.claims.display_name, "Arjuna");
        assert_eq!(session.claims.expires_at, 2_000);
        assert_eq!(session.issued_at, Some(-1_600));
    }

    #[test]
    fn test_expiry_boundary_is_absent() {
        let token = token_expiring_at("server-secret", 2_000);
        let decoder = SessionDecoder::unverified();

        assert!(decoder.decode_at(&token, 1_999).unwrap().is_some());
        assert!(decoder.decode_at(&token, 2_000).unwrap().is_none());
        assert!(decoder.decode_at(&token, 2_001).unwrap().is_none());
    }

    #[test]
    fn test_malformed_tokens() {
        let decoder = SessionDecoder::unverified();
        for token in ["", "not-a-token", "a.b", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30.sig"] {
            assert!(
                matches!(decoder.decode_at(token, 0), Err(DecodeError::Malformed(_))),
                "accepted {:?}",
                token
            );
        }
    }

    #[test]
    fn test_unverified_ignores_signature() {
        let token = token_expiring_at("some-other-secret", 2_000);
        assert!(SessionDecoder::unverified()
            .decode_at(&token, 1_000)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_verified_checks_signature() {
        let decoder = SessionDecoder::verified("server-secret");
        assert!(decoder.verifies_signature());

        let good = token_expiring_at("server-secret", 2_000);
        assert!(decoder.decode_at(&good, 1_000).unwrap().is_some());

        let forged = token_expiring_at("some-other-secret", 2_000);
        assert!(decoder.decode_at(&forged, 1_000).is_err());
    }
}
