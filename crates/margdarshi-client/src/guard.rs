// ============================================================================
// Margdarshi Client - Session Guard
// File: crates/margdarshi-client/src/guard.rs
// ============================================================================
//! Gatekeeper for protected capabilities
//!
//! Every check reads the store afresh. Expired and malformed tokens are
//! dropped from storage on sight, so callers only ever see a usable session
//! or nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use margdarshi_shared::constants::BEARER_PREFIX;

use crate::decoder::{Session, SessionDecoder};
use crate::error::ClientError;
use crate::token_store::TokenStore;

pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    decoder: SessionDecoder,
    ready: AtomicBool,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn TokenStore>, decoder: SessionDecoder) -> Self {
        Self {
            store,
            decoder,
            ready: AtomicBool::new(false),
        }
    }

    /// Startup check. Runs one session check, then marks the guard ready so
    /// gate decisions never happen before the stored token was looked at.
    pub fn initialize(&self) -> Option<Session> {
        let session = self.current_session();
        self.ready.store(true, Ordering::Release);
        match &session {
            Some(s) => info!("Restored session for {}", s.claims.display_name),
            None => debug!("No stored session"),
        }
        session
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn current_session(&self) -> Option<Session> {
        let token = match self.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(e) => {
                warn!("Could not read session token: {}", e);
                return None;
            }
        };

        match self.decoder.decode(&token) {
            Ok(Some(session)) => Some(session),
            Ok(None) => {
                info!("Stored session expired, clearing it");
                self.discard();
                None
            }
            Err(e) => {
                warn!("Discarding unreadable session token: {}", e);
                self.discard();
                None
            }
        }
    }

    /// Gate for the chat capability. On `Unauthorized` the caller sends the
    /// user to the login flow.
    pub fn require_session(&self) -> Result<Session, ClientError> {
        self.current_session().ok_or(ClientError::Unauthorized)
    }

    /// `Bearer <token>` while a usable session exists.
    pub fn authorization_header(&self) -> Option<String> {
        self.current_session()
            .map(|s| format!("{}{}", BEARER_PREFIX, s.token))
    }

    /// Store a freshly issued token. The token must decode and be live.
    pub fn establish(&self, token: &str) -> Result<Session, ClientError> {
        let session = self
            .decoder
            .decode(token)?
            .ok_or(ClientError::Unauthorized)?;
        self.store.set(token)?;
        Ok(session)
    }

    /// Forget the session. Safe to call with nothing stored.
    pub fn end(&self) -> Result<(), ClientError> {
        self.store.clear()?;
        Ok(())
    }

    fn discard(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clear session token: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_store::MemoryTokenStore;
    use chrono::Utc;
    use margdarshi_security::{Claims, JwtService};

    fn token_with_exp(exp: i64) -> String {
        JwtService::new("guard-secret".to_string(), 3600)
            .encode_claims(&Claims {
                sub: "user-1".to_string(),
                name: "Arjuna".to_string(),
                email: "arjuna@example.com".to_string(),
                iat: None,
                exp,
            })
            .unwrap()
    }

    fn live_token() -> String {
        token_with_exp(Utc::now().timestamp() + 3600)
    }

    fn guard_with(store: Arc<MemoryTokenStore>) -> SessionGuard {
        SessionGuard::new(store, SessionDecoder::unverified())
    }

    #[test]
    fn test_initialize_marks_ready() {
        let store = Arc::new(MemoryTokenStore::with_token(live_token()));
        let guard = guard_with(store);

        assert!(!guard.is_ready());
        let session = guard.initialize();
        assert!(guard.is_ready());
        assert_eq!(session.unwrap().claims.display_name, "Arjuna");
    }

    #[test]
    fn test_initialize_without_token() {
        let guard = guard_with(Arc::new(MemoryTokenStore::new()));
        assert!(guard.initialize().is_none());
        assert!(guard.is_ready());
    }

    #[test]
    fn test_expired_token_is_absent_and_cleared() {
        let now = Utc::now().timestamp();
        for exp in [now, now - 1, now - 86_400] {
            let store = Arc::new(MemoryTokenStore::with_token(token_with_exp(exp)));
            let guard = guard_with(store.clone());

            assert!(guard.current_session().is_none());
            assert_eq!(store.get().unwrap(), None);
        }
    }

    #[test]
    fn test_malformed_token_is_absent_and_cleared() {
        for garbage in ["garbage", "a.b.c", "..."] {
            let store = Arc::new(MemoryTokenStore::with_token(garbage));
            let guard = guard_with(store.clone());

            assert!(guard.current_session().is_none());
            assert!(matches!(
                guard.require_session(),
                Err(ClientError::Unauthorized)
            ));
            assert_eq!(store.get().unwrap(), None);
        }
    }

    #[test]
    fn test_authorization_header_follows_session() {
        let store = Arc::new(MemoryTokenStore::new());
        let guard = guard_with(store);
        assert_eq!(guard.authorization_header(), None);

        let token = live_token();
        guard.establish(&token).unwrap();
        assert_eq!(
            guard.authorization_header(),
            Some(format!("Bearer {}", token))
        );

        guard.end().unwrap();
        assert_eq!(guard.authorization_header(), None);
    }

    #[test]
    fn test_establish_rejects_bad_tokens() {
        let store = Arc::new(MemoryTokenStore::new());
        let guard = guard_with(store.clone());

        assert!(matches!(
            guard.establish("garbage"),
            Err(ClientError::Decode(_))
        ));
        assert!(matches!(
            guard.establish(&token_with_exp(Utc::now().timestamp() - 10)),
            Err(ClientError::Unauthorized)
        ));
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_end_then_current_session_is_absent() {
        let cases = [None, Some(live_token()), Some("garbage".to_string())];
        for stored in cases {
            let store = Arc::new(match stored {
                Some(token) => MemoryTokenStore::with_token(token),
                None => MemoryTokenStore::new(),
            });
            let guard = guard_with(store);

            guard.end().unwrap();
            guard.end().unwrap();
            assert!(guard.current_session().is_none());
        }
    }
}
