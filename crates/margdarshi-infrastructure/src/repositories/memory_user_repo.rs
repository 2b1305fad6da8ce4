// ============================================================================
// Margdarshi Infrastructure - In-Memory User Repository
// File: crates/margdarshi-infrastructure/src/repositories/memory_user_repo.rs
// ============================================================================

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use margdarshi_core::domain::User;
use margdarshi_core::error::DomainError;
use margdarshi_core::repositories::UserRepository;

/// Process-local user storage. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<DashMap<Uuid, User>>,
    /// normalized email -> user id
    by_email: Arc<DashMap<String, Uuid>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let id = match self.by_email.get(email) {
            Some(entry) => *entry.value(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn create(&self, user: &User) -> Result<User, DomainError> {
        // The email entry stays locked until the user row is in place.
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DomainError::EmailAlreadyExists(user.email.clone())),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                debug!("Stored user {} ({} total)", user.id, self.users.len());
                Ok(user.clone())
            }
        }
    }
}
