//! User repository trait (port)

use async_trait::async_trait;

use crate::domain::User;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// `email` is expected to be normalized already (see [`User::normalize_email`]).
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    /// Fails with [`DomainError::EmailAlreadyExists`] if the email is taken.
    async fn create(&self, user: &User) -> Result<User, DomainError>;
}
