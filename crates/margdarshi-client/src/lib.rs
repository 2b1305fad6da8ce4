//! # Margdarshi Client
//!
//! Client half of the session flow. A [`TokenStore`] keeps the single token,
//! the [`SessionGuard`] decides whether it is usable, the [`AuthGateway`]
//! talks to the auth endpoints and the [`ChatClient`] asks questions on
//! behalf of the signed-in user.

pub mod chat_client;
pub mod decoder;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod token_store;

pub use chat_client::{ChatAnswer, ChatClient};
pub use decoder::{Session, SessionClaims, SessionDecoder};
pub use error::{ClientError, DecodeError, StoreError};
pub use gateway::{AuthGateway, SignupForm};
pub use guard::SessionGuard;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
