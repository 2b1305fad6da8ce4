//! # Margdarshi Core
//!
//! Domain entities, services and ports: user registration and login on one
//! side, the validated question pipeline on the other.

pub mod chat;
pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;

pub use domain::*;
pub use error::DomainError;
