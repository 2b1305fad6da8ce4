//! # Margdarshi Infrastructure
//!
//! Adapters for the core ports: user storage and the upstream AI service.

pub mod ai;
pub mod repositories;

pub use ai::GeminiAnswerProvider;
pub use repositories::InMemoryUserRepository;
