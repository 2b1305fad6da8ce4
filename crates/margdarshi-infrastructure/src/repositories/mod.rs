//! Repository adapters

pub mod memory_user_repo;

pub use memory_user_repo::InMemoryUserRepository;
