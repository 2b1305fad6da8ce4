//! # Margdarshi Core - Domain Module

pub mod user;

pub use user::{NewUser, User};
