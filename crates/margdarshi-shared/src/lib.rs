//! # Margdarshi Shared
//!
//! Configuration, telemetry, constants and error types shared by every
//! Margdarshi crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod telemetry;

pub use config::{AppConfig, ClientConfig, RuntimeEnv};
pub use error::AppError;
