//! Upstream AI adapters

pub mod gemini;

pub use gemini::GeminiAnswerProvider;
