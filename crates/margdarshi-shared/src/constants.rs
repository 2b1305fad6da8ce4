//! Application-wide constants

/// Hard ceiling for a submitted question, counted in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;

pub const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 7 * 24 * 3600;
pub const DEFAULT_AI_TIMEOUT_SECONDS: u64 = 60;

pub const MIN_PASSWORD_LENGTH: u64 = 6;
pub const MIN_AGE: u32 = 13;
pub const MAX_AGE: u32 = 120;

pub const BEARER_PREFIX: &str = "Bearer ";
pub const TOKEN_FILE_NAME: &str = "session_token";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Margdarshi, a gentle spiritual guide grounded in the \
teachings of the Shrimad Bhagavad Gita. Answer questions about life, purpose, dharma and karma \
with reference to relevant chapters and verses. Keep answers compassionate, practical and concise. \
If a question is unrelated to spiritual guidance, politely steer the conversation back to the Gita.";
