//! Configuration management
//!
//! Both the server and the client layer their settings the same way:
//! built-in defaults, then optional TOML files under `config/`, then
//! environment variables (`MARGDARSHI__SECTION__KEY` for the server,
//! `MARGDARSHI_CLIENT__SECTION__KEY` for the client).

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_AI_TIMEOUT_SECONDS, DEFAULT_SYSTEM_PROMPT, DEFAULT_TOKEN_EXPIRY_SECONDS,
    TOKEN_FILE_NAME,
};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub jwt: JwtSettings,
    pub ai: AiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiry_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub system_prompt: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    /// `json` or `pretty`
    pub format: String,
    /// Optional directory for daily-rolling log files.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

/// Runtime environment as named by `app.env`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Development,
    Test,
    Production,
}

impl RuntimeEnv {
    /// Only explicit development and test names are recognised. Anything
    /// else, including an empty name, is treated as production.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            "test" => Self::Test,
            _ => Self::Production,
        }
    }

    /// Upstream failure detail may reach clients in development only.
    pub fn exposes_error_detail(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "production".into());
        Self::defaults()?
            .set_default("app.env", env.clone())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("MARGDARSHI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Built-in defaults. `jwt.secret` has none and must be supplied.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "production")?
            .set_default("app.host", "127.0.0.1")?
            .set_default("app.port", 8080)?
            .set_default("app.name", "margdarshi-server")?
            .set_default("app.cors_origin", "http://localhost:5173")?
            .set_default("jwt.expiry_seconds", DEFAULT_TOKEN_EXPIRY_SECONDS)?
            .set_default(
                "ai.base_url",
                "https://generativelanguage.googleapis.com/v1beta/openai",
            )?
            .set_default("ai.api_key", "")?
            .set_default("ai.model", "gemini-1.5-flash")?
            .set_default("ai.timeout_seconds", DEFAULT_AI_TIMEOUT_SECONDS as i64)?
            .set_default("ai.system_prompt", DEFAULT_SYSTEM_PROMPT)?
            .set_default("log.format", "pretty")
    }

    pub fn runtime_env(&self) -> RuntimeEnv {
        RuntimeEnv::from_name(&self.app.env)
    }
}

// ============================================================================
// Client configuration
// ============================================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api: ClientApiSettings,
    pub session: ClientSessionSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientApiSettings {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientSessionSettings {
    pub token_path: String,
    /// When set, tokens are signature-checked locally with this secret.
    #[serde(default)]
    pub verify_secret: Option<String>,
}

impl ClientConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::defaults()?
            .add_source(File::with_name("config/client").required(false))
            .add_source(
                Environment::with_prefix("MARGDARSHI_CLIENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("api.base_url", "http://127.0.0.1:8080")?
            .set_default(
                "session.token_path",
                default_token_path().to_string_lossy().into_owned(),
            )
    }
}

/// `$HOME/.margdarshi/session_token`, or a relative path when no home is set.
pub fn default_token_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".margdarshi").join(TOKEN_FILE_NAME)
}
