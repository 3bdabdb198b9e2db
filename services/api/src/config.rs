//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Missing LLM API keys are not an error here;
//! the matching provider call fails when it is first used.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub storage_root: PathBuf,
    pub public_url: String,
    pub cors_origin: String,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub lesson_model: String,
    pub lesson_max_tokens: u32,
    pub claude_model: String,
    pub claude_max_tokens: u32,
    pub gpt_model: String,
    pub gemini_model: String,
    pub session_ttl_days: i64,
    pub reset_token_ttl_minutes: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address = parse_var("BIND_ADDRESS", "0.0.0.0:3000")?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let storage_root = std::env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./storage"));

        let public_url = var_or("PUBLIC_URL", "http://localhost:3000");
        let cors_origin = var_or("CORS_ORIGIN", "http://localhost:3000");

        // --- Load API Keys (as optional) ---
        let anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let google_api_key = std::env::var("GOOGLE_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let lesson_model = var_or("LESSON_MODEL", "claude-3-haiku-20240307");
        let lesson_max_tokens = parse_var("LESSON_MAX_TOKENS", "1500")?;
        let claude_model = var_or("CLAUDE_MODEL", "claude-3-sonnet-20240229");
        let claude_max_tokens = parse_var("CLAUDE_MAX_TOKENS", "1024")?;
        let gpt_model = var_or("GPT_MODEL", "gpt-4-turbo-preview");
        let gemini_model = var_or("GEMINI_MODEL", "gemini-1.0-pro");

        // --- Load Auth Settings ---
        let session_ttl_days = parse_var("SESSION_TTL_DAYS", "30")?;
        let reset_token_ttl_minutes = parse_var("RESET_TOKEN_TTL_MINUTES", "60")?;

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            storage_root,
            public_url,
            cors_origin,
            anthropic_api_key,
            openai_api_key,
            google_api_key,
            lesson_model,
            lesson_max_tokens,
            claude_model,
            claude_max_tokens,
            gpt_model,
            gemini_model,
            session_ttl_days,
            reset_token_ttl_minutes,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var_or(name, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string()))
}
