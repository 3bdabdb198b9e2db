//! services/api/src/web/state.rs
//!
//! Defines the application's shared state, created once at startup and handed
//! to every handler.

use crate::config::Config;
use chrono::Duration;
use didactic_core::auth_events::AuthEventHub;
use didactic_core::ports::{CompletionService, DatabaseService, FileStorageService};
use std::sync::Arc;

//=========================================================================================
// LLM Providers
//=========================================================================================

/// The three providers reachable through the general LLM proxy.
#[derive(Clone)]
pub struct LlmProviders {
    pub claude: Arc<dyn CompletionService>,
    pub gpt: Arc<dyn CompletionService>,
    pub gemini: Arc<dyn CompletionService>,
}

//=========================================================================================
// Auth Settings
//=========================================================================================

#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub session_ttl: Duration,
    pub reset_token_ttl: Duration,
    /// Base URL the password recovery link points at.
    pub public_url: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::days(30),
            reset_token_ttl: Duration::minutes(60),
            public_url: "http://localhost:3000".to_string(),
        }
    }
}

impl From<&Config> for AuthSettings {
    fn from(config: &Config) -> Self {
        Self {
            session_ttl: Duration::days(config.session_ttl_days),
            reset_token_ttl: Duration::minutes(config.reset_token_ttl_minutes),
            public_url: config.public_url.clone(),
        }
    }
}

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub storage: Arc<dyn FileStorageService>,
    pub auth_events: Arc<AuthEventHub>,
    pub auth_settings: AuthSettings,
    /// Fixed provider used by the lesson generation endpoint.
    pub lesson_generator: Arc<dyn CompletionService>,
    pub llm: LlmProviders,
}
