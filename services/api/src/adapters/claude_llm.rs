//! services/api/src/adapters/claude_llm.rs
//!
//! This module contains the adapter for Anthropic's Messages API.
//! It implements the `CompletionService` port from the `core` crate.

use async_trait::async_trait;
use didactic_core::ports::{CompletionService, PortError, PortResult};
use serde::{Deserialize, Serialize};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using a Claude model.
#[derive(Clone)]
pub struct ClaudeAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
}

impl ClaudeAdapter {
    /// Creates a new `ClaudeAdapter`. A missing key surfaces on the first call.
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        model: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            http,
            api_key,
            model,
            max_tokens,
        }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for ClaudeAdapter {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PortError::Unexpected("ANTHROPIC_API_KEY is not set".to_string()))?;

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json::<MessagesResponse>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| {
                PortError::Unexpected("Claude response contained no text content.".to_string())
            })
    }
}
