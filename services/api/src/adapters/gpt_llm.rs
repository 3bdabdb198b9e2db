//! services/api/src/adapters/gpt_llm.rs
//!
//! This module contains the adapter for OpenAI chat completions.
//! It implements the `CompletionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use didactic_core::ports::{CompletionService, PortError, PortResult};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using an OpenAI chat model.
#[derive(Clone)]
pub struct OpenAiGptAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiGptAdapter {
    /// Creates a new `OpenAiGptAdapter`. Without an API key every call fails.
    pub fn new(api_key: Option<&str>, model: String) -> Self {
        let client =
            api_key.map(|key| Client::with_config(OpenAIConfig::new().with_api_key(key)));
        Self { client, model }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for OpenAiGptAdapter {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| PortError::Unexpected("OPENAI_API_KEY is not set".to_string()))?;

        let user_message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let messages: Vec<ChatCompletionRequestMessage> = vec![user_message.into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Map the error by hand; the orphan rule forbids a From impl here.
        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("GPT response contained no text content.".to_string())
            })
    }
}
