//! services/api/src/adapters/gemini_llm.rs
//!
//! This module contains the adapter for Google's Generative Language API.
//! It implements the `CompletionService` port from the `core` crate.

use async_trait::async_trait;
use didactic_core::ports::{CompletionService, PortError, PortResult};
use serde::{Deserialize, Serialize};

const GENERATE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CompletionService` using a Gemini model.
#[derive(Clone)]
pub struct GeminiAdapter {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`. A missing key surfaces on the first call.
    pub fn new(http: reqwest::Client, api_key: Option<String>, model: String) -> Self {
        Self {
            http,
            api_key,
            model,
        }
    }
}

//=========================================================================================
// `CompletionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CompletionService for GeminiAdapter {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PortError::Unexpected("GOOGLE_API_KEY is not set".to_string()))?;

        let url = format!("{}/{}:generateContent", GENERATE_BASE_URL, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json::<GenerateResponse>()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        response.text().ok_or_else(|| {
            PortError::Unexpected("Gemini response contained no text content.".to_string())
        })
    }
}
