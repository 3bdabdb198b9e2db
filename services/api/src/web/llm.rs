//! services/api/src/web/llm.rs
//!
//! General LLM proxy: a provider tag plus a prompt, dispatched to one of three vendors.

use axum::{extract::State, http::StatusCode, Json};
use didactic_core::lenient::deserialize_truthy_text;
use didactic_core::ports::CompletionService;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::rest::{api_error, ApiJson, HandlerError};
use crate::web::state::{AppState, LlmProviders};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmModel {
    Claude,
    Gpt,
    Gemini,
}

impl FromStr for LlmModel {
    type Err = ();

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "claude" => Ok(LlmModel::Claude),
            "gpt" => Ok(LlmModel::Gpt),
            "gemini" => Ok(LlmModel::Gemini),
            _ => Err(()),
        }
    }
}

impl LlmProviders {
    pub fn get(&self, model: LlmModel) -> &Arc<dyn CompletionService> {
        match model {
            LlmModel::Claude => &self.claude,
            LlmModel::Gpt => &self.gpt,
            LlmModel::Gemini => &self.gemini,
        }
    }
}

/// Fields are read loosely: `null`, `false`, `0` and `""` count as missing, and
/// other non-string values are taken as their JSON text.
#[derive(Deserialize, ToSchema)]
pub struct LlmRequest {
    /// One of `claude`, `gpt`, `gemini`.
    #[serde(default, deserialize_with = "deserialize_truthy_text")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_truthy_text")]
    pub prompt: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LlmResponse {
    pub result: String,
}

/// Send a prompt to the named provider.
#[utoipa::path(
    post,
    path = "/api/llm",
    request_body = LlmRequest,
    responses(
        (status = 200, description = "Raw completion text", body = LlmResponse),
        (status = 400, description = "Missing fields or unknown model", body = crate::web::rest::ErrorBody),
        (status = 405, description = "Method not allowed", body = crate::web::rest::ErrorBody),
        (status = 500, description = "Provider failure", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn llm_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LlmRequest>,
) -> Result<Json<LlmResponse>, HandlerError> {
    let (Some(tag), Some(prompt)) = (
        req.model.filter(|m| !m.is_empty()),
        req.prompt.filter(|p| !p.is_empty()),
    ) else {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing model or prompt"));
    };

    let model = tag
        .parse::<LlmModel>()
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Invalid model specified"))?;

    let result = state.llm.get(model).complete(&prompt).await.map_err(|e| {
        error!("Error processing LLM request ({:?}): {:?}", model, e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error processing your request",
        )
    })?;

    Ok(Json(LlmResponse { result }))
}
