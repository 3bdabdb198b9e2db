//! services/api/src/web/generate.rs
//!
//! The lesson generation endpoint: one prompt, one fixed provider, raw text back.

use axum::{extract::State, http::StatusCode, Json};
use bytes::Bytes;
use didactic_core::lesson_prompt::LessonRequest;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::web::rest::{api_error, HandlerError};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct GenerateLessonResponse {
    #[serde(rename = "lessonPlan")]
    pub lesson_plan: String,
}

/// Generate a lesson plan for a topic.
///
/// The body carries `topic`, `background`, `depth`, `preparation`, `resources`
/// and optional `files` metadata. File metadata is accepted but not sent to the model.
/// The body is read as JSON whatever the Content-Type; an empty body is an empty form.
#[utoipa::path(
    post,
    path = "/api/generate-lesson",
    request_body(content_type = "application/json", description = "topic, background, depth, preparation, resources, files"),
    responses(
        (status = 200, description = "Raw lesson plan text", body = GenerateLessonResponse),
        (status = 400, description = "Body is not a JSON object", body = crate::web::rest::ErrorBody),
        (status = 405, description = "Method not allowed", body = crate::web::rest::ErrorBody),
        (status = 500, description = "Provider failure", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn generate_lesson_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GenerateLessonResponse>, HandlerError> {
    let req = parse_lesson_request(&body)?;
    info!(
        "Generating lesson plan for topic '{}' ({} attached files ignored)",
        req.topic,
        req.files.len()
    );

    let lesson_plan = state
        .lesson_generator
        .complete(&req.build_prompt())
        .await
        .map_err(|e| {
            error!("Error generating lesson plan: {:?}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error generating lesson plan",
            )
        })?;

    Ok(Json(GenerateLessonResponse { lesson_plan }))
}

fn parse_lesson_request(body: &[u8]) -> Result<LessonRequest, HandlerError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(LessonRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_an_empty_form() {
        let req = parse_lesson_request(b"").expect("empty body accepted");
        assert_eq!(req.topic, "");
        assert!(parse_lesson_request(b"  \n").is_ok());
    }

    #[test]
    fn non_object_body_is_a_bad_request() {
        let (status, Json(body)) = parse_lesson_request(b"topic=optics").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.starts_with("Invalid request body"));
    }
}
