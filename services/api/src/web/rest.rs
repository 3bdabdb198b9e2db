//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification and the JSON
//! error body every REST handler shares.

use crate::web::{auth, generate, learning, lessons, llm};
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::reset_password_handler,
        auth::recover_handler,
        auth::update_password_handler,
        auth::current_session_handler,
        lessons::list_lessons_handler,
        lessons::create_lesson_handler,
        lessons::get_lesson_handler,
        lessons::upload_lesson_handler,
        generate::generate_lesson_handler,
        llm::llm_handler,
        learning::quiz_handler,
        learning::submit_quiz_handler,
        learning::insights_handler,
    ),
    components(
        schemas(
            ErrorBody,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::ResetPasswordRequest,
            auth::RecoverRequest,
            auth::UpdatePasswordRequest,
            auth::AuthResponse,
            auth::MessageResponse,
            lessons::CreateLessonRequest,
            lessons::LessonSummary,
            lessons::LessonResponse,
            lessons::LessonFileResponse,
            lessons::LessonDetailResponse,
            lessons::UploadLessonResponse,
            generate::GenerateLessonResponse,
            llm::LlmRequest,
            llm::LlmResponse,
            learning::QuizQuestionView,
            learning::QuizView,
            learning::QuizSubmission,
            learning::QuizResult,
            learning::InsightsResponse,
        )
    ),
    tags(
        (name = "Didactic API", description = "Lessons, lesson generation and LLM proxy endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Error Body
//=========================================================================================

/// The `{ "error": "..." }` body returned by every failing request.
#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorBody {
    pub error: String,
}

pub type HandlerError = (StatusCode, Json<ErrorBody>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

//=========================================================================================
// JSON Body Extractor
//=========================================================================================

/// `Json<T>` whose rejections (bad syntax, wrong field types, missing or wrong
/// Content-Type) answer 400 with an `{ "error": ... }` body.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> HandlerError {
    debug!("Rejected request body: {}", rejection.body_text());
    api_error(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

/// Method fallback for POST-only routes.
pub async fn method_not_allowed() -> HandlerError {
    api_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Builds a 405 that also advertises the accepted methods.
pub fn method_not_allowed_with_allow(allow: &'static str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        Json(ErrorBody {
            error: "Method not allowed".to_string(),
        }),
    )
        .into_response()
}
