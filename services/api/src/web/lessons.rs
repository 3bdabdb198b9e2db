//! services/api/src/web/lessons.rs
//!
//! Lesson endpoints and the create-with-attachments flow.
//!
//! Attachments are uploaded one after another once the lesson row exists. A
//! failed upload is logged and skipped; the lesson and any earlier attachments
//! stay in place.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use didactic_core::domain::{truncate_with_ellipsis, Lesson, LessonContent, LessonFile};
use didactic_core::lenient::deserialize_truthy_text;
use didactic_core::ports::{NewLesson, NewLessonFile, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::rest::{api_error, ApiJson, HandlerError};
use crate::web::state::AppState;

/// Number of content characters kept in list previews.
pub const PREVIEW_CHARS: usize = 100;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateLessonRequest {
    #[serde(default, deserialize_with = "deserialize_truthy_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_truthy_text")]
    pub content: Option<String>,
}

/// One entry in the lesson list; `content` is a truncated preview.
#[derive(Serialize, ToSchema)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct LessonResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Lesson> for LessonResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            title: lesson.title,
            content: lesson.content,
            user_id: lesson.user_id,
            created_at: lesson.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LessonFileResponse {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
}

impl From<LessonFile> for LessonFileResponse {
    fn from(file: LessonFile) -> Self {
        Self {
            id: file.id,
            lesson_id: file.lesson_id,
            file_name: file.file_name,
            file_path: file.file_path,
            file_type: file.file_type,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LessonDetailResponse {
    pub lesson: LessonResponse,
    /// Decoded content: `{"kind":"structured","plan":{..}}` or `{"kind":"plain","text":".."}`.
    #[schema(value_type = Object)]
    pub parsed_content: LessonContent,
    pub preview: String,
    pub files: Vec<LessonFileResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct UploadLessonResponse {
    pub lesson: LessonResponse,
    pub files: Vec<LessonFileResponse>,
    /// Names of the attachments whose upload failed.
    pub failed_files: Vec<String>,
}

//=========================================================================================
// Create-with-attachments Flow
//=========================================================================================

/// A file received from the client, not yet stored.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Outcome of `create_lesson_with_files`.
#[derive(Debug)]
pub struct CreatedLesson {
    pub lesson: Lesson,
    pub files: Vec<LessonFile>,
    pub failed_files: Vec<String>,
}

/// Inserts the lesson, then uploads and records each attachment in order.
///
/// Only the lesson insert can fail the call. Per-file failures (storage or
/// metadata insert) are logged and collected in `failed_files`.
pub async fn create_lesson_with_files(
    state: &AppState,
    user_id: Uuid,
    title: String,
    content: String,
    uploads: Vec<UploadedFile>,
) -> PortResult<CreatedLesson> {
    let lesson = state
        .db
        .create_lesson(NewLesson {
            title,
            content,
            user_id: Some(user_id),
        })
        .await?;

    let mut files = Vec::new();
    let mut failed_files = Vec::new();

    for upload in uploads {
        let file_path = LessonFile::storage_path(user_id, lesson.id, &upload.file_name);

        if let Err(e) = state
            .storage
            .upload(&file_path, upload.data, &upload.content_type)
            .await
        {
            error!("Error uploading file {}: {:?}", file_path, e);
            failed_files.push(upload.file_name);
            continue;
        }

        let record = state
            .db
            .create_lesson_file(NewLessonFile {
                lesson_id: lesson.id,
                file_name: upload.file_name.clone(),
                file_path,
                file_type: upload.content_type,
            })
            .await;

        match record {
            Ok(file) => files.push(file),
            Err(e) => {
                error!("Error recording file {}: {:?}", upload.file_name, e);
                failed_files.push(upload.file_name);
            }
        }
    }

    info!(
        "Created lesson {} with {} of {} attachments",
        lesson.id,
        files.len(),
        files.len() + failed_files.len()
    );

    Ok(CreatedLesson {
        lesson,
        files,
        failed_files,
    })
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every lesson, newest first, with content truncated to a preview.
#[utoipa::path(
    get,
    path = "/api/lessons",
    responses(
        (status = 200, description = "All lessons, newest first", body = [LessonSummary]),
        (status = 401, description = "No active session"),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn list_lessons_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HandlerError> {
    let lessons = state.db.list_lessons().await.map_err(|e| {
        error!("Error fetching lessons: {:?}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    })?;

    let summaries: Vec<LessonSummary> = lessons
        .into_iter()
        .map(|lesson| LessonSummary {
            id: lesson.id,
            title: lesson.title,
            content: truncate_with_ellipsis(&lesson.content, PREVIEW_CHARS),
        })
        .collect();

    Ok(Json(summaries))
}

/// Create a lesson from a title and content.
#[utoipa::path(
    post,
    path = "/api/lessons",
    request_body = CreateLessonRequest,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 400, description = "Title or content missing", body = crate::web::rest::ErrorBody),
        (status = 401, description = "No active session"),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn create_lesson_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    ApiJson(req): ApiJson<CreateLessonRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let (Some(title), Some(content)) = (required(req.title), required(req.content)) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Title and content are required",
        ));
    };

    let lesson = state
        .db
        .create_lesson(NewLesson {
            title,
            content,
            user_id: Some(user_id),
        })
        .await
        .map_err(|e| {
            error!("Error adding lesson: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create lesson")
        })?;

    info!("Created lesson {}", lesson.id);
    Ok((StatusCode::CREATED, Json(LessonResponse::from(lesson))))
}

/// Fetch a single lesson with its decoded content and attachments.
#[utoipa::path(
    get,
    path = "/api/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "The lesson", body = LessonDetailResponse),
        (status = 401, description = "No active session"),
        (status = 404, description = "No such lesson", body = crate::web::rest::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn get_lesson_handler(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let lesson = state
        .db
        .get_lesson_by_id(lesson_id)
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => api_error(StatusCode::NOT_FOUND, "Lesson not found"),
            other => {
                error!("Error fetching lesson {}: {:?}", lesson_id, other);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        })?;

    let files = state
        .db
        .get_files_for_lesson(lesson_id)
        .await
        .map_err(|e| {
            error!("Error fetching files for lesson {}: {:?}", lesson_id, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        })?;

    let parsed_content = LessonContent::parse(&lesson.content);
    let preview = parsed_content.preview(PREVIEW_CHARS);

    Ok(Json(LessonDetailResponse {
        lesson: lesson.into(),
        parsed_content,
        preview,
        files: files.into_iter().map(Into::into).collect(),
    }))
}

/// Create a lesson and attach uploaded files.
///
/// Accepts multipart/form-data with `title` and `content` text parts and any
/// number of `files` parts.
#[utoipa::path(
    post,
    path = "/api/lessons/upload",
    request_body(content_type = "multipart/form-data", description = "title, content and files parts."),
    responses(
        (status = 201, description = "Lesson created; see failed_files for skipped attachments", body = UploadLessonResponse),
        (status = 400, description = "Title or content missing, or malformed multipart", body = crate::web::rest::ErrorBody),
        (status = 401, description = "No active session"),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn upload_lesson_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut title = None;
    let mut content = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" | "content" => {
                let text = field.text().await.map_err(|e| {
                    api_error(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read field {}: {}", name, e),
                    )
                })?;
                if name == "title" {
                    title = Some(text);
                } else {
                    content = Some(text);
                }
            }
            "files" => {
                let file_name = field.file_name().unwrap_or("untitled").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    api_error(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file bytes: {}", e),
                    )
                })?;
                uploads.push(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let (Some(title), Some(content)) = (required(title), required(content)) else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Title and content are required",
        ));
    };

    let created = create_lesson_with_files(&state, user_id, title, content, uploads)
        .await
        .map_err(|e| {
            error!("Error adding lesson: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create lesson")
        })?;

    Ok((
        StatusCode::CREATED,
        Json(UploadLessonResponse {
            lesson: created.lesson.into(),
            files: created.files.into_iter().map(Into::into).collect(),
            failed_files: created.failed_files,
        }),
    ))
}
