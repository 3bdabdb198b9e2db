//! crates/didactic_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or LLM vendors.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AuthSession, Lesson, LessonFile, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Write Models
//=========================================================================================

/// The fields required to insert a lesson row.
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title: String,
    pub content: String,
    pub user_id: Option<Uuid>,
}

/// The fields required to insert a lesson-file metadata row.
#[derive(Debug, Clone)]
pub struct NewLessonFile {
    pub lesson_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Auth Methods ---
    async fn create_user_with_email(&self, email: &str, hashed_password: &str)
        -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn update_password_hash(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()>;

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the session if it exists and has not expired, otherwise `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    async fn create_password_reset(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Consumes a reset token, returning its user. Expired or used tokens are `Unauthorized`.
    async fn consume_password_reset(&self, token: &str) -> PortResult<Uuid>;

    // --- Lesson Management ---

    /// All lessons, newest first.
    async fn list_lessons(&self) -> PortResult<Vec<Lesson>>;

    async fn get_lesson_by_id(&self, lesson_id: Uuid) -> PortResult<Lesson>;

    async fn create_lesson(&self, lesson: NewLesson) -> PortResult<Lesson>;

    async fn create_lesson_file(&self, file: NewLessonFile) -> PortResult<LessonFile>;

    async fn get_files_for_lesson(&self, lesson_id: Uuid) -> PortResult<Vec<LessonFile>>;
}

#[async_trait]
pub trait FileStorageService: Send + Sync {
    /// Stores a blob under `path`. Existing blobs at the same path are not overwritten.
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> PortResult<()>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends a single-turn prompt and returns the model's raw text.
    async fn complete(&self, prompt: &str) -> PortResult<String>;
}
