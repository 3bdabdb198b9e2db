//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use didactic_core::domain::{AuthSession, Lesson, LessonFile, User, UserCredentials};
use didactic_core::ports::{DatabaseService, NewLesson, NewLessonFile, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            expires_at: self.expires_at,
        }
    }
}

#[derive(FromRow)]
struct LessonRecord {
    id: Uuid,
    title: String,
    content: String,
    user_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}
impl LessonRecord {
    fn to_domain(self) -> Lesson {
        Lesson {
            id: self.id,
            title: self.title,
            content: self.content,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct LessonFileRecord {
    id: Uuid,
    lesson_id: Uuid,
    file_name: String,
    file_path: String,
    file_type: String,
}
impl LessonFileRecord {
    fn to_domain(self) -> LessonFile {
        LessonFile {
            id: self.id,
            lesson_id: self.lesson_id,
            file_name: self.file_name,
            file_path: self.file_path,
            file_type: self.file_type,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::InvalidInput("User already registered".to_string())
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT user_id, email FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        PortError::NotFound(format!("User {} not found", user_id))
                    }
                    _ => unexpected(e),
                })?;
        Ok(record.to_domain())
    }

    async fn update_password_hash(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET hashed_password = $1 WHERE user_id = $2")
            .bind(hashed_password)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, expires_at FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)?;
        Ok(record.to_domain())
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_password_reset(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO password_resets (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn consume_password_reset(&self, token: &str) -> PortResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>(
            "UPDATE password_resets SET used_at = NOW() \
             WHERE token = $1 AND used_at IS NULL AND expires_at > NOW() \
             RETURNING user_id",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or(PortError::Unauthorized)
    }

    async fn list_lessons(&self) -> PortResult<Vec<Lesson>> {
        let records = sqlx::query_as::<_, LessonRecord>(
            "SELECT id, title, content, user_id, created_at FROM lessons ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_lesson_by_id(&self, lesson_id: Uuid) -> PortResult<Lesson> {
        let record = sqlx::query_as::<_, LessonRecord>(
            "SELECT id, title, content, user_id, created_at FROM lessons WHERE id = $1",
        )
        .bind(lesson_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Lesson {} not found", lesson_id))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_lesson(&self, lesson: NewLesson) -> PortResult<Lesson> {
        let record = sqlx::query_as::<_, LessonRecord>(
            "INSERT INTO lessons (id, title, content, user_id) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, content, user_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&lesson.title)
        .bind(&lesson.content)
        .bind(lesson.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn create_lesson_file(&self, file: NewLessonFile) -> PortResult<LessonFile> {
        let record = sqlx::query_as::<_, LessonFileRecord>(
            "INSERT INTO lesson_files (id, lesson_id, file_name, file_path, file_type) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, lesson_id, file_name, file_path, file_type",
        )
        .bind(Uuid::new_v4())
        .bind(file.lesson_id)
        .bind(&file.file_name)
        .bind(&file.file_path)
        .bind(&file.file_type)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_files_for_lesson(&self, lesson_id: Uuid) -> PortResult<Vec<LessonFile>> {
        let records = sqlx::query_as::<_, LessonFileRecord>(
            "SELECT id, lesson_id, file_name, file_path, file_type FROM lesson_files \
             WHERE lesson_id = $1 ORDER BY created_at ASC",
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
