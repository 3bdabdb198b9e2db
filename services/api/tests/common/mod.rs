//! In-memory adapters and request helpers shared by the router tests.

#![allow(dead_code)]

use api_lib::web::{
    self,
    state::{AppState, AuthSettings, LlmProviders},
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};
use didactic_core::auth_events::AuthEventHub;
use didactic_core::domain::{AuthSession, Lesson, LessonFile, User, UserCredentials};
use didactic_core::ports::{
    CompletionService, DatabaseService, FileStorageService, NewLesson, NewLessonFile, PortError,
    PortResult,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

//=========================================================================================
// MemoryDb
//=========================================================================================

#[derive(Default)]
struct Tables {
    users: Vec<UserCredentials>,
    sessions: HashMap<String, AuthSession>,
    resets: HashMap<String, (Uuid, DateTime<Utc>, bool)>,
    lessons: Vec<Lesson>,
    files: Vec<LessonFile>,
    clock: i64,
}

#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    pub fn lessons(&self) -> Vec<Lesson> {
        self.tables.lock().unwrap().lessons.clone()
    }

    pub fn files(&self) -> Vec<LessonFile> {
        self.tables.lock().unwrap().files.clone()
    }

    pub fn reset_tokens(&self) -> Vec<String> {
        self.tables.lock().unwrap().resets.keys().cloned().collect()
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    /// Inserts a lesson with a deterministic, strictly increasing timestamp.
    pub fn seed_lesson(&self, title: &str, content: &str) -> Lesson {
        let mut tables = self.tables.lock().unwrap();
        tables.clock += 1;
        let lesson = Lesson {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            user_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::seconds(tables.clock),
        };
        tables.lessons.push(lesson.clone());
        lesson
    }
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(PortError::InvalidInput(
                "User already registered".to_string(),
            ));
        }
        let creds = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
        };
        tables.users.push(creds.clone());
        Ok(User {
            user_id: creds.user_id,
            email: creds.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(email.to_string()))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| User {
                user_id: u.user_id,
                email: u.email.clone(),
            })
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))
    }

    async fn update_password_hash(&self, user_id: Uuid, hashed_password: &str) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(user_id.to_string()))?;
        user.hashed_password = hashed_password.to_string();
        Ok(())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables.lock().unwrap().sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        self.tables
            .lock()
            .unwrap()
            .sessions
            .get(session_id)
            .filter(|s| s.expires_at > Utc::now())
            .cloned()
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn create_password_reset(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables
            .lock()
            .unwrap()
            .resets
            .insert(token.to_string(), (user_id, expires_at, false));
        Ok(())
    }

    async fn consume_password_reset(&self, token: &str) -> PortResult<Uuid> {
        let mut tables = self.tables.lock().unwrap();
        match tables.resets.get_mut(token) {
            Some((user_id, expires_at, used)) if !*used && *expires_at > Utc::now() => {
                *used = true;
                Ok(*user_id)
            }
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn list_lessons(&self) -> PortResult<Vec<Lesson>> {
        let mut lessons = self.lessons();
        lessons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(lessons)
    }

    async fn get_lesson_by_id(&self, lesson_id: Uuid) -> PortResult<Lesson> {
        self.lessons()
            .into_iter()
            .find(|l| l.id == lesson_id)
            .ok_or_else(|| PortError::NotFound(lesson_id.to_string()))
    }

    async fn create_lesson(&self, lesson: NewLesson) -> PortResult<Lesson> {
        let mut tables = self.tables.lock().unwrap();
        tables.clock += 1;
        let created = Lesson {
            id: Uuid::new_v4(),
            title: lesson.title,
            content: lesson.content,
            user_id: lesson.user_id,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + Duration::seconds(tables.clock),
        };
        tables.lessons.push(created.clone());
        Ok(created)
    }

    async fn create_lesson_file(&self, file: NewLessonFile) -> PortResult<LessonFile> {
        let created = LessonFile {
            id: Uuid::new_v4(),
            lesson_id: file.lesson_id,
            file_name: file.file_name,
            file_path: file.file_path,
            file_type: file.file_type,
        };
        self.tables.lock().unwrap().files.push(created.clone());
        Ok(created)
    }

    async fn get_files_for_lesson(&self, lesson_id: Uuid) -> PortResult<Vec<LessonFile>> {
        Ok(self
            .files()
            .into_iter()
            .filter(|f| f.lesson_id == lesson_id)
            .collect())
    }
}

//=========================================================================================
// FakeStorage
//=========================================================================================

/// Records uploads in memory; any path containing a name in `fail_on` is rejected.
#[derive(Default)]
pub struct FakeStorage {
    pub fail_on: Vec<String>,
    uploads: Mutex<Vec<(String, Bytes, String)>>,
}

impl FakeStorage {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|n| n.to_string()).collect(),
            uploads: Mutex::new(Vec::new()),
        }
    }

    pub fn uploaded_paths(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _, _)| path.clone())
            .collect()
    }
}

#[async_trait]
impl FileStorageService for FakeStorage {
    async fn upload(&self, path: &str, data: Bytes, content_type: &str) -> PortResult<()> {
        if self.fail_on.iter().any(|name| path.ends_with(name.as_str())) {
            return Err(PortError::Unexpected(format!("simulated failure for {}", path)));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((path.to_string(), data, content_type.to_string()));
        Ok(())
    }
}

//=========================================================================================
// FakeCompletion
//=========================================================================================

/// Returns a canned reply (or error) and remembers every prompt it received.
pub struct FakeCompletion {
    reply: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, prompt: &str) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(PortError::Unexpected)
    }
}

//=========================================================================================
// Test Harness
//=========================================================================================

pub struct Harness {
    pub db: Arc<MemoryDb>,
    pub storage: Arc<FakeStorage>,
    pub lesson_generator: Arc<FakeCompletion>,
    pub claude: Arc<FakeCompletion>,
    pub gpt: Arc<FakeCompletion>,
    pub gemini: Arc<FakeCompletion>,
    pub state: Arc<AppState>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_parts(
            FakeStorage::default(),
            FakeCompletion::replying("- Introduction to vectors\n- Matrices"),
        )
    }

    pub fn with_parts(storage: FakeStorage, lesson_generator: FakeCompletion) -> Self {
        let db = Arc::new(MemoryDb::default());
        let storage = Arc::new(storage);
        let lesson_generator = Arc::new(lesson_generator);
        let claude = Arc::new(FakeCompletion::replying("claude says hi"));
        let gpt = Arc::new(FakeCompletion::replying("gpt says hi"));
        let gemini = Arc::new(FakeCompletion::replying("gemini says hi"));

        let state = Arc::new(AppState {
            db: db.clone(),
            storage: storage.clone(),
            auth_events: Arc::new(AuthEventHub::new()),
            auth_settings: AuthSettings::default(),
            lesson_generator: lesson_generator.clone(),
            llm: LlmProviders {
                claude: claude.clone(),
                gpt: gpt.clone(),
                gemini: gemini.clone(),
            },
        });

        Self {
            db,
            storage,
            lesson_generator,
            claude,
            gpt,
            gemini,
            state,
        }
    }

    pub fn app(&self) -> Router {
        web::router(self.state.clone())
    }

    /// Creates a user and a live session directly in the store; returns the cookie value.
    pub async fn signed_in_cookie(&self) -> (Uuid, String) {
        let user = self
            .db
            .create_user_with_email(&format!("{}@example.com", Uuid::new_v4()), "unused")
            .await
            .expect("user created");
        let token = Uuid::new_v4().to_string();
        self.db
            .create_auth_session(&token, user.user_id, Utc::now() + Duration::days(1))
            .await
            .expect("session created");
        (user.user_id, format!("session={}", token))
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app().oneshot(request).await.expect("request failed")
    }
}

pub fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder.body(Body::empty()).expect("failed to build request")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
