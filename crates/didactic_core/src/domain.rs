//! crates/didactic_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or HTTP framework.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::lenient::{text, text_list};

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// A stored unit of learning content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Metadata for a blob uploaded alongside a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonFile {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
}

impl LessonFile {
    /// Storage key for a lesson attachment: `{user_id}/{lesson_id}/{file_name}`.
    pub fn storage_path(user_id: Uuid, lesson_id: Uuid, file_name: &str) -> String {
        format!("{}/{}/{}", user_id, lesson_id, file_name)
    }
}

/// The structured shape an LLM-generated lesson plan is expected to take.
///
/// Every field is optional on decode; generated text routinely omits sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LessonPlan {
    pub introduction: Option<String>,
    pub key_concepts: Vec<String>,
    pub detailed_explanation: Option<String>,
    pub examples_and_applications: Vec<String>,
    pub practice_exercises: Vec<String>,
    pub summary_and_next_steps: Option<String>,
}

impl LessonPlan {
    /// Reads each section on its own. A section of the wrong type is dropped
    /// without affecting its siblings.
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            introduction: text(fields.get("introduction")),
            key_concepts: text_list(fields.get("keyConcepts")),
            detailed_explanation: text(fields.get("detailedExplanation")),
            examples_and_applications: text_list(fields.get("examplesAndApplications")),
            practice_exercises: text_list(fields.get("practiceExercises")),
            summary_and_next_steps: text(fields.get("summaryAndNextSteps")),
        }
    }

    fn is_empty(&self) -> bool {
        self.introduction.is_none()
            && self.key_concepts.is_empty()
            && self.detailed_explanation.is_none()
            && self.examples_and_applications.is_empty()
            && self.practice_exercises.is_empty()
            && self.summary_and_next_steps.is_none()
    }
}

/// A typed view over a lesson's stored content string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LessonContent {
    Structured { plan: LessonPlan },
    Plain { text: String },
}

impl LessonContent {
    /// Placeholder shown when a lesson has no introduction to preview.
    pub const NO_INTRODUCTION: &'static str = "No introduction available";
    /// Placeholder shown when the stored content is not JSON at all.
    pub const CONTENT_UNAVAILABLE: &'static str = "Content not available";

    /// Decodes stored content. Anything that is not a JSON object carrying at
    /// least one usable lesson-plan section is kept as plain text.
    pub fn parse(raw: &str) -> Self {
        let plan = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => LessonPlan::from_fields(&fields),
            _ => LessonPlan::default(),
        };
        if plan.is_empty() {
            LessonContent::Plain {
                text: raw.to_string(),
            }
        } else {
            LessonContent::Structured { plan }
        }
    }

    /// Short preview of the introduction, truncated to `max_chars` with `...` appended.
    pub fn preview(&self, max_chars: usize) -> String {
        match self {
            LessonContent::Structured { plan } => match plan.introduction.as_deref() {
                Some(intro) if !intro.is_empty() => truncate_with_ellipsis(intro, max_chars),
                _ => Self::NO_INTRODUCTION.to_string(),
            },
            // Empty content reads as an empty plan.
            LessonContent::Plain { text }
                if text.trim().is_empty() || serde_json::from_str::<Value>(text).is_ok() =>
            {
                Self::NO_INTRODUCTION.to_string()
            }
            LessonContent::Plain { .. } => Self::CONTENT_UNAVAILABLE.to_string(),
        }
    }
}

/// Keeps the first `max_chars` characters and always appends `...`, even when
/// nothing was cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
