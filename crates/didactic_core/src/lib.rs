pub mod auth_events;
pub mod domain;
pub mod insights;
pub mod lenient;
pub mod lesson_prompt;
pub mod ports;
pub mod quiz;

pub use auth_events::{AuthEvent, AuthEventHub, AuthEventKind, SessionWatcher, Subscription};
pub use domain::{
    AuthSession, Lesson, LessonContent, LessonFile, LessonPlan, User, UserCredentials,
};
pub use ports::{
    CompletionService, DatabaseService, FileStorageService, NewLesson, NewLessonFile, PortError,
    PortResult,
};
