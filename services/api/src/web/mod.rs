pub mod auth;
pub mod generate;
pub mod learning;
pub mod lessons;
pub mod llm;
pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::require_auth;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// Upload ceiling for multipart lesson materials.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Builds every API route over the shared state. CORS and Swagger UI are
/// layered on by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/reset-password", post(auth::reset_password_handler))
        .route("/auth/recover", post(auth::recover_handler))
        .route(
            "/api/generate-lesson",
            post(generate::generate_lesson_handler).fallback(rest::method_not_allowed),
        )
        .route(
            "/api/llm",
            post(llm::llm_handler).fallback(rest::method_not_allowed),
        )
        .route("/api/quiz", get(learning::quiz_handler))
        .route("/api/quiz/submit", post(learning::submit_quiz_handler))
        .route("/api/insights", get(learning::insights_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/api/lessons",
            get(lessons::list_lessons_handler)
                .post(lessons::create_lesson_handler)
                .fallback(|| async { rest::method_not_allowed_with_allow("GET, POST") }),
        )
        .route("/api/lessons/upload", post(lessons::upload_lesson_handler))
        .route("/api/lessons/{id}", get(lessons::get_lesson_handler))
        .route("/auth/update-password", post(auth::update_password_handler))
        .route("/auth/session", get(auth::current_session_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}
