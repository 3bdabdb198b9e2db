//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: signup, login, logout, password reset and update,
//! and the current-session lookup. Every state change is published on the
//! shared `AuthEventHub`.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use didactic_core::auth_events::{AuthEvent, AuthEventKind};
use didactic_core::domain::{AuthSession, User};
use didactic_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::session_cookie;
use crate::web::rest::{api_error, ApiJson, HandlerError};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct RecoverRequest {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
}

impl From<&User> for AuthResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> Result<String, HandlerError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password")
        })
}

fn verify_password(password: &str, hashed: &str) -> Result<bool, HandlerError> {
    let parsed_hash = PasswordHash::new(hashed).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn session_cookie_header(session: &AuthSession, max_age_seconds: i64) -> String {
    format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session.id, max_age_seconds
    )
}

/// Creates and stores a fresh auth session for `user_id`.
async fn open_session(state: &AppState, user_id: Uuid) -> Result<AuthSession, HandlerError> {
    let session = AuthSession {
        id: Uuid::new_v4().to_string(),
        user_id,
        expires_at: Utc::now() + state.auth_settings.session_ttl,
    };

    state
        .db
        .create_auth_session(&session.id, session.user_id, session.expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
        })?;

    Ok(session)
}

/// Publishes the event and builds the `{ user_id, email }` + cookie response.
fn signed_in_response(
    state: &AppState,
    status: StatusCode,
    kind: AuthEventKind,
    user: User,
    session: AuthSession,
) -> impl IntoResponse {
    let cookie = session_cookie_header(&session, state.auth_settings.session_ttl.num_seconds());
    let body = AuthResponse::from(&user);

    state.auth_events.publish(&AuthEvent {
        kind,
        user,
        session: Some(session),
    });

    (status, [(header::SET_COOKIE, cookie)], Json(body))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request", body = crate::web::rest::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Email and password are required",
        ));
    }

    let password_hash = hash_password(&req.password)?;

    let user = state
        .db
        .create_user_with_email(req.email.trim(), &password_hash)
        .await
        .map_err(|e| match e {
            PortError::InvalidInput(message) => api_error(StatusCode::BAD_REQUEST, message),
            other => {
                error!("Failed to create user: {:?}", other);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user")
            }
        })?;

    let session = open_session(&state, user.user_id).await?;
    info!("New account created for {}", user.email);

    Ok(signed_in_response(
        &state,
        StatusCode::CREATED,
        AuthEventKind::SignedIn,
        user,
        session,
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = crate::web::rest::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_creds = state
        .db
        .get_user_by_email(req.email.trim())
        .await
        .map_err(|e| match e {
            PortError::NotFound(_) => {
                api_error(StatusCode::UNAUTHORIZED, "Invalid login credentials")
            }
            other => {
                error!("Failed to get user: {:?}", other);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Authentication error")
            }
        })?;

    if !verify_password(&req.password, &user_creds.hashed_password)? {
        return Err(api_error(
            StatusCode::UNAUTHORIZED,
            "Invalid login credentials",
        ));
    }

    let session = open_session(&state, user_creds.user_id).await?;
    let user = User {
        user_id: user_creds.user_id,
        email: user_creds.email,
    };

    Ok(signed_in_response(
        &state,
        StatusCode::OK,
        AuthEventKind::SignedIn,
        user,
        session,
    ))
}

/// POST /auth/logout - Logout and invalidate session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, HandlerError> {
    let auth_session_id = session_cookie(&headers)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "No session found"))?;

    // An already-expired session is still deleted; there is just nobody to notify.
    let signed_out_user = match state.db.validate_auth_session(auth_session_id).await {
        Ok(session) => state.db.get_user_by_id(session.user_id).await.ok(),
        Err(_) => None,
    };

    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout")
        })?;

    if let Some(user) = signed_out_user {
        state.auth_events.publish(&AuthEvent {
            kind: AuthEventKind::SignedOut,
            user,
            session: None,
        });
    }

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// POST /auth/reset-password - Issue a password recovery link
///
/// Always answers 200 so the response does not reveal whether the email is registered.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Recovery link issued if the account exists", body = MessageResponse),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn reset_password_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let sent = Json(MessageResponse {
        message: "Check your email for the password reset link".to_string(),
    });

    let user = match state.db.get_user_by_email(req.email.trim()).await {
        Ok(user) => user,
        Err(PortError::NotFound(_)) => {
            warn!("Password reset requested for unknown email");
            return Ok(sent);
        }
        Err(e) => {
            error!("Failed to look up user for password reset: {:?}", e);
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to start password reset",
            ));
        }
    };

    let token = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + state.auth_settings.reset_token_ttl;
    state
        .db
        .create_password_reset(&token, user.user_id, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to store password reset token: {:?}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to start password reset",
            )
        })?;

    info!(
        "Password recovery link for {}: {}/auth/reset-password?token={}",
        user.email, state.auth_settings.public_url, token
    );

    Ok(sent)
}

/// POST /auth/recover - Exchange a recovery token for a session
#[utoipa::path(
    post,
    path = "/auth/recover",
    request_body = RecoverRequest,
    responses(
        (status = 200, description = "Recovery session opened", body = AuthResponse),
        (status = 401, description = "Invalid or expired token", body = crate::web::rest::ErrorBody),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn recover_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RecoverRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let user_id = state
        .db
        .consume_password_reset(&req.token)
        .await
        .map_err(|e| match e {
            PortError::Unauthorized | PortError::NotFound(_) => api_error(
                StatusCode::UNAUTHORIZED,
                "Recovery link is invalid or has expired",
            ),
            other => {
                error!("Failed to consume password reset: {:?}", other);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to recover account")
            }
        })?;

    let user = state.db.get_user_by_id(user_id).await.map_err(|e| {
        error!("Failed to load recovering user: {:?}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to recover account")
    })?;
    let session = open_session(&state, user_id).await?;

    Ok(signed_in_response(
        &state,
        StatusCode::OK,
        AuthEventKind::PasswordRecovery,
        user,
        session,
    ))
}

/// POST /auth/update-password - Change the signed-in user's password
#[utoipa::path(
    post,
    path = "/auth/update-password",
    request_body = UpdatePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MessageResponse),
        (status = 400, description = "Empty password", body = crate::web::rest::ErrorBody),
        (status = 401, description = "No active session"),
        (status = 500, description = "Internal server error", body = crate::web::rest::ErrorBody)
    )
)]
pub async fn update_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    ApiJson(req): ApiJson<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if req.password.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Password is required"));
    }

    let password_hash = hash_password(&req.password)?;
    state
        .db
        .update_password_hash(session.user_id, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to update password: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update password")
        })?;

    match state.db.get_user_by_id(session.user_id).await {
        Ok(user) => state.auth_events.publish(&AuthEvent {
            kind: AuthEventKind::UserUpdated,
            user,
            session: Some(session),
        }),
        Err(e) => warn!("Password updated but user lookup failed: {:?}", e),
    }

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

/// GET /auth/session - The user behind the current session cookie
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current user", body = AuthResponse),
        (status = 401, description = "No active session")
    )
)]
pub async fn current_session_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HandlerError> {
    let user = state.db.get_user_by_id(session.user_id).await.map_err(|e| {
        error!("Failed to load session user: {:?}", e);
        api_error(StatusCode::UNAUTHORIZED, "No active session")
    })?;
    Ok(Json(AuthResponse::from(&user)))
}
