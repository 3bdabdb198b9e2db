//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// Reads the auth session id from the `session` cookie.
pub fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .filter(|id| !id.is_empty())
}

/// Middleware that validates the auth session cookie.
///
/// If valid, inserts the `AuthSession` and its `user_id` into request extensions
/// for handlers to use. If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_session_id = session_cookie(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let session = state
        .db
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            warn!("Rejected auth session: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    req.extensions_mut().insert(session.user_id);
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(cookie).expect("valid header"),
        );
        headers
    }

    #[test]
    fn finds_session_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; session=abc123; other=1");
        assert_eq!(session_cookie(&headers), Some("abc123"));
    }

    #[test]
    fn missing_or_cleared_cookie_yields_none() {
        assert_eq!(session_cookie(&HeaderMap::new()), None);
        assert_eq!(session_cookie(&headers_with_cookie("theme=dark")), None);
        assert_eq!(session_cookie(&headers_with_cookie("session=")), None);
    }
}
