//! Session cookie authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::session::SessionError;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;

/// Decodes the session cookie into a [`CurrentUser`].
pub fn authenticate(state: &AppState, headers: &axum::http::HeaderMap) -> Result<CurrentUser, ApiError> {
    let token = state
        .cookies
        .extract_session(headers)
        .ok_or_else(ApiError::no_session)?;

    let user = state.sessions.verify(token).map_err(|e| {
        match e {
            SessionError::Expired => tracing::debug!("Session expired"),
            other => tracing::debug!(error = %other, "Session rejected"),
        }
        ApiError::no_session()
    })?;

    CurrentUser::try_from(user).map_err(|e| {
        tracing::warn!(error = %e, "Session carries an unknown role");
        ApiError::no_session()
    })
}

/// Rejects requests without a valid session cookie and stores the
/// session user in the request extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}
