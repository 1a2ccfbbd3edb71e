//! Session user extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use domain::models::Role;
use shared::session::SessionUser;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::rbac;
use crate::middleware::session::authenticate;

/// Authenticated caller, taken from the session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: SessionUser,
    pub role: Role,
}

impl CurrentUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    /// Fails with 403 unless the caller's role is in `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        let result = rbac::authorize(self.role, allowed);
        if result.is_err() {
            tracing::info!(user_id = %self.user.id, role = %self.role, "Role not allowed");
        }
        result
    }
}

impl TryFrom<SessionUser> for CurrentUser {
    type Error = String;

    fn try_from(user: SessionUser) -> Result<Self, Self::Error> {
        let role = user.role.parse::<Role>()?;
        Ok(Self { user, role })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }
        authenticate(state, &parts.headers)
    }
}
