//! Login, logout and session lookup.

use axum::{extract::State, http::HeaderMap, Json};
use domain::models::profile::LoginRequest;
use domain::models::Envelope;
use persistence::repositories::ProfileRepository;
use serde::Serialize;
use shared::session::SessionUser;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::metrics::record_login;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub usuario: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct Empty {}

/// Log in with email or DNI plus password.
///
/// POST /api/auth/login
///
/// Credentials are checked by the `validar_credenciales_perfil` database
/// function. On success the signed session cookie is set.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<Envelope<SessionResponse>>), ApiError> {
    request.validate()?;

    let repo = ProfileRepository::new(state.db.clone());
    let profile = match repo
        .verify_credentials(request.identificador.trim(), &request.password)
        .await
    {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            record_login("invalid_credentials");
            info!("Login rejected");
            return Err(ApiError::Unauthorized(
                "Usuario o contraseña incorrectos".into(),
            ));
        }
        Err(e) => {
            record_login("error");
            return Err(e.into());
        }
    };

    let usuario = SessionUser {
        id: profile.id,
        nombre: profile.nombre_completo,
        correo: profile.correo,
        dni: profile.dni,
        role: profile.rol.as_str().to_string(),
    };
    let token = state
        .sessions
        .issue(&usuario)
        .map_err(|e| ApiError::Internal(format!("Failed to issue session: {}", e)))?;

    let mut headers = HeaderMap::new();
    state.cookies.add_session_cookie(&mut headers, &token);

    record_login("success");
    info!(user_id = %usuario.id, role = %usuario.role, "User logged in");

    Ok((headers, Json(Envelope::new(SessionResponse { usuario }))))
}

/// Clear the session cookie.
///
/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<Envelope<Empty>>) {
    let mut headers = HeaderMap::new();
    state.cookies.add_clear_cookie(&mut headers);
    (headers, Json(Envelope::new(Empty {})))
}

/// Current session user.
///
/// GET /api/auth/session
pub async fn session(current: CurrentUser) -> Json<Envelope<SessionResponse>> {
    Json(Envelope::new(SessionResponse {
        usuario: current.user,
    }))
}
