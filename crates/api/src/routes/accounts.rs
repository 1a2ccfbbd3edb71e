//! Profile (account) administration.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::profile::{CreateProfileRequest, ListProfilesQuery, UpdateProfileRequest};
use domain::models::{Envelope, Profile};
use persistence::entities::{NewProfileEntity, ProfilePatch};
use persistence::repositories::{ProfileFilter, ProfileRepository};
use serde::Serialize;
use shared::pagination::{PageInfo, PageRequest};
use shared::validation::normalize_dni;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;
use crate::routes::DeletedResponse;

const DUPLICATE_ACCOUNT: &str = "Ya existe una cuenta con ese correo o DNI";

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub cuentas: Vec<Profile>,
    pub paginacion: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub cuenta: Profile,
}

/// List profiles.
///
/// GET /api/cuentas?rol=&q=&page=&per_page=
pub async fn list_accounts(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ListProfilesQuery>,
) -> Result<Json<Envelope<AccountsResponse>>, ApiError> {
    current.require(rbac::ACCOUNTS)?;

    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    let filter = ProfileFilter {
        rol: query.rol,
        q: query.q.as_deref(),
    };

    let repo = ProfileRepository::new(state.db.clone());
    let (cuentas, total) = repo.list(&filter, &page).await?;

    Ok(Json(Envelope::new(AccountsResponse {
        cuentas,
        paginacion: PageInfo::new(&page, total),
    })))
}

/// Create a profile.
///
/// POST /api/cuentas
pub async fn create_account(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Envelope<AccountResponse>>), ApiError> {
    current.require(rbac::ACCOUNTS)?;
    request.validate()?;

    let row = NewProfileEntity {
        nombre_completo: request.nombre_completo.trim().to_string(),
        correo: request.correo.trim().to_lowercase(),
        dni: normalize_dni(&request.dni),
        telefono: request
            .telefono
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
        password: request.password,
        rol: request.rol,
    };

    let repo = ProfileRepository::new(state.db.clone());
    let cuenta = repo
        .create(&row)
        .await
        .map_err(|e| ApiError::upstream_conflict(e, DUPLICATE_ACCOUNT))?;

    info!(
        profile_id = %cuenta.id,
        rol = %cuenta.rol,
        user_id = %current.id(),
        "Account created"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(AccountResponse { cuenta })),
    ))
}

/// Partially update a profile.
///
/// PATCH /api/cuentas/:id
pub async fn update_account(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Envelope<AccountResponse>>, ApiError> {
    current.require(rbac::ACCOUNTS)?;
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No hay cambios para aplicar".into()));
    }

    let patch = ProfilePatch {
        nombre_completo: request.nombre_completo.map(|n| n.trim().to_string()),
        correo: request.correo.map(|c| c.trim().to_lowercase()),
        dni: request.dni.as_deref().map(normalize_dni),
        telefono: request.telefono.map(|t| t.trim().to_string()),
        password: request.password,
        rol: request.rol,
    };

    let repo = ProfileRepository::new(state.db.clone());
    let cuenta = repo
        .update(id, &patch)
        .await
        .map_err(|e| ApiError::upstream_conflict(e, DUPLICATE_ACCOUNT))?
        .ok_or_else(|| ApiError::NotFound("Cuenta no encontrada".into()))?;

    info!(profile_id = %id, user_id = %current.id(), "Account updated");

    Ok(Json(Envelope::new(AccountResponse { cuenta })))
}

/// Delete a profile.
///
/// DELETE /api/cuentas/:id
pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<DeletedResponse>>, ApiError> {
    current.require(rbac::ACCOUNTS)?;
    if id == current.id() {
        return Err(ApiError::Validation(
            "No podés eliminar tu propia cuenta".into(),
        ));
    }

    let repo = ProfileRepository::new(state.db.clone());
    if !repo.delete(id).await? {
        return Err(ApiError::NotFound("Cuenta no encontrada".into()));
    }

    info!(profile_id = %id, user_id = %current.id(), "Account deleted");

    Ok(Json(Envelope::new(DeletedResponse { id })))
}
