//! Teaching material uploads.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use domain::models::Envelope;
use domain::services::storage_paths::material_path;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;
use crate::services::documents;

#[derive(Debug, Serialize)]
pub struct MaterialResponse {
    pub ruta: String,
    pub url: String,
}

/// Upload one file into a folder of the materials bucket.
///
/// POST /api/materiales (multipart: `carpeta`, file)
pub async fn upload_material(
    State(state): State<AppState>,
    current: CurrentUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<MaterialResponse>>), ApiError> {
    current.require(rbac::MATERIALS_UPLOAD)?;

    let limits = &state.config.storage;
    let form = documents::read_material_form(&mut multipart, limits.max_upload_bytes).await?;

    let ruta = material_path(&form.carpeta, Uuid::new_v4(), &form.file.filename);
    let size = form.file.bytes.len();
    state
        .storage
        .upload(
            &limits.materials_bucket,
            &ruta,
            form.file.bytes,
            &form.file.content_type,
        )
        .await?;

    info!(path = %ruta, bytes = size, user_id = %current.id(), "Material uploaded");

    let url = state.storage.public_url(&limits.materials_bucket, &ruta);
    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(MaterialResponse { ruta, url })),
    ))
}
