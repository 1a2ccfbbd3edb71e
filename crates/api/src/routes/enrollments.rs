//! Enrollment applications (inscripciones).
//!
//! Families submit a multipart form with applicant data and documents.
//! The row is written first and the documents are uploaded under
//! `<dni>/<application id>_<tag>_<millis>.<ext>`. If any upload fails the
//! stored objects and the row are removed again, so a failed submission
//! leaves nothing behind.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use domain::models::enrollment::{
    EnrollmentDetail, EnrollmentDocument, EnrollmentQuery, UpdateEnrollmentRequest,
};
use domain::models::{EnrollmentApplication, Envelope};
use domain::services::storage_paths::{document_folder, document_path};
use persistence::entities::EnrollmentPatch;
use persistence::repositories::{EnrollmentFilter, EnrollmentRepository};
use serde::Serialize;
use shared::pagination::{PageInfo, PageRequest};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::{metrics::record_enrollment_application, rbac};
use crate::routes::DeletedResponse;
use crate::services::documents::{self, UploadedFile};

#[derive(Debug, Serialize)]
pub struct SubmittedEnrollmentResponse {
    pub inscripcion: EnrollmentApplication,
    pub documentos: Vec<EnrollmentDocument>,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentsResponse {
    pub inscripciones: Vec<EnrollmentApplication>,
    pub paginacion: PageInfo,
}

#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    pub inscripcion: EnrollmentDetail,
}

#[derive(Debug, Serialize)]
pub struct UpdatedEnrollmentResponse {
    pub inscripcion: EnrollmentApplication,
}

fn enrollment_not_found() -> ApiError {
    ApiError::NotFound("Inscripción no encontrada".into())
}

/// Submit an application. Public, rate limited.
///
/// POST /api/inscripciones
pub async fn submit_enrollment(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Envelope<SubmittedEnrollmentResponse>>), ApiError> {
    let limits = &state.config.storage;
    let form = documents::read_enrollment_form(
        &mut multipart,
        limits.max_upload_bytes,
        limits.max_documents,
    )
    .await
    .inspect_err(|_| record_enrollment_application("rejected"))?;

    form.application
        .validate()
        .inspect_err(|_| record_enrollment_application("rejected"))?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let inscripcion = repo
        .create(form.application)
        .await
        .inspect_err(|_| record_enrollment_application("failed"))?;

    let bucket = limits.enrollment_bucket.as_str();
    let started = Utc::now().timestamp_millis();
    let mut uploaded: Vec<EnrollmentDocument> = Vec::with_capacity(form.documents.len());

    for (index, (tag, file)) in form.documents.into_iter().enumerate() {
        let ruta = document_path(
            &inscripcion.estudiante_dni,
            inscripcion.id,
            tag,
            started + index as i64,
            &file.filename,
        );
        let UploadedFile {
            content_type,
            bytes,
            ..
        } = file;

        if let Err(err) = state.storage.upload(bucket, &ruta, bytes, &content_type).await {
            warn!(
                enrollment_id = %inscripcion.id,
                path = %ruta,
                error = %err,
                "Document upload failed, rolling back application"
            );
            rollback_submission(&state, &inscripcion, &uploaded).await;
            record_enrollment_application("failed");
            return Err(err.into());
        }

        let nombre = ruta
            .rsplit_once('/')
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| ruta.clone());
        uploaded.push(EnrollmentDocument {
            nombre,
            ruta,
            tag: Some(tag),
            url: None,
        });
    }

    record_enrollment_application("accepted");
    info!(
        enrollment_id = %inscripcion.id,
        documents = uploaded.len(),
        "Enrollment application received"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(SubmittedEnrollmentResponse {
            inscripcion,
            documentos: uploaded,
        })),
    ))
}

/// Removes what a failed submission already stored. Failures here are
/// logged; the caller reports the original error.
async fn rollback_submission(
    state: &AppState,
    inscripcion: &EnrollmentApplication,
    uploaded: &[EnrollmentDocument],
) {
    let paths: Vec<String> = uploaded.iter().map(|d| d.ruta.clone()).collect();
    if let Err(err) = state
        .storage
        .remove(&state.config.storage.enrollment_bucket, &paths)
        .await
    {
        warn!(enrollment_id = %inscripcion.id, error = %err, "Failed to remove uploaded documents");
    }

    let repo = EnrollmentRepository::new(state.db.clone());
    if let Err(err) = repo.delete(inscripcion.id).await {
        warn!(enrollment_id = %inscripcion.id, error = %err, "Failed to delete application row");
    }
}

/// List applications, newest first.
///
/// GET /api/inscripciones?estado=&q=&page=&per_page=
pub async fn list_enrollments(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<EnrollmentQuery>,
) -> Result<Json<Envelope<EnrollmentsResponse>>, ApiError> {
    current.require(rbac::ENROLLMENTS_READ)?;

    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    let filter = EnrollmentFilter {
        estado: query.estado,
        q: query.q.as_deref(),
    };

    let repo = EnrollmentRepository::new(state.db.clone());
    let (inscripciones, total) = repo.list(&filter, &page).await?;

    Ok(Json(Envelope::new(EnrollmentsResponse {
        inscripciones,
        paginacion: PageInfo::new(&page, total),
    })))
}

/// One application with signed links to its documents.
///
/// GET /api/inscripciones/:id
pub async fn get_enrollment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<EnrollmentResponse>>, ApiError> {
    current.require(rbac::ENROLLMENTS_READ)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let application = repo.find_by_id(id).await?.ok_or_else(enrollment_not_found)?;

    let limits = &state.config.storage;
    let folder = document_folder(&application.estudiante_dni);
    let objects = state
        .storage
        .list(&limits.enrollment_bucket, &folder)
        .await?;

    let mut documentos = documents::documents_for_application(objects, &folder, &id.to_string());
    for doc in documentos.iter_mut() {
        match state
            .storage
            .create_signed_url(&limits.enrollment_bucket, &doc.ruta, limits.signed_url_ttl_secs)
            .await
        {
            Ok(url) => doc.url = Some(url),
            Err(err) => warn!(path = %doc.ruta, error = %err, "Could not sign document URL"),
        }
    }

    Ok(Json(Envelope::new(EnrollmentResponse {
        inscripcion: EnrollmentDetail {
            application,
            documentos,
        },
    })))
}

/// Change status or notes.
///
/// PATCH /api/inscripciones/:id
pub async fn update_enrollment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEnrollmentRequest>,
) -> Result<Json<Envelope<UpdatedEnrollmentResponse>>, ApiError> {
    current.require(rbac::ENROLLMENTS_WRITE)?;
    request.validate()?;
    if request.estado.is_none() && request.observaciones.is_none() {
        return Err(ApiError::Validation("No hay cambios para aplicar".into()));
    }

    let patch = EnrollmentPatch {
        estado: request.estado,
        observaciones: request.observaciones.map(|o| o.trim().to_string()),
    };
    let repo = EnrollmentRepository::new(state.db.clone());
    let inscripcion = repo.update(id, &patch).await?.ok_or_else(enrollment_not_found)?;

    info!(
        enrollment_id = %id,
        estado = %inscripcion.estado,
        user_id = %current.id(),
        "Enrollment application updated"
    );

    Ok(Json(Envelope::new(UpdatedEnrollmentResponse { inscripcion })))
}

/// Delete an application and its documents.
///
/// DELETE /api/inscripciones/:id
pub async fn delete_enrollment(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<DeletedResponse>>, ApiError> {
    current.require(rbac::ENROLLMENTS_DELETE)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let removed = repo.delete(id).await?.ok_or_else(enrollment_not_found)?;

    let bucket = &state.config.storage.enrollment_bucket;
    let folder = document_folder(&removed.estudiante_dni);
    match state.storage.list(bucket, &folder).await {
        Ok(objects) => {
            let paths: Vec<String> =
                documents::documents_for_application(objects, &folder, &id.to_string())
                    .into_iter()
                    .map(|d| d.ruta)
                    .collect();
            if let Err(err) = state.storage.remove(bucket, &paths).await {
                warn!(enrollment_id = %id, error = %err, "Failed to remove enrollment documents");
            }
        }
        Err(err) => warn!(enrollment_id = %id, error = %err, "Failed to list enrollment documents"),
    }

    info!(enrollment_id = %id, user_id = %current.id(), "Enrollment application deleted");

    Ok(Json(Envelope::new(DeletedResponse { id })))
}
