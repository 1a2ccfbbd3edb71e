//! Subjects and their course, teacher and responsible-staff links.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::subject::{CreateSubjectRequest, ListSubjectsQuery, UpdateSubjectRequest};
use domain::models::{Envelope, Subject};
use persistence::repositories::{SubjectFilter, SubjectRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;
use crate::routes::DeletedResponse;

const DUPLICATE_SUBJECT: &str = "La materia ya existe o ya tiene esa asignación";

#[derive(Debug, Serialize)]
pub struct SubjectsResponse {
    pub materias: Vec<Subject>,
}

#[derive(Debug, Serialize)]
pub struct SubjectResponse {
    pub materia: Subject,
}

/// List subjects.
///
/// GET /api/materias?curso_id=&docente_id=&q=
pub async fn list_subjects(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ListSubjectsQuery>,
) -> Result<Json<Envelope<SubjectsResponse>>, ApiError> {
    current.require(rbac::SUBJECTS_READ)?;

    let repo = SubjectRepository::new(state.db.clone());
    let materias = repo
        .list(&SubjectFilter {
            curso_id: query.curso_id,
            docente_id: query.docente_id,
            q: query.q.as_deref(),
        })
        .await?;

    Ok(Json(Envelope::new(SubjectsResponse { materias })))
}

/// Create a subject with optional association lists.
///
/// POST /api/materias
pub async fn create_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<Envelope<SubjectResponse>>), ApiError> {
    current.require(rbac::SUBJECTS_WRITE)?;
    request.validate()?;

    let repo = SubjectRepository::new(state.db.clone());
    let materia = repo
        .create(&request)
        .await
        .map_err(|e| ApiError::upstream_conflict(e, DUPLICATE_SUBJECT))?;

    info!(
        materia_id = %materia.id,
        cursos = materia.curso_ids.len(),
        docentes = materia.docente_ids.len(),
        user_id = %current.id(),
        "Subject created"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(SubjectResponse { materia })),
    ))
}

/// Update a subject. Association lists present in the body replace the
/// stored ones.
///
/// PATCH /api/materias/:id
pub async fn update_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSubjectRequest>,
) -> Result<Json<Envelope<SubjectResponse>>, ApiError> {
    current.require(rbac::SUBJECTS_WRITE)?;
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No hay cambios para aplicar".into()));
    }

    let repo = SubjectRepository::new(state.db.clone());
    let materia = repo
        .update(id, &request)
        .await
        .map_err(|e| ApiError::upstream_conflict(e, DUPLICATE_SUBJECT))?
        .ok_or_else(|| ApiError::NotFound("Materia no encontrada".into()))?;

    info!(materia_id = %id, user_id = %current.id(), "Subject updated");

    Ok(Json(Envelope::new(SubjectResponse { materia })))
}

/// Delete a subject.
///
/// DELETE /api/materias/:id
pub async fn delete_subject(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<DeletedResponse>>, ApiError> {
    current.require(rbac::SUBJECTS_DELETE)?;

    let repo = SubjectRepository::new(state.db.clone());
    if !repo.delete(id).await? {
        return Err(ApiError::NotFound("Materia no encontrada".into()));
    }

    info!(materia_id = %id, user_id = %current.id(), "Subject deleted");

    Ok(Json(Envelope::new(DeletedResponse { id })))
}
