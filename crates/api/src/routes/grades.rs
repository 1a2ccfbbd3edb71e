//! Grades.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::grade::{CreateGradeRequest, GradeQuery, UpdateGradeRequest};
use domain::models::summary::SubjectSummary;
use domain::models::{Envelope, Grade, Role};
use domain::services::group_grades_by_subject;
use persistence::entities::{GradePatch, NewGradeEntity};
use persistence::repositories::{CourseRepository, GradeFilter, GradeRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;
use crate::routes::DeletedResponse;

#[derive(Debug, Serialize)]
pub struct GradesResponse {
    pub calificaciones: Vec<Grade>,
    /// Present when the listing is for a single student.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materias: Option<Vec<SubjectSummary>>,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub calificacion: Grade,
}

fn grade_not_found() -> ApiError {
    ApiError::NotFound("Calificación no encontrada".into())
}

/// Teachers may only change grades they recorded.
fn ensure_grade_owner(current: &CurrentUser, grade: &Grade) -> Result<(), ApiError> {
    if current.role == Role::Docente && grade.docente_id != Some(current.id()) {
        return Err(ApiError::Forbidden(
            "Solo podés modificar calificaciones que cargaste".into(),
        ));
    }
    Ok(())
}

/// List grades. `curso_id` expands to the students of the course.
///
/// GET /api/calificaciones?estudiante_id=&materia=&curso_id=
pub async fn list_grades(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<GradeQuery>,
) -> Result<Json<Envelope<GradesResponse>>, ApiError> {
    current.require(rbac::GRADES_READ)?;

    let mut estudiante_ids: Option<Vec<Uuid>> = query.estudiante_id.map(|id| vec![id]);
    if let Some(curso_id) = query.curso_id {
        let members = CourseRepository::new(state.db.clone())
            .student_ids(curso_id)
            .await?;
        estudiante_ids = Some(match estudiante_ids {
            Some(ids) => ids.into_iter().filter(|id| members.contains(id)).collect(),
            None => members,
        });
    }

    let materia = query
        .materia
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());

    let repo = GradeRepository::new(state.db.clone());
    let calificaciones = repo
        .list(&GradeFilter {
            estudiante_ids,
            materia,
        })
        .await?;

    let materias = query
        .estudiante_id
        .map(|_| group_grades_by_subject(calificaciones.clone()));

    Ok(Json(Envelope::new(GradesResponse {
        calificaciones,
        materias,
    })))
}

/// Record a grade. The teacher is taken from the session.
///
/// POST /api/calificaciones
pub async fn create_grade(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateGradeRequest>,
) -> Result<(StatusCode, Json<Envelope<GradeResponse>>), ApiError> {
    current.require(rbac::GRADES_WRITE)?;
    request.validate()?;
    if let Some(fecha) = &request.fecha {
        shared::validation::validate_not_future(fecha)
            .map_err(|_| ApiError::Validation("La fecha no puede ser futura".into()))?;
    }

    let row = NewGradeEntity {
        estudiante_id: request.estudiante_id,
        materia: request.materia.trim().to_string(),
        tipo_evaluacion: request.tipo_evaluacion,
        fecha: request.fecha,
        peso: request.peso,
        nota: request.nota,
        observaciones: request.observaciones,
        docente_id: current.id(),
    };

    let repo = GradeRepository::new(state.db.clone());
    let calificacion = repo.create(&row).await?;

    info!(
        grade_id = %calificacion.id,
        estudiante_id = %calificacion.estudiante_id,
        materia = %calificacion.materia,
        user_id = %current.id(),
        "Grade recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(GradeResponse { calificacion })),
    ))
}

/// Update a grade.
///
/// PATCH /api/calificaciones/:id
pub async fn update_grade(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGradeRequest>,
) -> Result<Json<Envelope<GradeResponse>>, ApiError> {
    current.require(rbac::GRADES_WRITE)?;
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No hay cambios para aplicar".into()));
    }

    let repo = GradeRepository::new(state.db.clone());
    let existing = repo.find_by_id(id).await?.ok_or_else(grade_not_found)?;
    ensure_grade_owner(&current, &existing)?;

    let patch = GradePatch {
        materia: request.materia.map(|m| m.trim().to_string()),
        tipo_evaluacion: request.tipo_evaluacion,
        fecha: request.fecha,
        peso: request.peso,
        nota: request.nota,
        observaciones: request.observaciones,
    };
    let calificacion = repo.update(id, &patch).await?.ok_or_else(grade_not_found)?;

    info!(grade_id = %id, user_id = %current.id(), "Grade updated");

    Ok(Json(Envelope::new(GradeResponse { calificacion })))
}

/// Delete a grade.
///
/// DELETE /api/calificaciones/:id
pub async fn delete_grade(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<DeletedResponse>>, ApiError> {
    current.require(rbac::GRADES_WRITE)?;

    let repo = GradeRepository::new(state.db.clone());
    let existing = repo.find_by_id(id).await?.ok_or_else(grade_not_found)?;
    ensure_grade_owner(&current, &existing)?;

    if !repo.delete(id).await? {
        return Err(grade_not_found());
    }

    info!(grade_id = %id, user_id = %current.id(), "Grade deleted");

    Ok(Json(Envelope::new(DeletedResponse { id })))
}
