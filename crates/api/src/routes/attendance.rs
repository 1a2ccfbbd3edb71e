//! Attendance listing and bulk upsert.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::attendance::{AttendanceQuery, SaveAttendanceRequest};
use domain::models::summary::AttendanceSummary;
use domain::models::{AttendanceRecord, Envelope};
use domain::services::summarize_attendance;
use persistence::repositories::{AttendanceFilter, AttendanceRepository, CourseRepository};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub asistencias: Vec<AttendanceRecord>,
    pub resumen: AttendanceSummary,
}

#[derive(Debug, Serialize)]
pub struct SavedAttendanceResponse {
    pub guardados: usize,
    pub asistencias: Vec<AttendanceRecord>,
}

/// List attendance rows.
///
/// GET /api/asistencias?curso_id=&estudiante_id=&fecha=&desde=&hasta=
pub async fn list_attendance(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<Envelope<AttendanceResponse>>, ApiError> {
    current.require(rbac::ATTENDANCE_READ)?;

    if let (Some(desde), Some(hasta)) = (query.desde, query.hasta) {
        if desde > hasta {
            return Err(ApiError::Validation(
                "La fecha inicial no puede ser posterior a la final".into(),
            ));
        }
    }

    let repo = AttendanceRepository::new(state.db.clone());
    let asistencias = repo
        .list(&AttendanceFilter {
            curso_id: query.curso_id,
            estudiante_ids: query.estudiante_id.map(|id| vec![id]),
            fecha: query.fecha,
            desde: query.desde,
            hasta: query.hasta,
        })
        .await?;
    let resumen = summarize_attendance(&asistencias);

    Ok(Json(Envelope::new(AttendanceResponse {
        asistencias,
        resumen,
    })))
}

/// Save one day of attendance for a course. Existing rows for the same
/// course, student and date are overwritten.
///
/// POST /api/asistencias
pub async fn save_attendance(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<SaveAttendanceRequest>,
) -> Result<Json<Envelope<SavedAttendanceResponse>>, ApiError> {
    current.require(rbac::ATTENDANCE_WRITE)?;
    request.validate()?;
    shared::validation::validate_not_future(&request.fecha)
        .map_err(|_| ApiError::Validation("La fecha no puede ser futura".into()))?;

    let curso_id = request.curso_id;
    let fecha = request.fecha;

    let courses = CourseRepository::new(state.db.clone());
    let enrolled = courses.student_ids(curso_id).await?;
    let records = request.into_records();
    if let Some(outsider) = records
        .iter()
        .find(|r| !enrolled.contains(&r.estudiante_id))
    {
        return Err(ApiError::Validation(format!(
            "El estudiante {} no pertenece al curso",
            outsider.estudiante_id
        )));
    }

    let repo = AttendanceRepository::new(state.db.clone());
    let asistencias = repo.upsert(&records).await?;

    info!(
        curso_id = %curso_id,
        fecha = %fecha,
        registros = records.len(),
        user_id = %current.id(),
        "Attendance saved"
    );

    Ok(Json(Envelope::new(SavedAttendanceResponse {
        guardados: records.len(),
        asistencias,
    })))
}
