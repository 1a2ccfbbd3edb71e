//! Role dashboards.

use axum::{extract::State, Json};
use domain::models::summary::{AdminStats, StudentOverview, TeacherOverview, TutorSummary};
use domain::models::Envelope;
use persistence::repositories::GuardianRepository;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;
use crate::services::dashboards;

#[derive(Debug, Serialize)]
pub struct StudentOverviewResponse {
    pub resumen: StudentOverview,
}

#[derive(Debug, Serialize)]
pub struct TutorSummaryResponse {
    pub resumen: TutorSummary,
}

#[derive(Debug, Serialize)]
pub struct TeacherOverviewResponse {
    pub resumen: TeacherOverview,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    pub estadisticas: AdminStats,
}

/// GET /api/estudiante/resumen
pub async fn student_overview(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<StudentOverviewResponse>>, ApiError> {
    current.require(rbac::STUDENT_DASHBOARD)?;

    let resumen = dashboards::student_overviews(&state.db, &[current.id()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("Perfil no encontrado".into()))?;

    Ok(Json(Envelope::new(StudentOverviewResponse { resumen })))
}

/// One overview per linked child.
///
/// GET /api/tutor/resumen
pub async fn tutor_summary(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<TutorSummaryResponse>>, ApiError> {
    current.require(rbac::TUTOR_DASHBOARD)?;

    let children = GuardianRepository::new(state.db.clone())
        .children_of(current.id())
        .await?;
    let hijos = dashboards::student_overviews(&state.db, &children).await?;

    Ok(Json(Envelope::new(TutorSummaryResponse {
        resumen: TutorSummary { hijos },
    })))
}

/// GET /api/docente/resumen
pub async fn teacher_overview(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<TeacherOverviewResponse>>, ApiError> {
    current.require(rbac::TEACHER_DASHBOARD)?;

    let resumen = dashboards::teacher_overview(&state.db, current.id()).await?;

    Ok(Json(Envelope::new(TeacherOverviewResponse { resumen })))
}

/// GET /api/admin/estadisticas
pub async fn admin_stats(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<AdminStatsResponse>>, ApiError> {
    current.require(rbac::ADMIN_STATS)?;

    let estadisticas = dashboards::admin_stats(&state.db).await?;

    Ok(Json(Envelope::new(AdminStatsResponse { estadisticas })))
}
