//! Grade insert and update payloads.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

/// Grade columns.
pub const GRADE_COLUMNS: &str =
    "id,estudiante_id,materia,tipo_evaluacion,fecha,peso,nota,observaciones,docente_id";

/// Insert payload for `calificaciones`.
#[derive(Debug, Clone, Serialize)]
pub struct NewGradeEntity {
    pub estudiante_id: Uuid,
    pub materia: String,
    pub tipo_evaluacion: Option<String>,
    pub fecha: Option<NaiveDate>,
    pub peso: Option<f64>,
    pub nota: f64,
    pub observaciones: Option<String>,
    pub docente_id: Uuid,
}

/// Partial update for `calificaciones`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GradePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materia: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_evaluacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peso: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nota: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}
