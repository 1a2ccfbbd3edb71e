//! Grade (calificación) domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// One grade row.
///
/// `materia` is the subject name as stored, not a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub id: Uuid,
    pub estudiante_id: Uuid,
    pub materia: String,
    pub tipo_evaluacion: Option<String>,
    pub fecha: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub peso: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub nota: Option<f64>,
    pub observaciones: Option<String>,
    #[serde(default)]
    pub docente_id: Option<Uuid>,
}

/// Accepts a JSON number, a numeric string, or anything else as `None`.
///
/// Grade rows loaded by hand sometimes hold text such as "A" or "8,5";
/// values that are not numbers are skipped by the averaging code.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite()),
        _ => None,
    })
}

/// Request payload for recording a grade.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGradeRequest {
    pub estudiante_id: Uuid,

    #[validate(length(min = 1, max = 80, message = "Indicá la materia"))]
    pub materia: String,

    #[validate(length(max = 60, message = "Tipo de evaluación demasiado largo"))]
    pub tipo_evaluacion: Option<String>,

    pub fecha: Option<NaiveDate>,

    #[validate(range(min = 0.0, max = 100.0, message = "El peso debe estar entre 0 y 100"))]
    pub peso: Option<f64>,

    #[validate(range(min = 0.0, max = 10.0, message = "La nota debe estar entre 0 y 10"))]
    pub nota: f64,

    #[validate(length(max = 500, message = "Las observaciones admiten hasta 500 caracteres"))]
    pub observaciones: Option<String>,
}

/// Request payload for updating a grade.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGradeRequest {
    #[validate(length(min = 1, max = 80, message = "Indicá la materia"))]
    pub materia: Option<String>,

    #[validate(length(max = 60, message = "Tipo de evaluación demasiado largo"))]
    pub tipo_evaluacion: Option<String>,

    pub fecha: Option<NaiveDate>,

    #[validate(range(min = 0.0, max = 100.0, message = "El peso debe estar entre 0 y 100"))]
    pub peso: Option<f64>,

    #[validate(range(min = 0.0, max = 10.0, message = "La nota debe estar entre 0 y 10"))]
    pub nota: Option<f64>,

    #[validate(length(max = 500, message = "Las observaciones admiten hasta 500 caracteres"))]
    pub observaciones: Option<String>,
}

impl UpdateGradeRequest {
    pub fn is_empty(&self) -> bool {
        self.materia.is_none()
            && self.tipo_evaluacion.is_none()
            && self.fecha.is_none()
            && self.peso.is_none()
            && self.nota.is_none()
            && self.observaciones.is_none()
    }
}

/// Query parameters for listing grades.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeQuery {
    pub estudiante_id: Option<Uuid>,
    pub materia: Option<String>,
    pub curso_id: Option<Uuid>,
}
