//! Attendance domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Attendance status for one student on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Presente,
    LlegadaTarde,
    Ausente,
    FaltaJustificada,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Presente => "presente",
            AttendanceStatus::LlegadaTarde => "llegada_tarde",
            AttendanceStatus::Ausente => "ausente",
            AttendanceStatus::FaltaJustificada => "falta_justificada",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "presente" => Ok(AttendanceStatus::Presente),
            "llegada_tarde" => Ok(AttendanceStatus::LlegadaTarde),
            "ausente" => Ok(AttendanceStatus::Ausente),
            "falta_justificada" => Ok(AttendanceStatus::FaltaJustificada),
            _ => Err(format!("Invalid attendance status: {}", s)),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One attendance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub curso_id: Uuid,
    pub estudiante_id: Uuid,
    pub fecha: NaiveDate,
    pub estado: AttendanceStatus,
}

/// One entry of a bulk attendance submission.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttendanceEntry {
    pub estudiante_id: Uuid,
    pub estado: AttendanceStatus,
}

/// Request payload for saving a day of attendance for a course.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveAttendanceRequest {
    pub curso_id: Uuid,
    pub fecha: NaiveDate,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Se requiere al menos un registro de asistencia"
    ))]
    pub registros: Vec<AttendanceEntry>,
}

impl SaveAttendanceRequest {
    /// Expands the submission into rows, keeping the last entry per student.
    pub fn into_records(self) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = Vec::with_capacity(self.registros.len());
        for entry in self.registros {
            if let Some(existing) = records
                .iter_mut()
                .find(|r| r.estudiante_id == entry.estudiante_id)
            {
                existing.estado = entry.estado;
                continue;
            }
            records.push(AttendanceRecord {
                id: None,
                curso_id: self.curso_id,
                estudiante_id: entry.estudiante_id,
                fecha: self.fecha,
                estado: entry.estado,
            });
        }
        records
    }
}

/// Query parameters for listing attendance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    pub curso_id: Option<Uuid>,
    pub estudiante_id: Option<Uuid>,
    pub fecha: Option<NaiveDate>,
    pub desde: Option<NaiveDate>,
    pub hasta: Option<NaiveDate>,
}
