//! Dashboard view models built from raw rows.

use serde::Serialize;
use std::collections::BTreeMap;

use super::course::Course;
use super::grade::Grade;
use super::profile::Profile;
use super::subject::Subject;

/// Attendance tallies for one student.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total: u32,
    pub presentes: u32,
    pub llegadas_tarde: u32,
    pub ausentes: u32,
    pub faltas_justificadas: u32,
    /// Percentage of `presente` records, `None` without records.
    pub porcentaje: Option<f64>,
}

/// Grades of one subject with their weighted average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectSummary {
    pub materia: String,
    pub promedio: Option<f64>,
    pub calificaciones: Vec<Grade>,
}

/// Overview of one student: course, attendance and grades per subject.
#[derive(Debug, Clone, Serialize)]
pub struct StudentOverview {
    pub estudiante: Profile,
    pub curso: Option<Course>,
    pub asistencia: AttendanceSummary,
    pub materias: Vec<SubjectSummary>,
    pub promedio_general: Option<f64>,
}

/// Overview of every child linked to a tutor.
#[derive(Debug, Clone, Serialize)]
pub struct TutorSummary {
    pub hijos: Vec<StudentOverview>,
}

/// Courses and subjects a teacher works with.
#[derive(Debug, Clone, Serialize)]
pub struct TeacherOverview {
    pub cursos: Vec<Course>,
    pub materias: Vec<Subject>,
}

/// Row counts for the administration dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AdminStats {
    pub perfiles_por_rol: BTreeMap<String, u64>,
    pub cursos: u64,
    pub materias: u64,
    pub inscripciones_sin_revisar: u64,
    pub inscripciones_pendientes: u64,
}
