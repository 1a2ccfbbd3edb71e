//! Association rows (join tables).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of `cursos_estudiantes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseStudentEntity {
    pub curso_id: Uuid,
    pub estudiante_id: Uuid,
}

/// Row of `cursos_docentes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTeacherEntity {
    pub curso_id: Uuid,
    pub docente_id: Uuid,
}

/// Row of `tutores_estudiantes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorStudentEntity {
    pub tutor_id: Uuid,
    pub estudiante_id: Uuid,
}

/// Row of `news_courses`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsCourseEntity {
    pub news_id: Uuid,
    pub course_id: Uuid,
}

/// Row of `materias_cursos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCourseEntity {
    pub materia_id: Uuid,
    pub curso_id: Uuid,
}

/// Row of `materias_docentes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTeacherEntity {
    pub materia_id: Uuid,
    pub docente_id: Uuid,
}

/// Row of `materias_responsables`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectResponsibleEntity {
    pub materia_id: Uuid,
    pub responsable_id: Uuid,
}
