//! Subject entity (database row mapping).

use domain::models::Subject;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject columns with the association tables embedded.
pub const SUBJECT_COLUMNS: &str = "id,nombre,descripcion,\
materias_cursos(curso_id),materias_docentes(docente_id),materias_responsables(responsable_id)";

#[derive(Debug, Clone, Deserialize)]
pub struct CourseRef {
    pub curso_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeacherRef {
    pub docente_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsibleRef {
    pub responsable_id: Uuid,
}

/// Row mapping for `materias` with embedded associations.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectEntity {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    #[serde(default)]
    pub materias_cursos: Vec<CourseRef>,
    #[serde(default)]
    pub materias_docentes: Vec<TeacherRef>,
    #[serde(default)]
    pub materias_responsables: Vec<ResponsibleRef>,
}

impl From<SubjectEntity> for Subject {
    fn from(entity: SubjectEntity) -> Self {
        Self {
            id: entity.id,
            nombre: entity.nombre,
            descripcion: entity.descripcion,
            curso_ids: entity.materias_cursos.into_iter().map(|r| r.curso_id).collect(),
            docente_ids: entity
                .materias_docentes
                .into_iter()
                .map(|r| r.docente_id)
                .collect(),
            responsable_ids: entity
                .materias_responsables
                .into_iter()
                .map(|r| r.responsable_id)
                .collect(),
        }
    }
}

/// Insert and update payload for `materias`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubjectRowPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
}

/// Bare `materias` row as returned by an insert.
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectRowEntity {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
}
