//! Subject (materia) domain models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A subject and the courses, teachers and responsible staff linked to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    #[serde(default)]
    pub curso_ids: Vec<Uuid>,
    #[serde(default)]
    pub docente_ids: Vec<Uuid>,
    #[serde(default)]
    pub responsable_ids: Vec<Uuid>,
}

/// Request payload for creating a subject.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(
        min = 1,
        max = 80,
        message = "El nombre debe tener entre 1 y 80 caracteres"
    ))]
    pub nombre: String,

    #[validate(length(max = 500, message = "La descripción admite hasta 500 caracteres"))]
    pub descripcion: Option<String>,

    #[serde(default)]
    pub curso_ids: Vec<Uuid>,

    #[serde(default)]
    pub docente_ids: Vec<Uuid>,

    #[serde(default)]
    pub responsable_ids: Vec<Uuid>,
}

/// Request payload for updating a subject.
///
/// Association lists replace the stored ones when present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSubjectRequest {
    #[validate(length(
        min = 1,
        max = 80,
        message = "El nombre debe tener entre 1 y 80 caracteres"
    ))]
    pub nombre: Option<String>,

    #[validate(length(max = 500, message = "La descripción admite hasta 500 caracteres"))]
    pub descripcion: Option<String>,

    pub curso_ids: Option<Vec<Uuid>>,
    pub docente_ids: Option<Vec<Uuid>>,
    pub responsable_ids: Option<Vec<Uuid>>,
}

impl UpdateSubjectRequest {
    /// Returns true if any column of the subject row itself changes.
    pub fn touches_row(&self) -> bool {
        self.nombre.is_some() || self.descripcion.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_row()
            && self.curso_ids.is_none()
            && self.docente_ids.is_none()
            && self.responsable_ids.is_none()
    }
}

/// Query parameters for listing subjects.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSubjectsQuery {
    pub curso_id: Option<Uuid>,
    pub docente_id: Option<Uuid>,
    pub q: Option<String>,
}
