//! Course domain models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::profile::Profile;

/// A course (division) for one academic year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub anio_lectivo: i32,
}

/// A course together with its members.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub estudiantes: Vec<Profile>,
    pub docentes: Vec<Profile>,
}

/// Request payload for creating a course.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(
        min = 1,
        max = 80,
        message = "El nombre debe tener entre 1 y 80 caracteres"
    ))]
    pub nombre: String,

    #[validate(length(max = 500, message = "La descripción admite hasta 500 caracteres"))]
    pub descripcion: Option<String>,

    pub anio_lectivo: i32,
}

/// Request payload for updating a course.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCourseRequest {
    #[validate(length(
        min = 1,
        max = 80,
        message = "El nombre debe tener entre 1 y 80 caracteres"
    ))]
    pub nombre: Option<String>,

    #[validate(length(max = 500, message = "La descripción admite hasta 500 caracteres"))]
    pub descripcion: Option<String>,

    pub anio_lectivo: Option<i32>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.descripcion.is_none() && self.anio_lectivo.is_none()
    }
}

/// Query parameters for listing courses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCoursesQuery {
    pub anio_lectivo: Option<i32>,
    pub q: Option<String>,
}

/// Request payload for adding a student to a course.
#[derive(Debug, Clone, Deserialize)]
pub struct AddStudentRequest {
    pub estudiante_id: Uuid,
}

/// Request payload for assigning a teacher to a course.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignTeacherRequest {
    pub docente_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_course_validation() {
        let req: CreateCourseRequest = serde_json::from_value(json!({
            "nombre": "",
            "anio_lectivo": 2025
        }))
        .unwrap();
        assert!(req.validate().is_err());

        let req: CreateCourseRequest = serde_json::from_value(json!({
            "nombre": "3ro A",
            "descripcion": "Turno mañana",
            "anio_lectivo": 2025
        }))
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_course_detail_flattens_course() {
        let detail = CourseDetail {
            course: Course {
                id: Uuid::new_v4(),
                nombre: "1ro B".to_string(),
                descripcion: None,
                anio_lectivo: 2025,
            },
            estudiantes: vec![],
            docentes: vec![],
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["nombre"], "1ro B");
        assert!(value["estudiantes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_update_course_is_empty() {
        assert!(UpdateCourseRequest::default().is_empty());
    }
}
