//! Course repository, including course membership tables.

use domain::models::course::{CreateCourseRequest, UpdateCourseRequest};
use domain::models::Course;
use uuid::Uuid;

use crate::client::PostgrestClient;
use crate::entities::{CourseStudentEntity, CourseTeacherEntity};
use crate::error::UpstreamError;
use crate::query::Query;

const TABLE: &str = "cursos";
const STUDENTS_TABLE: &str = "cursos_estudiantes";
const TEACHERS_TABLE: &str = "cursos_docentes";
const COURSE_COLUMNS: &str = "id,nombre,descripcion,anio_lectivo";

/// Filters for listing courses.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter<'a> {
    pub anio_lectivo: Option<i32>,
    pub q: Option<&'a str>,
    /// Restrict to these course ids.
    pub ids: Option<&'a [Uuid]>,
}

/// Repository for courses and their student and teacher links.
#[derive(Clone)]
pub struct CourseRepository {
    client: PostgrestClient,
}

impl CourseRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &CourseFilter<'_>) -> Result<Vec<Course>, UpstreamError> {
        let mut query = Query::new()
            .select(COURSE_COLUMNS)
            .eq_opt("anio_lectivo", filter.anio_lectivo)
            .search(&["nombre", "descripcion"], filter.q);
        if let Some(ids) = filter.ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.in_list("id", ids);
        }
        let query = query.order("anio_lectivo", false).order("nombre", true);
        self.client.select(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, UpstreamError> {
        let query = Query::new().select(COURSE_COLUMNS).eq("id", id);
        self.client.select_one(TABLE, &query).await
    }

    pub async fn create(&self, request: &CreateCourseRequest) -> Result<Course, UpstreamError> {
        let row = serde_json::json!({
            "nombre": request.nombre.trim(),
            "descripcion": request.descripcion,
            "anio_lectivo": request.anio_lectivo,
        });
        self.client.insert_one(TABLE, &row).await
    }

    /// Returns `None` when no row matched.
    pub async fn update(
        &self,
        id: Uuid,
        request: &UpdateCourseRequest,
    ) -> Result<Option<Course>, UpstreamError> {
        let mut patch = serde_json::Map::new();
        if let Some(nombre) = &request.nombre {
            patch.insert("nombre".into(), nombre.trim().into());
        }
        if let Some(descripcion) = &request.descripcion {
            patch.insert("descripcion".into(), descripcion.clone().into());
        }
        if let Some(anio) = request.anio_lectivo {
            patch.insert("anio_lectivo".into(), anio.into());
        }
        let query = Query::new().eq("id", id).select(COURSE_COLUMNS);
        let rows: Vec<Course> = self.client.update(TABLE, &query, &patch).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, UpstreamError> {
        let query = Query::new().eq("id", id).select("id");
        let rows: Vec<serde_json::Value> = self.client.delete(TABLE, &query).await?;
        Ok(!rows.is_empty())
    }

    pub async fn count(&self) -> Result<u64, UpstreamError> {
        self.client.count(TABLE, &Query::new().select("id")).await
    }

    // ------------------------------------------------------------------
    // Students
    // ------------------------------------------------------------------

    pub async fn student_ids(&self, curso_id: Uuid) -> Result<Vec<Uuid>, UpstreamError> {
        let query = Query::new()
            .select("curso_id,estudiante_id")
            .eq("curso_id", curso_id);
        let rows: Vec<CourseStudentEntity> = self.client.select(STUDENTS_TABLE, &query).await?;
        Ok(rows.into_iter().map(|r| r.estudiante_id).collect())
    }

    /// Course a student belongs to, if any.
    pub async fn course_of_student(&self, estudiante_id: Uuid) -> Result<Option<Uuid>, UpstreamError> {
        let query = Query::new()
            .select("curso_id,estudiante_id")
            .eq("estudiante_id", estudiante_id);
        let row: Option<CourseStudentEntity> =
            self.client.select_one(STUDENTS_TABLE, &query).await?;
        Ok(row.map(|r| r.curso_id))
    }

    /// Courses of several students.
    pub async fn memberships_of_students(
        &self,
        estudiante_ids: &[Uuid],
    ) -> Result<Vec<CourseStudentEntity>, UpstreamError> {
        if estudiante_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select("curso_id,estudiante_id")
            .in_list("estudiante_id", estudiante_ids);
        self.client.select(STUDENTS_TABLE, &query).await
    }

    pub async fn add_student(&self, curso_id: Uuid, estudiante_id: Uuid) -> Result<(), UpstreamError> {
        let row = CourseStudentEntity {
            curso_id,
            estudiante_id,
        };
        self.client.insert_minimal(STUDENTS_TABLE, &[row]).await
    }

    pub async fn remove_student(&self, curso_id: Uuid, estudiante_id: Uuid) -> Result<bool, UpstreamError> {
        let query = Query::new()
            .eq("curso_id", curso_id)
            .eq("estudiante_id", estudiante_id);
        let rows: Vec<CourseStudentEntity> = self.client.delete(STUDENTS_TABLE, &query).await?;
        Ok(!rows.is_empty())
    }

    // ------------------------------------------------------------------
    // Teachers
    // ------------------------------------------------------------------

    pub async fn teacher_ids(&self, curso_id: Uuid) -> Result<Vec<Uuid>, UpstreamError> {
        let query = Query::new()
            .select("curso_id,docente_id")
            .eq("curso_id", curso_id);
        let rows: Vec<CourseTeacherEntity> = self.client.select(TEACHERS_TABLE, &query).await?;
        Ok(rows.into_iter().map(|r| r.docente_id).collect())
    }

    /// Courses a teacher is assigned to.
    pub async fn course_ids_of_teacher(&self, docente_id: Uuid) -> Result<Vec<Uuid>, UpstreamError> {
        let query = Query::new()
            .select("curso_id,docente_id")
            .eq("docente_id", docente_id);
        let rows: Vec<CourseTeacherEntity> = self.client.select(TEACHERS_TABLE, &query).await?;
        Ok(rows.into_iter().map(|r| r.curso_id).collect())
    }

    pub async fn assign_teacher(&self, curso_id: Uuid, docente_id: Uuid) -> Result<(), UpstreamError> {
        let row = CourseTeacherEntity {
            curso_id,
            docente_id,
        };
        self.client.insert_minimal(TEACHERS_TABLE, &[row]).await
    }

    pub async fn unassign_teacher(&self, curso_id: Uuid, docente_id: Uuid) -> Result<bool, UpstreamError> {
        let query = Query::new()
            .eq("curso_id", curso_id)
            .eq("docente_id", docente_id);
        let rows: Vec<CourseTeacherEntity> = self.client.delete(TEACHERS_TABLE, &query).await?;
        Ok(!rows.is_empty())
    }
}
