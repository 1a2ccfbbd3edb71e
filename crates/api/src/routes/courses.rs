//! Courses and their student and teacher memberships.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use domain::models::course::{
    AddStudentRequest, AssignTeacherRequest, CourseDetail, CreateCourseRequest, ListCoursesQuery,
    UpdateCourseRequest,
};
use domain::models::{Course, Envelope, Profile, Role};
use persistence::repositories::{CourseFilter, CourseRepository, ProfileRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;
use crate::routes::DeletedResponse;

#[derive(Debug, Serialize)]
pub struct CoursesResponse {
    pub cursos: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub curso: Course,
}

#[derive(Debug, Serialize)]
pub struct CourseDetailResponse {
    pub curso: CourseDetail,
}

#[derive(Debug, Serialize)]
pub struct StudentsResponse {
    pub estudiantes: Vec<Profile>,
}

#[derive(Debug, Serialize)]
pub struct MembershipResponse {
    pub curso_id: Uuid,
    pub perfil_id: Uuid,
}

fn course_not_found() -> ApiError {
    ApiError::NotFound("Curso no encontrado".into())
}

async fn require_course(repo: &CourseRepository, id: Uuid) -> Result<Course, ApiError> {
    repo.find_by_id(id).await?.ok_or_else(course_not_found)
}

/// Loads a profile and checks it has the expected role.
async fn require_profile_with_role(
    profiles: &ProfileRepository,
    id: Uuid,
    role: Role,
) -> Result<Profile, ApiError> {
    let profile = profiles
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Perfil no encontrado".into()))?;
    if profile.rol != role {
        return Err(ApiError::Validation(format!(
            "El perfil indicado no tiene el rol {}",
            role
        )));
    }
    Ok(profile)
}

/// List courses.
///
/// GET /api/cursos?anio_lectivo=&q=
pub async fn list_courses(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<ListCoursesQuery>,
) -> Result<Json<Envelope<CoursesResponse>>, ApiError> {
    current.require(rbac::COURSES_READ)?;

    let repo = CourseRepository::new(state.db.clone());
    let cursos = repo
        .list(&CourseFilter {
            anio_lectivo: query.anio_lectivo,
            q: query.q.as_deref(),
            ids: None,
        })
        .await?;

    Ok(Json(Envelope::new(CoursesResponse { cursos })))
}

/// Create a course.
///
/// POST /api/cursos
pub async fn create_course(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<Envelope<CourseResponse>>), ApiError> {
    current.require(rbac::COURSES_WRITE)?;
    request.validate()?;

    let repo = CourseRepository::new(state.db.clone());
    let curso = repo.create(&request).await.map_err(|e| {
        ApiError::upstream_conflict(e, "Ya existe un curso con ese nombre en el ciclo lectivo")
    })?;

    info!(curso_id = %curso.id, user_id = %current.id(), "Course created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(CourseResponse { curso })),
    ))
}

/// Course with its students and teachers.
///
/// GET /api/cursos/:id
pub async fn get_course(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<CourseDetailResponse>>, ApiError> {
    current.require(rbac::COURSES_READ)?;

    let repo = CourseRepository::new(state.db.clone());
    let profiles = ProfileRepository::new(state.db.clone());

    let (course, student_ids, teacher_ids) = tokio::try_join!(
        repo.find_by_id(id),
        repo.student_ids(id),
        repo.teacher_ids(id)
    )?;
    let course = course.ok_or_else(course_not_found)?;

    let (estudiantes, docentes) = tokio::try_join!(
        profiles.find_many(&student_ids),
        profiles.find_many(&teacher_ids)
    )?;

    Ok(Json(Envelope::new(CourseDetailResponse {
        curso: CourseDetail {
            course,
            estudiantes,
            docentes,
        },
    })))
}

/// Update a course.
///
/// PATCH /api/cursos/:id
pub async fn update_course(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCourseRequest>,
) -> Result<Json<Envelope<CourseResponse>>, ApiError> {
    current.require(rbac::COURSES_WRITE)?;
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No hay cambios para aplicar".into()));
    }

    let repo = CourseRepository::new(state.db.clone());
    let curso = repo
        .update(id, &request)
        .await
        .map_err(|e| {
            ApiError::upstream_conflict(e, "Ya existe un curso con ese nombre en el ciclo lectivo")
        })?
        .ok_or_else(course_not_found)?;

    info!(curso_id = %id, user_id = %current.id(), "Course updated");

    Ok(Json(Envelope::new(CourseResponse { curso })))
}

/// Delete a course.
///
/// DELETE /api/cursos/:id
pub async fn delete_course(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<DeletedResponse>>, ApiError> {
    current.require(rbac::COURSES_DELETE)?;

    let repo = CourseRepository::new(state.db.clone());
    if !repo.delete(id).await? {
        return Err(course_not_found());
    }

    info!(curso_id = %id, user_id = %current.id(), "Course deleted");

    Ok(Json(Envelope::new(DeletedResponse { id })))
}

/// Students of a course.
///
/// GET /api/cursos/:id/estudiantes
pub async fn list_course_students(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<StudentsResponse>>, ApiError> {
    current.require(rbac::COURSES_READ)?;

    let repo = CourseRepository::new(state.db.clone());
    let (course, student_ids) = tokio::try_join!(repo.find_by_id(id), repo.student_ids(id))?;
    course.ok_or_else(course_not_found)?;

    let estudiantes = ProfileRepository::new(state.db.clone())
        .find_many(&student_ids)
        .await?;

    Ok(Json(Envelope::new(StudentsResponse { estudiantes })))
}

/// Add a student to a course. A student belongs to at most one course.
///
/// POST /api/cursos/:id/estudiantes
pub async fn add_student(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AddStudentRequest>,
) -> Result<(StatusCode, Json<Envelope<MembershipResponse>>), ApiError> {
    current.require(rbac::COURSE_MEMBERS_WRITE)?;

    let repo = CourseRepository::new(state.db.clone());
    let profiles = ProfileRepository::new(state.db.clone());

    require_course(&repo, id).await?;
    require_profile_with_role(&profiles, request.estudiante_id, Role::Estudiante).await?;

    match repo.course_of_student(request.estudiante_id).await? {
        Some(curso_id) if curso_id == id => {
            return Err(ApiError::Conflict(
                "El estudiante ya pertenece a este curso".into(),
            ));
        }
        Some(_) => {
            return Err(ApiError::Conflict(
                "El estudiante ya pertenece a otro curso".into(),
            ));
        }
        None => {}
    }

    repo.add_student(id, request.estudiante_id)
        .await
        .map_err(|e| ApiError::upstream_conflict(e, "El estudiante ya pertenece a un curso"))?;

    info!(
        curso_id = %id,
        estudiante_id = %request.estudiante_id,
        user_id = %current.id(),
        "Student added to course"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(MembershipResponse {
            curso_id: id,
            perfil_id: request.estudiante_id,
        })),
    ))
}

/// Remove a student from a course.
///
/// DELETE /api/cursos/:id/estudiantes/:estudiante_id
pub async fn remove_student(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, estudiante_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<MembershipResponse>>, ApiError> {
    current.require(rbac::COURSE_MEMBERS_WRITE)?;

    let repo = CourseRepository::new(state.db.clone());
    if !repo.remove_student(id, estudiante_id).await? {
        return Err(ApiError::NotFound(
            "El estudiante no pertenece a este curso".into(),
        ));
    }

    info!(curso_id = %id, estudiante_id = %estudiante_id, user_id = %current.id(), "Student removed from course");

    Ok(Json(Envelope::new(MembershipResponse {
        curso_id: id,
        perfil_id: estudiante_id,
    })))
}

/// Assign a teacher to a course.
///
/// POST /api/cursos/:id/docentes
pub async fn assign_teacher(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignTeacherRequest>,
) -> Result<(StatusCode, Json<Envelope<MembershipResponse>>), ApiError> {
    current.require(rbac::COURSE_MEMBERS_WRITE)?;

    let repo = CourseRepository::new(state.db.clone());
    let profiles = ProfileRepository::new(state.db.clone());

    require_course(&repo, id).await?;
    require_profile_with_role(&profiles, request.docente_id, Role::Docente).await?;

    repo.assign_teacher(id, request.docente_id)
        .await
        .map_err(|e| ApiError::upstream_conflict(e, "El docente ya está asignado a este curso"))?;

    info!(curso_id = %id, docente_id = %request.docente_id, user_id = %current.id(), "Teacher assigned to course");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new(MembershipResponse {
            curso_id: id,
            perfil_id: request.docente_id,
        })),
    ))
}

/// Unassign a teacher from a course.
///
/// DELETE /api/cursos/:id/docentes/:docente_id
pub async fn unassign_teacher(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((id, docente_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<MembershipResponse>>, ApiError> {
    current.require(rbac::COURSE_MEMBERS_WRITE)?;

    let repo = CourseRepository::new(state.db.clone());
    if !repo.unassign_teacher(id, docente_id).await? {
        return Err(ApiError::NotFound(
            "El docente no está asignado a este curso".into(),
        ));
    }

    info!(curso_id = %id, docente_id = %docente_id, user_id = %current.id(), "Teacher unassigned from course");

    Ok(Json(Envelope::new(MembershipResponse {
        curso_id: id,
        perfil_id: docente_id,
    })))
}
