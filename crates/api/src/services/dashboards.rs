//! Dashboard assembly.
//!
//! Each dashboard fetches the rows it needs in as few round trips as
//! possible and reduces them with the pure helpers in `domain::services`.

use std::collections::BTreeMap;

use domain::models::summary::{AdminStats, StudentOverview, TeacherOverview};
use domain::models::{Course, EnrollmentStatus, Role};
use domain::services::build_student_overview;
use persistence::repositories::{
    AttendanceRepository, CourseFilter, CourseRepository, EnrollmentRepository, GradeRepository,
    ProfileRepository, SubjectFilter, SubjectRepository,
};
use persistence::{PostgrestClient, UpstreamError};
use uuid::Uuid;

/// Overviews for a set of students, in profile name order. Ids without a
/// profile are skipped.
pub async fn student_overviews(
    db: &PostgrestClient,
    estudiante_ids: &[Uuid],
) -> Result<Vec<StudentOverview>, UpstreamError> {
    if estudiante_ids.is_empty() {
        return Ok(Vec::new());
    }

    let profiles = ProfileRepository::new(db.clone());
    let courses = CourseRepository::new(db.clone());
    let attendance = AttendanceRepository::new(db.clone());
    let grades = GradeRepository::new(db.clone());

    let (students, memberships, attendance_rows, grade_rows) = tokio::try_join!(
        profiles.find_many(estudiante_ids),
        courses.memberships_of_students(estudiante_ids),
        attendance.for_students(estudiante_ids),
        grades.for_students(estudiante_ids),
    )?;

    let mut course_ids: Vec<Uuid> = Vec::new();
    for m in &memberships {
        if !course_ids.contains(&m.curso_id) {
            course_ids.push(m.curso_id);
        }
    }
    let course_rows = courses
        .list(&CourseFilter {
            ids: Some(course_ids.as_slice()),
            ..Default::default()
        })
        .await?;

    let overviews = students
        .into_iter()
        .map(|student| {
            let course: Option<Course> = memberships
                .iter()
                .find(|m| m.estudiante_id == student.id)
                .and_then(|m| course_rows.iter().find(|c| c.id == m.curso_id))
                .cloned();
            build_student_overview(student, course, &attendance_rows, &grade_rows)
        })
        .collect();

    Ok(overviews)
}

/// Courses a teacher is assigned to and the subjects they teach.
pub async fn teacher_overview(
    db: &PostgrestClient,
    docente_id: Uuid,
) -> Result<TeacherOverview, UpstreamError> {
    let courses = CourseRepository::new(db.clone());
    let subjects = SubjectRepository::new(db.clone());

    let filter = SubjectFilter {
        docente_id: Some(docente_id),
        ..Default::default()
    };
    let (course_ids, materias) = tokio::try_join!(
        courses.course_ids_of_teacher(docente_id),
        subjects.list(&filter),
    )?;
    let cursos = courses
        .list(&CourseFilter {
            ids: Some(course_ids.as_slice()),
            ..Default::default()
        })
        .await?;

    Ok(TeacherOverview { cursos, materias })
}

/// Row counts for the administration dashboard.
pub async fn admin_stats(db: &PostgrestClient) -> Result<AdminStats, UpstreamError> {
    let profiles = ProfileRepository::new(db.clone());
    let courses = CourseRepository::new(db.clone());
    let subjects = SubjectRepository::new(db.clone());
    let enrollments = EnrollmentRepository::new(db.clone());

    let per_role = count_profiles_by_role(&profiles);
    let (perfiles_por_rol, cursos, materias, inscripciones_sin_revisar, inscripciones_pendientes) =
        tokio::try_join!(
            per_role,
            courses.count(),
            subjects.count(),
            enrollments.count_by_status(EnrollmentStatus::SinRevisar),
            enrollments.count_by_status(EnrollmentStatus::Pendiente),
        )?;

    Ok(AdminStats {
        perfiles_por_rol,
        cursos,
        materias,
        inscripciones_sin_revisar,
        inscripciones_pendientes,
    })
}

async fn count_profiles_by_role(
    profiles: &ProfileRepository,
) -> Result<BTreeMap<String, u64>, UpstreamError> {
    let mut counts = BTreeMap::new();
    for role in Role::ALL {
        counts.insert(role.as_str().to_string(), profiles.count_by_role(role).await?);
    }
    Ok(counts)
}
