//! Role allow-lists for every route.
//!
//! Each protected handler calls [`authorize`] (through
//! [`CurrentUser::require`](crate::extractors::CurrentUser::require)) with
//! one of these lists. Keeping them together makes the permission table
//! reviewable in one place.

use domain::models::Role;

use crate::error::ApiError;

/// preceptor, directivo, administrador.
pub const STAFF: &[Role] = &[Role::Preceptor, Role::Directivo, Role::Administrador];

/// Teachers plus staff.
pub const ACADEMIC: &[Role] = &[
    Role::Docente,
    Role::Preceptor,
    Role::Directivo,
    Role::Administrador,
];

/// Any authenticated role.
pub const ANY: &[Role] = &Role::ALL;

pub const DIRECTION: &[Role] = &[Role::Directivo, Role::Administrador];

pub const ADMIN_ONLY: &[Role] = &[Role::Administrador];

// Accounts
pub const ACCOUNTS: &[Role] = ADMIN_ONLY;

// Courses
pub const COURSES_READ: &[Role] = ACADEMIC;
pub const COURSES_WRITE: &[Role] = STAFF;
pub const COURSES_DELETE: &[Role] = DIRECTION;
pub const COURSE_MEMBERS_WRITE: &[Role] = STAFF;

// Subjects
pub const SUBJECTS_READ: &[Role] = ACADEMIC;
pub const SUBJECTS_WRITE: &[Role] = STAFF;
pub const SUBJECTS_DELETE: &[Role] = DIRECTION;

// Attendance
pub const ATTENDANCE_READ: &[Role] = ACADEMIC;
pub const ATTENDANCE_WRITE: &[Role] = ACADEMIC;

// Grades
pub const GRADES_READ: &[Role] = ACADEMIC;
pub const GRADES_WRITE: &[Role] = &[Role::Docente, Role::Directivo, Role::Administrador];

// Enrollments
pub const ENROLLMENTS_READ: &[Role] = STAFF;
pub const ENROLLMENTS_WRITE: &[Role] = STAFF;
pub const ENROLLMENTS_DELETE: &[Role] = DIRECTION;

// News
pub const NEWS_READ: &[Role] = ANY;
pub const NEWS_WRITE: &[Role] = STAFF;

// Materials
pub const MATERIALS_UPLOAD: &[Role] = ACADEMIC;

// Dashboards
pub const STUDENT_DASHBOARD: &[Role] = &[Role::Estudiante];
pub const TUTOR_DASHBOARD: &[Role] = &[Role::Tutor];
pub const TEACHER_DASHBOARD: &[Role] = &[Role::Docente];
pub const ADMIN_STATS: &[Role] = DIRECTION;

/// Fails with 403 unless `role` is in `allowed`.
pub fn authorize(role: Role, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "No tiene permisos para realizar esta acción".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_and_academic() {
        for role in Role::ALL {
            assert_eq!(STAFF.contains(&role), role.is_staff());
        }
        assert!(ACADEMIC.contains(&Role::Docente));
        assert!(!ACADEMIC.contains(&Role::Tutor));
        assert!(!ACADEMIC.contains(&Role::Estudiante));
    }

    #[test]
    fn test_authorize() {
        assert!(authorize(Role::Administrador, ACCOUNTS).is_ok());
        assert!(matches!(
            authorize(Role::Directivo, ACCOUNTS),
            Err(ApiError::Forbidden(_))
        ));
        assert!(authorize(Role::Tutor, NEWS_READ).is_ok());
    }

    #[test]
    fn test_grade_writers_exclude_preceptor() {
        assert!(authorize(Role::Preceptor, GRADES_WRITE).is_err());
        assert!(authorize(Role::Docente, GRADES_WRITE).is_ok());
    }

    #[test]
    fn test_deletes_limited_to_direction() {
        for list in [COURSES_DELETE, SUBJECTS_DELETE, ENROLLMENTS_DELETE, ADMIN_STATS] {
            assert!(authorize(Role::Preceptor, list).is_err());
            assert!(authorize(Role::Directivo, list).is_ok());
        }
    }
}
