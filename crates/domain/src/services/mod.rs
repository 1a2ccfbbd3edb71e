//! Domain services: pure reductions over rows fetched from the database.

pub mod grading;
pub mod storage_paths;
pub mod summary;

pub use grading::{attendance_percentage, weighted_average, GradeSample};
pub use summary::{build_student_overview, group_grades_by_subject, summarize_attendance};
