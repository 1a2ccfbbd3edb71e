//! Row mappings and write payloads for the database tables.

pub mod enrollment;
pub mod grade;
pub mod links;
pub mod news;
pub mod profile;
pub mod subject;

pub use enrollment::{EnrollmentPatch, NewEnrollmentEntity};
pub use grade::{GradePatch, NewGradeEntity, GRADE_COLUMNS};
pub use links::*;
pub use news::{NewNewsEntity, NewsEntity, NEWS_COLUMNS};
pub use profile::{NewProfileEntity, ProfileEntity, ProfilePatch, PROFILE_COLUMNS};
pub use subject::{SubjectEntity, SubjectRowEntity, SubjectRowPatch, SUBJECT_COLUMNS};
