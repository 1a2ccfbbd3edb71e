//! Repositories over the PostgREST tables.

pub mod attendance;
pub mod course;
pub mod enrollment;
pub mod grade;
pub mod guardian;
pub mod news;
pub mod profile;
pub mod subject;

pub use attendance::{AttendanceFilter, AttendanceRepository};
pub use course::{CourseFilter, CourseRepository};
pub use enrollment::{EnrollmentFilter, EnrollmentRepository};
pub use grade::{GradeFilter, GradeRepository};
pub use guardian::GuardianRepository;
pub use news::NewsRepository;
pub use profile::{ProfileFilter, ProfileRepository};
pub use subject::{SubjectFilter, SubjectRepository};
