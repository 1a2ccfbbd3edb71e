//! Domain models for the School Portal.

pub mod attendance;
pub mod course;
pub mod enrollment;
pub mod grade;
pub mod news;
pub mod profile;
pub mod response;
pub mod role;
pub mod subject;
pub mod summary;

pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use course::Course;
pub use enrollment::{DocumentTag, EnrollmentApplication, EnrollmentStatus};
pub use grade::Grade;
pub use news::NewsItem;
pub use profile::Profile;
pub use response::Envelope;
pub use role::Role;
pub use subject::Subject;
