//! Enrollment application insert and update payloads.

use domain::models::enrollment::{EnrollmentStatus, NewEnrollmentApplication};
use serde::Serialize;

/// Insert payload for `inscripciones`.
#[derive(Debug, Clone, Serialize)]
pub struct NewEnrollmentEntity {
    #[serde(flatten)]
    pub application: NewEnrollmentApplication,
    pub estado: EnrollmentStatus,
}

impl From<NewEnrollmentApplication> for NewEnrollmentEntity {
    fn from(application: NewEnrollmentApplication) -> Self {
        Self {
            application,
            estado: EnrollmentStatus::default(),
        }
    }
}

/// Staff update of `inscripciones`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrollmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<EnrollmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observaciones: Option<String>,
}
