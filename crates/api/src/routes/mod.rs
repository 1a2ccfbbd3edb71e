//! HTTP route handlers.

use serde::Serialize;
use uuid::Uuid;

pub mod accounts;
pub mod attendance;
pub mod auth;
pub mod courses;
pub mod dashboards;
pub mod enrollments;
pub mod grades;
pub mod health;
pub mod materials;
pub mod news;
pub mod subjects;

/// Body of a successful delete.
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}
