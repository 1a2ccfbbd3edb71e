//! Enrollment application repository.

use domain::models::enrollment::{EnrollmentApplication, EnrollmentStatus, NewEnrollmentApplication};
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::client::PostgrestClient;
use crate::entities::{EnrollmentPatch, NewEnrollmentEntity};
use crate::error::UpstreamError;
use crate::query::Query;

const TABLE: &str = "inscripciones";
const SEARCH_COLUMNS: &[&str] = &[
    "estudiante_nombre",
    "estudiante_apellido",
    "estudiante_dni",
    "tutor_nombre",
    "tutor_apellido",
    "tutor_dni",
];

/// Filters for listing applications.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentFilter<'a> {
    pub estado: Option<EnrollmentStatus>,
    pub q: Option<&'a str>,
}

#[derive(Clone)]
pub struct EnrollmentRepository {
    client: PostgrestClient,
}

impl EnrollmentRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    /// Stores a new application with status `sin_revisar`.
    pub async fn create(
        &self,
        application: NewEnrollmentApplication,
    ) -> Result<EnrollmentApplication, UpstreamError> {
        let row = NewEnrollmentEntity::from(application);
        self.client.insert_one(TABLE, &row).await
    }

    /// Newest first, with the total count for pagination.
    pub async fn list(
        &self,
        filter: &EnrollmentFilter<'_>,
        page: &PageRequest,
    ) -> Result<(Vec<EnrollmentApplication>, Option<u64>), UpstreamError> {
        let query = Query::new()
            .select("*")
            .eq_opt("estado", filter.estado)
            .search(SEARCH_COLUMNS, filter.q)
            .order("created_at", false)
            .page(page);
        self.client.select_with_count(TABLE, &query).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EnrollmentApplication>, UpstreamError> {
        let query = Query::new().select("*").eq("id", id);
        self.client.select_one(TABLE, &query).await
    }

    /// Returns `None` when no row matched.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &EnrollmentPatch,
    ) -> Result<Option<EnrollmentApplication>, UpstreamError> {
        let query = Query::new().eq("id", id).select("*");
        let rows: Vec<EnrollmentApplication> = self.client.update(TABLE, &query, patch).await?;
        Ok(rows.into_iter().next())
    }

    /// Deletes an application and returns the removed row.
    pub async fn delete(&self, id: Uuid) -> Result<Option<EnrollmentApplication>, UpstreamError> {
        let query = Query::new().eq("id", id).select("*");
        let rows: Vec<EnrollmentApplication> = self.client.delete(TABLE, &query).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn count_by_status(&self, estado: EnrollmentStatus) -> Result<u64, UpstreamError> {
        let query = Query::new().select("id").eq("estado", estado);
        self.client.count(TABLE, &query).await
    }
}
