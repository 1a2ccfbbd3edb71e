//! Tutor to student links.

use uuid::Uuid;

use crate::client::PostgrestClient;
use crate::entities::TutorStudentEntity;
use crate::error::UpstreamError;
use crate::query::Query;

const TABLE: &str = "tutores_estudiantes";

#[derive(Clone)]
pub struct GuardianRepository {
    client: PostgrestClient,
}

impl GuardianRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    /// Ids of the students linked to a tutor.
    pub async fn children_of(&self, tutor_id: Uuid) -> Result<Vec<Uuid>, UpstreamError> {
        let query = Query::new()
            .select("tutor_id,estudiante_id")
            .eq("tutor_id", tutor_id);
        let rows: Vec<TutorStudentEntity> = self.client.select(TABLE, &query).await?;
        let mut ids: Vec<Uuid> = Vec::with_capacity(rows.len());
        for row in rows {
            if !ids.contains(&row.estudiante_id) {
                ids.push(row.estudiante_id);
            }
        }
        Ok(ids)
    }
}
