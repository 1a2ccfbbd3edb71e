//! Grade repository.

use domain::models::Grade;
use uuid::Uuid;

use crate::client::PostgrestClient;
use crate::entities::{GradePatch, NewGradeEntity, GRADE_COLUMNS};
use crate::error::UpstreamError;
use crate::query::Query;

const TABLE: &str = "calificaciones";

/// Filters for listing grades.
#[derive(Debug, Clone, Default)]
pub struct GradeFilter<'a> {
    pub estudiante_ids: Option<Vec<Uuid>>,
    pub materia: Option<&'a str>,
}

#[derive(Clone)]
pub struct GradeRepository {
    client: PostgrestClient,
}

impl GradeRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: &GradeFilter<'_>) -> Result<Vec<Grade>, UpstreamError> {
        let mut query = Query::new().select(GRADE_COLUMNS);
        if let Some(ids) = &filter.estudiante_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.in_list("estudiante_id", ids);
        }
        if let Some(materia) = filter.materia.map(str::trim).filter(|m| !m.is_empty()) {
            query = query.eq("materia", materia);
        }
        let query = query.order("fecha", false);
        self.client.select(TABLE, &query).await
    }

    /// All grades of the given students.
    pub async fn for_students(&self, ids: &[Uuid]) -> Result<Vec<Grade>, UpstreamError> {
        self.list(&GradeFilter {
            estudiante_ids: Some(ids.to_vec()),
            materia: None,
        })
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Grade>, UpstreamError> {
        let query = Query::new().select(GRADE_COLUMNS).eq("id", id);
        self.client.select_one(TABLE, &query).await
    }

    pub async fn create(&self, grade: &NewGradeEntity) -> Result<Grade, UpstreamError> {
        self.client.insert_one(TABLE, grade).await
    }

    /// Returns `None` when no row matched.
    pub async fn update(&self, id: Uuid, patch: &GradePatch) -> Result<Option<Grade>, UpstreamError> {
        let query = Query::new().eq("id", id).select(GRADE_COLUMNS);
        let rows: Vec<Grade> = self.client.update(TABLE, &query, patch).await?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, UpstreamError> {
        let query = Query::new().eq("id", id).select("id");
        let rows: Vec<serde_json::Value> = self.client.delete(TABLE, &query).await?;
        Ok(!rows.is_empty())
    }
}
