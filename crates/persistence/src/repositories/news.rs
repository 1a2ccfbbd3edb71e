//! News repository.

use domain::models::news::CreateNewsRequest;
use domain::models::NewsItem;
use tracing::warn;
use uuid::Uuid;

use crate::client::PostgrestClient;
use crate::entities::{NewNewsEntity, NewsCourseEntity, NewsEntity, NEWS_COLUMNS};
use crate::error::UpstreamError;
use crate::query::{Condition, Query};

const TABLE: &str = "news";
const TARGETS_TABLE: &str = "news_courses";
const DEFAULT_LIMIT: u64 = 100;

#[derive(Clone)]
pub struct NewsRepository {
    client: PostgrestClient,
}

impl NewsRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    /// Every news item, newest first.
    pub async fn list_all(&self) -> Result<Vec<NewsItem>, UpstreamError> {
        let query = Query::new()
            .select(NEWS_COLUMNS)
            .order("created_at", false)
            .limit(DEFAULT_LIMIT);
        let rows: Vec<NewsEntity> = self.client.select(TABLE, &query).await?;
        Ok(rows.into_iter().map(NewsItem::from).collect())
    }

    /// Global news plus news targeted at any of the given courses.
    pub async fn list_visible(&self, course_ids: &[Uuid]) -> Result<Vec<NewsItem>, UpstreamError> {
        let mut targeted: Vec<Uuid> = Vec::new();
        if !course_ids.is_empty() {
            let query = Query::new()
                .select("news_id,course_id")
                .in_list("course_id", course_ids);
            let rows: Vec<NewsCourseEntity> = self.client.select(TARGETS_TABLE, &query).await?;
            for row in rows {
                if !targeted.contains(&row.news_id) {
                    targeted.push(row.news_id);
                }
            }
        }

        let query = Query::new().select(NEWS_COLUMNS);
        let query = if targeted.is_empty() {
            query.eq("is_global", true)
        } else {
            query.or([
                Condition::eq("is_global", true),
                Condition::in_list("id", &targeted),
            ])
        };
        let query = query.order("created_at", false).limit(DEFAULT_LIMIT);
        let rows: Vec<NewsEntity> = self.client.select(TABLE, &query).await?;
        Ok(rows.into_iter().map(NewsItem::from).collect())
    }

    /// Stores a news item and its course targeting. The item is removed
    /// again when the targeting rows cannot be written.
    pub async fn create(
        &self,
        author_id: Uuid,
        request: &CreateNewsRequest,
    ) -> Result<NewsItem, UpstreamError> {
        let row = NewNewsEntity {
            title: request.title.trim().to_string(),
            content: request.content.clone(),
            author_id,
            is_global: request.is_global,
        };
        let created: NewsEntity = self.client.insert_one(TABLE, &row).await?;
        let mut item = NewsItem::from(created);

        let mut targets: Vec<NewsCourseEntity> = Vec::new();
        for course_id in &request.curso_ids {
            if !targets.iter().any(|t| t.course_id == *course_id) {
                targets.push(NewsCourseEntity {
                    news_id: item.id,
                    course_id: *course_id,
                });
            }
        }
        if !targets.is_empty() {
            if let Err(e) = self.client.insert_minimal(TARGETS_TABLE, &targets).await {
                warn!(news_id = %item.id, error = %e, "Writing news targets failed, removing news");
                if let Err(cleanup) = self.delete(item.id).await {
                    warn!(news_id = %item.id, error = %cleanup, "Removing news failed");
                }
                return Err(e);
            }
            item.course_ids = targets.iter().map(|t| t.course_id).collect();
        }
        Ok(item)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, UpstreamError> {
        let query = Query::new().eq("id", id).select("id");
        let rows: Vec<serde_json::Value> = self.client.delete(TABLE, &query).await?;
        Ok(!rows.is_empty())
    }
}
