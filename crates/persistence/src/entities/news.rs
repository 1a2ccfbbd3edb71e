//! News entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::NewsItem;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// News columns with targeting embedded.
pub const NEWS_COLUMNS: &str = "id,title,content,author_id,is_global,created_at,news_courses(course_id)";

#[derive(Debug, Clone, Deserialize)]
pub struct NewsCourseRef {
    pub course_id: Uuid,
}

/// Row mapping for the news table.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsEntity {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Option<Uuid>,
    #[serde(default)]
    pub is_global: bool,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub news_courses: Vec<NewsCourseRef>,
}

impl From<NewsEntity> for NewsItem {
    fn from(entity: NewsEntity) -> Self {
        Self {
            id: entity.id,
            title: entity.title,
            content: entity.content,
            author_id: entity.author_id,
            is_global: entity.is_global,
            created_at: entity.created_at,
            course_ids: entity.news_courses.into_iter().map(|r| r.course_id).collect(),
        }
    }
}

/// Insert payload for the news table.
#[derive(Debug, Clone, Serialize)]
pub struct NewNewsEntity {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub is_global: bool,
}
