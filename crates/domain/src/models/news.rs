//! News and announcement domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A news item with its course targeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Option<Uuid>,
    pub is_global: bool,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub course_ids: Vec<Uuid>,
}

/// Request payload for publishing a news item.
///
/// A news item is either global or targeted at one or more courses.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_targeting"))]
pub struct CreateNewsRequest {
    #[validate(length(min = 1, max = 200, message = "El título debe tener entre 1 y 200 caracteres"))]
    pub title: String,

    #[validate(length(min = 1, max = 10000, message = "El contenido no puede estar vacío"))]
    pub content: String,

    #[serde(default)]
    pub is_global: bool,

    #[serde(default)]
    pub curso_ids: Vec<Uuid>,
}

fn validate_targeting(request: &CreateNewsRequest) -> Result<(), ValidationError> {
    if request.is_global || !request.curso_ids.is_empty() {
        Ok(())
    } else {
        let mut err = ValidationError::new("news_targeting");
        err.message = Some("Elegí al menos un curso o marcá la noticia como general".into());
        Err(err)
    }
}
