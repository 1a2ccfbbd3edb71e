//! School news.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::news::CreateNewsRequest;
use domain::models::{Envelope, NewsItem, Role};
use persistence::repositories::{CourseRepository, GuardianRepository, NewsRepository};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::CurrentUser;
use crate::middleware::rbac;
use crate::routes::DeletedResponse;

#[derive(Debug, Serialize)]
pub struct NewsListResponse {
    pub noticias: Vec<NewsItem>,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub noticia: NewsItem,
}

/// Courses whose targeted news the user may read.
async fn visible_course_ids(state: &AppState, current: &CurrentUser) -> Result<Vec<Uuid>, ApiError> {
    let courses = CourseRepository::new(state.db.clone());
    match current.role {
        Role::Estudiante => Ok(courses
            .course_of_student(current.id())
            .await?
            .into_iter()
            .collect()),
        Role::Tutor => {
            let children = GuardianRepository::new(state.db.clone())
                .children_of(current.id())
                .await?;
            let mut ids: Vec<Uuid> = Vec::new();
            for membership in courses.memberships_of_students(&children).await? {
                if !ids.contains(&membership.curso_id) {
                    ids.push(membership.curso_id);
                }
            }
            Ok(ids)
        }
        _ => Ok(Vec::new()),
    }
}

/// News visible to the current user, newest first.
///
/// GET /api/noticias
pub async fn list_news(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Envelope<NewsListResponse>>, ApiError> {
    current.require(rbac::NEWS_READ)?;

    let repo = NewsRepository::new(state.db.clone());
    let noticias = if current.role.sees_all_news() {
        repo.list_all().await?
    } else {
        let course_ids = visible_course_ids(&state, &current).await?;
        repo.list_visible(&course_ids).await?
    };

    Ok(Json(Envelope::new(NewsListResponse { noticias })))
}

/// Publish a news item.
///
/// POST /api/noticias
pub async fn create_news(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<CreateNewsRequest>,
) -> Result<(StatusCode, Json<Envelope<NewsResponse>>), ApiError> {
    current.require(rbac::NEWS_WRITE)?;
    request.validate()?;

    let repo = NewsRepository::new(state.db.clone());
    let noticia = repo.create(current.id(), &request).await?;

    info!(
        news_id = %noticia.id,
        is_global = noticia.is_global,
        courses = noticia.course_ids.len(),
        user_id = %current.id(),
        "News published"
    );

    Ok((StatusCode::CREATED, Json(Envelope::new(NewsResponse { noticia }))))
}

/// DELETE /api/noticias/:id
pub async fn delete_news(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<DeletedResponse>>, ApiError> {
    current.require(rbac::NEWS_WRITE)?;

    let repo = NewsRepository::new(state.db.clone());
    if !repo.delete(id).await? {
        return Err(ApiError::NotFound("Noticia no encontrada".into()));
    }

    info!(news_id = %id, user_id = %current.id(), "News deleted");

    Ok(Json(Envelope::new(DeletedResponse { id })))
}
