use axum::{
    extract::State,
    http::StatusCode,
};
use retreats_db::models::Blog;
use retreats_services::dao::base::{PaginatedResult, PaginationParams};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, Query, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub image: Option<String>,
    pub created_at: String,
}

impl From<Blog> for BlogResponse {
    fn from(b: Blog) -> Self {
        Self {
            id: b.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: b.title,
            content: b.content,
            author_id: b.author_id.to_hex(),
            image: b.image,
            created_at: rfc3339(b.created_at),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<BlogResponse>>, ApiError> {
    let blogs = state.blogs.list(&params).await?;
    Ok(Json(blogs.map(BlogResponse::from)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Json<BlogResponse>, ApiError> {
    let bid = parse_id(&blog_id, "blog_id")?;
    let blog = state.blogs.base.find_by_id(bid).await?;
    Ok(Json(blog.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<BlogResponse>), ApiError> {
    auth.require_admin()?;
    body.validate()?;

    let blog = state
        .blogs
        .create(auth.user_id, body.title, body.content, body.image)
        .await?;
    Ok((StatusCode::CREATED, Json(blog.into())))
}
