use axum::{
    extract::State,
    http::StatusCode,
};
use retreats_db::models::Category;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::ApiError,
    extractors::{Json, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: c.name,
            description: c.description,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.categories.list().await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    auth.require_admin()?;
    body.validate()?;

    let category = state.categories.create(body.name, body.description).await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}
