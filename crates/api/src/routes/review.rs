use axum::{
    extract::State,
    http::StatusCode,
};
use retreats_db::models::ReviewEntry;
use retreats_services::dao::review::{NewReview, ReviewRow};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_id, parse_optional_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ReviewEntryBody {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(min = 1, max = 2000))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewRequest {
    /// Defaults to the caller; must match the caller when given.
    pub user_id: Option<String>,
    pub retreat_id: String,
    #[validate(length(min = 1))]
    #[validate(nested)]
    pub reviews: Vec<ReviewEntryBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntryResponse {
    pub id: String,
    pub rating: i32,
    pub comment: String,
    pub helpful_count: i32,
    pub date_posted: String,
    pub username: String,
}

impl From<ReviewEntry> for ReviewEntryResponse {
    fn from(e: ReviewEntry) -> Self {
        Self {
            id: e.id.to_hex(),
            rating: e.rating,
            comment: e.comment,
            helpful_count: e.helpful_count,
            date_posted: rfc3339(e.date_posted),
            username: e.username,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddReviewResponse {
    pub reviews: Vec<ReviewEntryResponse>,
    pub user_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRowResponse {
    pub id: String,
    pub user_id: String,
    pub rating: i32,
    pub comment: String,
    pub helpful_count: i32,
    pub date_posted: String,
    pub username: String,
    pub retreat_name: String,
}

impl From<ReviewRow> for ReviewRowResponse {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: r.id.to_hex(),
            user_id: r.user_id.to_hex(),
            rating: r.rating,
            comment: r.comment,
            helpful_count: r.helpful_count,
            date_posted: rfc3339(r.date_posted),
            username: r.username,
            retreat_name: r.retreat_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub data: Vec<ReviewRowResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageRatingResponse {
    pub average_rating: f64,
}

pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<AddReviewRequest>,
) -> Result<(StatusCode, Json<AddReviewResponse>), ApiError> {
    body.validate()?;
    let rid = parse_id(&body.retreat_id, "retreat_id")?;
    if let Some(uid) = parse_optional_id(body.user_id.as_deref(), "user_id")? {
        if uid != auth.user_id {
            return Err(ApiError::Forbidden(
                "Reviews can only be posted as yourself".to_string(),
            ));
        }
    }

    let entries = body
        .reviews
        .into_iter()
        .map(|r| NewReview {
            rating: r.rating,
            comment: r.comment,
        })
        .collect();

    let (reviews, user_name) = state
        .reviews
        .add_or_append(&state.users, &state.retreats, auth.user_id, rid, entries)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddReviewResponse {
            reviews: reviews.into_iter().map(ReviewEntryResponse::from).collect(),
            user_name,
        }),
    ))
}

pub async fn for_retreat(
    State(state): State<AppState>,
    Path(retreat_id): Path<String>,
) -> Result<Json<ReviewListResponse>, ApiError> {
    let rid = parse_id(&retreat_id, "retreat_id")?;

    let rows = state.reviews.for_retreat(&state.retreats, rid).await?;

    Ok(Json(ReviewListResponse {
        data: rows.into_iter().map(ReviewRowResponse::from).collect(),
    }))
}

pub async fn average(
    State(state): State<AppState>,
    Path(retreat_id): Path<String>,
) -> Result<Json<AverageRatingResponse>, ApiError> {
    let rid = parse_id(&retreat_id, "retreat_id")?;

    let average_rating = state.reviews.average_rating(rid).await?;

    Ok(Json(AverageRatingResponse { average_rating }))
}

pub async fn edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(review_id): Path<String>,
    Json(body): Json<ReviewEntryBody>,
) -> Result<Json<ReviewEntryResponse>, ApiError> {
    let rid = parse_id(&review_id, "review_id")?;
    body.validate()?;

    let entry = state
        .reviews
        .edit(auth.user_id, rid, body.rating, &body.comment)
        .await?;

    Ok(Json(entry.into()))
}

pub async fn admin_edit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(review_id): Path<String>,
    Json(body): Json<ReviewEntryBody>,
) -> Result<Json<ReviewEntryResponse>, ApiError> {
    auth.require_admin()?;
    let rid = parse_id(&review_id, "review_id")?;
    body.validate()?;

    let entry = state
        .reviews
        .admin_edit(rid, body.rating, &body.comment)
        .await?;

    Ok(Json(entry.into()))
}

pub async fn admin_delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(review_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    let rid = parse_id(&review_id, "review_id")?;

    state.reviews.admin_delete(rid).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn helpful(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(review_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rid = parse_id(&review_id, "review_id")?;

    state.reviews.mark_helpful(rid).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}
