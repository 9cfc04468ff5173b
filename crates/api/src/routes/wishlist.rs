use axum::{
    extract::State,
    http::StatusCode,
};
use retreats_db::models::{ServiceType, Wishlist, WishlistItem};
use retreats_services::aggregate::WishlistGroup;
use retreats_services::resolver::WishlistEntity;
use serde::{Deserialize, Serialize};

use super::blog::BlogResponse;
use super::retreat::RetreatResponse;
use super::{parse_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemRequest {
    pub service_type: ServiceType,
    pub service_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemResponse {
    pub service_type: ServiceType,
    pub service_id: String,
    pub added_at: String,
}

impl From<WishlistItem> for WishlistItemResponse {
    fn from(i: WishlistItem) -> Self {
        Self {
            service_type: i.service_type,
            service_id: i.service_id.to_hex(),
            added_at: rfc3339(i.added_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    pub id: String,
    pub user_id: String,
    pub items: Vec<WishlistItemResponse>,
}

impl From<Wishlist> for WishlistResponse {
    fn from(w: Wishlist) -> Self {
        Self {
            id: w.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: w.user_id.to_hex(),
            items: w.items.into_iter().map(WishlistItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum EntityResponse {
    Retreat(RetreatResponse),
    Blog(BlogResponse),
}

impl From<WishlistEntity> for EntityResponse {
    fn from(e: WishlistEntity) -> Self {
        match e {
            WishlistEntity::Retreat(r) => EntityResponse::Retreat(r.into()),
            WishlistEntity::Blog(b) => EntityResponse::Blog(b.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistGroupResponse {
    pub service_type: ServiceType,
    pub data: Vec<EntityResponse>,
}

impl From<WishlistGroup<WishlistEntity>> for WishlistGroupResponse {
    fn from(g: WishlistGroup<WishlistEntity>) -> Self {
        Self {
            service_type: g.service_type,
            data: g.data.into_iter().map(EntityResponse::from).collect(),
        }
    }
}

fn parse_item(body: &WishlistItemRequest) -> Result<(ServiceType, bson::oid::ObjectId), ApiError> {
    Ok((body.service_type, parse_id(&body.service_id, "service_id")?))
}

pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(body): Json<WishlistItemRequest>,
) -> Result<(StatusCode, Json<WishlistResponse>), ApiError> {
    let uid = parse_id(&user_id, "user_id")?;
    auth.require_self_or_admin(uid)?;
    let (service_type, service_id) = parse_item(&body)?;

    let wishlist = state
        .wishlists
        .add_item(uid, service_type, service_id)
        .await?;

    Ok((StatusCode::CREATED, Json(wishlist.into())))
}

pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(body): Json<WishlistItemRequest>,
) -> Result<Json<WishlistResponse>, ApiError> {
    let uid = parse_id(&user_id, "user_id")?;
    auth.require_self_or_admin(uid)?;
    let (service_type, service_id) = parse_item(&body)?;

    let wishlist = state
        .wishlists
        .remove_item(uid, service_type, service_id)
        .await?;

    Ok(Json(wishlist.into()))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<WishlistItemResponse>>, ApiError> {
    let uid = parse_id(&user_id, "user_id")?;
    auth.require_self_or_admin(uid)?;

    let items = state.wishlists.list_for_user(uid).await?;

    Ok(Json(items.into_iter().map(WishlistItemResponse::from).collect()))
}

pub async fn list_by_service_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((user_id, service_type)): Path<(String, String)>,
) -> Result<Json<Vec<WishlistGroupResponse>>, ApiError> {
    let uid = parse_id(&user_id, "user_id")?;
    auth.require_self_or_admin(uid)?;
    let service_type: ServiceType = service_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown service type '{service_type}'")))?;

    let groups = state
        .wishlists
        .list_for_user_by_service_type(uid, service_type)
        .await?;

    Ok(Json(groups.into_iter().map(WishlistGroupResponse::from).collect()))
}

pub async fn clear(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let uid = parse_id(&user_id, "user_id")?;
    auth.require_self_or_admin(uid)?;

    state.wishlists.clear(uid).await?;
    Ok(StatusCode::NO_CONTENT)
}
