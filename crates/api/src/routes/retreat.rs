use axum::{
    extract::State,
    http::StatusCode,
};
use retreats_db::models::{FoodOption, Location, Retreat, Room, Teacher};
use retreats_services::dao::base::{PaginatedResult, PaginationParams};
use retreats_services::dao::retreat::{NewRetreat, RetreatUpdate, can_manage};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DatesBody, parse_id, parse_optional_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, Query, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBody {
    pub room_type: String,
    pub capacity: u32,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

impl From<RoomBody> for Room {
    fn from(r: RoomBody) -> Self {
        Self {
            room_type: r.room_type,
            capacity: r.capacity,
            price: r.price,
            images: r.images,
        }
    }
}

impl From<Room> for RoomBody {
    fn from(r: Room) -> Self {
        Self {
            room_type: r.room_type,
            capacity: r.capacity,
            price: r.price,
            images: r.images,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRetreatRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    pub location: Location,
    pub dates: DatesBody,
    #[serde(default)]
    pub rooms: Vec<RoomBody>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub food: Vec<FoodOption>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRetreatRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub location: Option<Location>,
    pub dates: Option<DatesBody>,
    pub rooms: Option<Vec<RoomBody>>,
    pub teachers: Option<Vec<Teacher>>,
    pub food: Option<Vec<FoodOption>>,
    pub category_id: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetreatResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub organizer_id: Option<String>,
    pub location: Location,
    pub dates: DatesBody,
    pub rooms: Vec<RoomBody>,
    pub teachers: Vec<Teacher>,
    pub food: Vec<FoodOption>,
    pub category_id: Option<String>,
    pub images: Vec<String>,
    pub is_approved: bool,
    pub is_created_by_admin: bool,
    pub created_at: String,
}

impl From<Retreat> for RetreatResponse {
    fn from(r: Retreat) -> Self {
        Self {
            id: r.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: r.title,
            description: r.description,
            price: r.price,
            organizer_id: r.organizer_id.map(|id| id.to_hex()),
            location: r.location,
            dates: r.dates.into(),
            rooms: r.rooms.into_iter().map(RoomBody::from).collect(),
            teachers: r.teachers,
            food: r.food,
            category_id: r.category_id.map(|id| id.to_hex()),
            images: r.images,
            is_approved: r.is_approved,
            is_created_by_admin: r.is_created_by_admin,
            created_at: rfc3339(r.created_at),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<RetreatResponse>>, ApiError> {
    let retreats = state.retreats.find_approved(&params).await?;
    Ok(Json(retreats.map(RetreatResponse::from)))
}

pub async fn list_all(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedResult<RetreatResponse>>, ApiError> {
    auth.require_admin()?;
    let retreats = state.retreats.find_all(&params).await?;
    Ok(Json(retreats.map(RetreatResponse::from)))
}

/// Other callers only see the organiser's approved retreats.
pub async fn by_organizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organizer_id): Path<String>,
) -> Result<Json<Vec<RetreatResponse>>, ApiError> {
    let oid = parse_id(&organizer_id, "organizer_id")?;
    let privileged = auth.require_self_or_admin(oid).is_ok();

    let retreats = state.retreats.find_by_organizer(oid).await?;
    let response = retreats
        .into_iter()
        .filter(|r| privileged || r.is_approved)
        .map(RetreatResponse::from)
        .collect();

    Ok(Json(response))
}

pub async fn get(
    State(state): State<AppState>,
    Path(retreat_id): Path<String>,
) -> Result<Json<RetreatResponse>, ApiError> {
    let rid = parse_id(&retreat_id, "retreat_id")?;
    let retreat = state.retreats.base.find_by_id(rid).await?;
    Ok(Json(retreat.into()))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateRetreatRequest>,
) -> Result<(StatusCode, Json<RetreatResponse>), ApiError> {
    body.validate()?;
    let category_id = parse_optional_id(body.category_id.as_deref(), "category_id")?;

    let retreat = state
        .retreats
        .create(
            auth.user_id,
            auth.role,
            NewRetreat {
                title: body.title,
                description: body.description,
                price: body.price,
                location: body.location,
                dates: body.dates.into(),
                rooms: body.rooms.into_iter().map(Room::from).collect(),
                teachers: body.teachers,
                food: body.food,
                category_id,
                images: body.images,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(retreat.into())))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(retreat_id): Path<String>,
    Json(body): Json<UpdateRetreatRequest>,
) -> Result<Json<RetreatResponse>, ApiError> {
    let rid = parse_id(&retreat_id, "retreat_id")?;
    body.validate()?;
    let category_id = parse_optional_id(body.category_id.as_deref(), "category_id")?;

    let existing = state.retreats.base.find_by_id(rid).await?;
    if !can_manage(&existing, auth.user_id, auth.role) {
        return Err(ApiError::Forbidden(
            "Only the owning organiser or an admin can edit this retreat".to_string(),
        ));
    }

    let retreat = state
        .retreats
        .update(
            rid,
            RetreatUpdate {
                title: body.title,
                description: body.description,
                price: body.price,
                location: body.location,
                dates: body.dates.map(Into::into),
                rooms: body
                    .rooms
                    .map(|rooms| rooms.into_iter().map(Room::from).collect()),
                teachers: body.teachers,
                food: body.food,
                category_id,
                images: body.images,
            },
        )
        .await?;

    Ok(Json(retreat.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(retreat_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;
    let rid = parse_id(&retreat_id, "retreat_id")?;

    state.retreats.delete(rid).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(retreat_id): Path<String>,
) -> Result<Json<RetreatResponse>, ApiError> {
    auth.require_admin()?;
    let rid = parse_id(&retreat_id, "retreat_id")?;

    let retreat = state.retreats.approve(rid).await?;
    Ok(Json(retreat.into()))
}
