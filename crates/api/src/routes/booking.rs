use axum::{
    extract::State,
    http::StatusCode,
};
use bson::DateTime;
use retreats_db::models::{Accommodation, Booking, BookingStatus, Role};
use retreats_services::aggregate::BookingBuckets;
use retreats_services::dao::booking::{BookingRow, Checkout};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{DatesBody, parse_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub retreat_id: String,
    pub dates: DatesBody,
    #[validate(range(min = 1))]
    pub occupancy: u32,
    #[validate(length(min = 1))]
    pub room_type: String,
    #[validate(range(min = 1))]
    #[serde(default = "default_rooms")]
    pub rooms: u32,
}

fn default_rooms() -> u32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelRequest {
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccommodationResponse {
    pub room_type: String,
    pub rooms: u32,
    pub price: f64,
    pub images: Vec<String>,
}

impl From<Accommodation> for AccommodationResponse {
    fn from(a: Accommodation) -> Self {
        Self {
            room_type: a.room_type,
            rooms: a.rooms,
            price: a.price,
            images: a.images,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub user_id: String,
    pub retreat_id: String,
    pub dates: DatesBody,
    pub occupancy: u32,
    pub accommodation: AccommodationResponse,
    pub total_amount: f64,
    pub order_id: String,
    pub status: Option<String>,
    pub cancellation_reason: Option<String>,
    pub date_of_booking: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retreat_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retreat_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_mobile: Option<String>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: b.user_id.to_hex(),
            retreat_id: b.retreat_id.to_hex(),
            dates: b.dates.into(),
            occupancy: b.occupancy,
            accommodation: b.accommodation.into(),
            total_amount: b.total_amount,
            order_id: b.order_id,
            status: b.status.map(String::from),
            cancellation_reason: b.cancellation_reason,
            date_of_booking: rfc3339(b.date_of_booking),
            retreat_title: None,
            retreat_address: None,
            organizer_id: None,
            user_name: None,
            user_email: None,
            user_mobile: None,
        }
    }
}

impl From<BookingRow> for BookingResponse {
    fn from(r: BookingRow) -> Self {
        Self {
            id: r.id.to_hex(),
            user_id: r.user_id.to_hex(),
            retreat_id: r.retreat_id.to_hex(),
            dates: r.dates.into(),
            occupancy: r.occupancy,
            accommodation: r.accommodation.into(),
            total_amount: r.total_amount,
            order_id: r.order_id,
            status: r.status.map(String::from),
            cancellation_reason: r.cancellation_reason,
            date_of_booking: rfc3339(r.date_of_booking),
            retreat_title: r.retreat_title,
            retreat_address: r.retreat_address,
            organizer_id: r.organizer_id.map(|id| id.to_hex()),
            user_name: r.user_name,
            user_email: r.user_email,
            user_mobile: r.user_mobile,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganizerBookingsResponse {
    pub bookings: Vec<BookingResponse>,
    pub organization: String,
}

pub async fn checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), ApiError> {
    body.validate()?;
    let rid = parse_id(&body.retreat_id, "retreat_id")?;

    let retreat = state.retreats.base.find_by_id(rid).await?;

    let booking = state
        .bookings
        .create_and_notify(
            &state.users,
            auth.user_id,
            &retreat,
            Checkout {
                dates: body.dates.into(),
                occupancy: body.occupancy,
                room_type: body.room_type,
                rooms: body.rooms,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

pub async fn for_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<BookingBuckets<BookingResponse>>, ApiError> {
    let uid = parse_id(&user_id, "user_id")?;
    auth.require_self_or_admin(uid)?;

    let buckets = state
        .bookings
        .categorize_for_user(uid, DateTime::now())
        .await?;

    Ok(Json(buckets.map(BookingResponse::from)))
}

pub async fn for_organizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organizer_id): Path<String>,
) -> Result<Json<OrganizerBookingsResponse>, ApiError> {
    let oid = parse_id(&organizer_id, "organizer_id")?;
    auth.require_self_or_admin(oid)?;

    let (rows, organization) = state
        .bookings
        .confirmed_for_organizer(&state.users, oid)
        .await?;

    Ok(Json(OrganizerBookingsResponse {
        bookings: rows.into_iter().map(BookingResponse::from).collect(),
        organization,
    }))
}

pub async fn categorized_for_organizer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organizer_id): Path<String>,
) -> Result<Json<BookingBuckets<BookingResponse>>, ApiError> {
    let oid = parse_id(&organizer_id, "organizer_id")?;
    auth.require_self_or_admin(oid)?;

    let buckets = state
        .bookings
        .categorize_for_organizer(&state.users, oid, DateTime::now())
        .await?;

    Ok(Json(buckets.map(BookingResponse::from)))
}

/// Open to the guest, the retreat's organiser and admins.
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<String>,
    Json(body): Json<CancelRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    let bid = parse_id(&booking_id, "booking_id")?;
    body.validate()?;

    let booking = state.bookings.base.find_by_id(bid).await?;
    let retreat = state.retreats.base.find_by_id(booking.retreat_id).await?;

    let allowed = auth.role == Role::Admin
        || booking.user_id == auth.user_id
        || retreat.organizer_id == Some(auth.user_id);
    if !allowed {
        return Err(ApiError::Forbidden(
            "Not allowed to cancel this booking".to_string(),
        ));
    }

    let cancelled = state
        .bookings
        .cancel_and_notify(&state.users, bid, &body.reason, &retreat.title)
        .await?;

    Ok(Json(cancelled.into()))
}

pub async fn set_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(booking_id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<BookingResponse>, ApiError> {
    auth.require_admin()?;
    let bid = parse_id(&booking_id, "booking_id")?;

    let booking = state
        .bookings
        .set_status(bid, BookingStatus::from(body.status))
        .await?;

    Ok(Json(booking.into()))
}
