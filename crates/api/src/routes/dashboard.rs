use axum::extract::State;
use bson::DateTime;
use retreats_services::aggregate::{BookingSummary, MonthlyRevenue};
use retreats_services::dao::dashboard::{
    OrganizerActivity, PaymentRow, RetreatSummary, UserActivity,
};
use serde::Serialize;

use super::{parse_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub order_id: String,
    pub total_amount: f64,
    pub date_of_booking: String,
    pub payer_name: Option<String>,
    pub payer_image: Option<String>,
}

impl From<PaymentRow> for PaymentResponse {
    fn from(p: PaymentRow) -> Self {
        Self {
            order_id: p.order_id,
            total_amount: p.total_amount,
            date_of_booking: rfc3339(p.date_of_booking),
            payer_name: p.payer_name,
            payer_image: p.payer_image,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueResponse {
    pub organiser_id: String,
    pub total_revenue: f64,
    pub revenue: Vec<MonthlyRevenue>,
    pub payment_details: Vec<PaymentResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetreatSummaryResponse {
    pub retreat_id: String,
    pub title: String,
    #[serde(flatten)]
    pub summary: BookingSummary,
}

impl From<RetreatSummary> for RetreatSummaryResponse {
    fn from(r: RetreatSummary) -> Self {
        Self {
            retreat_id: r.retreat_id.to_hex(),
            title: r.title,
            summary: r.summary,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerSummaryResponse {
    pub organiser_id: String,
    pub name: String,
    #[serde(flatten)]
    pub summary: BookingSummary,
    pub retreats: Vec<RetreatSummaryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub total_bookings: u64,
    pub upcoming_bookings: u64,
}

impl From<UserActivity> for UserActivityResponse {
    fn from(u: UserActivity) -> Self {
        Self {
            user_id: u.user_id.to_hex(),
            name: u.name,
            email: u.email,
            total_bookings: u.total_bookings,
            upcoming_bookings: u.upcoming_bookings,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerActivityResponse {
    pub organiser_id: String,
    pub name: String,
    pub organization: Option<String>,
    pub retreat_count: u64,
    pub review_count: u64,
}

impl From<OrganizerActivity> for OrganizerActivityResponse {
    fn from(o: OrganizerActivity) -> Self {
        Self {
            organiser_id: o.organizer_id.to_hex(),
            name: o.name,
            organization: o.organization,
            retreat_count: o.retreat_count,
            review_count: o.review_count,
        }
    }
}

pub async fn revenue(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organizer_id): Path<String>,
) -> Result<Json<RevenueResponse>, ApiError> {
    let oid = parse_id(&organizer_id, "organizer_id")?;
    auth.require_self_or_admin(oid)?;

    let report = state.dashboard.monthly_revenue(oid).await?;

    Ok(Json(RevenueResponse {
        organiser_id: report.organizer_id.to_hex(),
        total_revenue: report.total_revenue,
        revenue: report.revenue,
        payment_details: report
            .payment_details
            .into_iter()
            .map(PaymentResponse::from)
            .collect(),
    }))
}

pub async fn organizer_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organizer_id): Path<String>,
) -> Result<Json<OrganizerSummaryResponse>, ApiError> {
    let oid = parse_id(&organizer_id, "organizer_id")?;
    auth.require_self_or_admin(oid)?;

    let summary = state.dashboard.organizer_summary(oid).await?;

    Ok(Json(OrganizerSummaryResponse {
        organiser_id: summary.organizer_id.to_hex(),
        name: summary.name,
        summary: summary.summary,
        retreats: summary
            .retreats
            .into_iter()
            .map(RetreatSummaryResponse::from)
            .collect(),
    }))
}

pub async fn users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserActivityResponse>>, ApiError> {
    auth.require_admin()?;

    let rows = state
        .dashboard
        .users_dashboard(state.settings.dashboard.row_limit, DateTime::now())
        .await?;

    Ok(Json(rows.into_iter().map(UserActivityResponse::from).collect()))
}

pub async fn organizers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<OrganizerActivityResponse>>, ApiError> {
    auth.require_admin()?;

    let rows = state
        .dashboard
        .organizers_dashboard(state.settings.dashboard.row_limit)
        .await?;

    Ok(Json(rows.into_iter().map(OrganizerActivityResponse::from).collect()))
}
