use axum::extract::State;
use retreats_db::models::{Role, UserNotification};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<UserNotification> for NotificationResponse {
    fn from(n: UserNotification) -> Self {
        Self {
            id: n.id.to_hex(),
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            created_at: rfc3339(n.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BroadcastRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    /// Limits the broadcast to one role.
    pub role: Option<Role>,
}

pub async fn notifications(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;

    // Newest first.
    let response = user
        .notifications
        .into_iter()
        .rev()
        .map(NotificationResponse::from)
        .collect();

    Ok(Json(response))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let nid = parse_id(&notification_id, "notification_id")?;

    state.users.mark_notification_read(auth.user_id, nid).await?;

    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn broadcast(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<BroadcastRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth.require_admin()?;
    body.validate()?;

    let notification = UserNotification::new(body.title, body.message);
    let reached = state.users.broadcast(body.role, &notification).await?;

    Ok(Json(serde_json::json!({ "success": true, "reached": reached })))
}
