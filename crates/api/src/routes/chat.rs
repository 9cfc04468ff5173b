use axum::extract::State;
use retreats_db::models::{Chat, ChatMessage, ChatParty, Role};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{parse_id, parse_optional_id, rfc3339};
use crate::{
    error::ApiError,
    extractors::{Json, Path, auth::AuthUser},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub retreat_id: String,
    /// The guest being answered; required when the retreat's organiser writes.
    pub user_id: Option<String>,
    #[validate(length(min = 1, max = 4000))]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub sent_by: ChatParty,
    pub text: String,
    pub timestamp: String,
}

impl From<ChatMessage> for MessageResponse {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id.to_hex(),
            sent_by: m.sent_by,
            text: m.text,
            timestamp: rfc3339(m.timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: String,
    pub retreat_id: String,
    pub user_id: String,
    pub organizer_id: Option<String>,
    pub messages: Vec<MessageResponse>,
    pub updated_at: String,
}

impl From<Chat> for ChatResponse {
    fn from(c: Chat) -> Self {
        Self {
            id: c.id.map(|id| id.to_hex()).unwrap_or_default(),
            retreat_id: c.retreat_id.to_hex(),
            user_id: c.user_id.to_hex(),
            organizer_id: c.organizer_id.map(|id| id.to_hex()),
            messages: c.messages.into_iter().map(MessageResponse::from).collect(),
            updated_at: rfc3339(c.updated_at),
        }
    }
}

pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    body.validate()?;
    let rid = parse_id(&body.retreat_id, "retreat_id")?;
    let guest_id = parse_optional_id(body.user_id.as_deref(), "user_id")?;

    let retreat = state.retreats.base.find_by_id(rid).await?;

    let (user_id, sent_by) = if retreat.organizer_id == Some(auth.user_id) {
        let guest = guest_id.ok_or_else(|| {
            ApiError::BadRequest("userId is required when replying as organiser".to_string())
        })?;
        (guest, ChatParty::Organiser)
    } else {
        (auth.user_id, ChatParty::User)
    };

    let chat = state
        .chats
        .send(&retreat, user_id, sent_by, &body.text)
        .await?;

    Ok(Json(chat.into()))
}

pub async fn for_user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ChatResponse>>, ApiError> {
    let chats = match auth.role {
        Role::Organiser => state.chats.find_for_organizer(auth.user_id).await?,
        _ => state.chats.find_for_user(auth.user_id).await?,
    };

    Ok(Json(chats.into_iter().map(ChatResponse::from).collect()))
}

/// The organiser and admins see every conversation; guests only their own.
pub async fn for_retreat(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(retreat_id): Path<String>,
) -> Result<Json<Vec<ChatResponse>>, ApiError> {
    let rid = parse_id(&retreat_id, "retreat_id")?;
    let retreat = state.retreats.base.find_by_id(rid).await?;

    let sees_all = auth.role == Role::Admin || retreat.organizer_id == Some(auth.user_id);
    let chats = state.chats.find_for_retreat(rid).await?;

    Ok(Json(
        chats
            .into_iter()
            .filter(|c| sees_all || c.user_id == auth.user_id)
            .map(ChatResponse::from)
            .collect(),
    ))
}
