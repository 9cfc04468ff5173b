use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Conversation between a guest and the organiser of a retreat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub retreat_id: ObjectId,
    pub user_id: ObjectId,
    pub organizer_id: Option<ObjectId>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub sent_by: ChatParty,
    pub text: String,
    pub timestamp: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatParty {
    User,
    Organiser,
}

impl Chat {
    pub const COLLECTION: &'static str = "chats";
}
