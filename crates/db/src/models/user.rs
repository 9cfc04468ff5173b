use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub profile_image: Option<String>,
    /// Present only for organisers.
    pub organization: Option<Organization>,
    #[serde(default)]
    pub notifications: Vec<UserNotification>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Organiser,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Organiser => "organiser",
            Role::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserNotification {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime,
}

impl UserNotification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            title: title.into(),
            message: message.into(),
            is_read: false,
            created_at: DateTime::now(),
        }
    }
}

impl User {
    pub const COLLECTION: &'static str = "users";
}
