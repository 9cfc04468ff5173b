use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retreat {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// `None` when an admin created the retreat directly.
    pub organizer_id: Option<ObjectId>,
    #[serde(default)]
    pub location: Location,
    pub dates: DateWindow,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    #[serde(default)]
    pub food: Vec<FoodOption>,
    pub category_id: Option<ObjectId>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_approved: bool,
    #[serde(default)]
    pub is_created_by_admin: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Location {
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime,
    pub end: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub room_type: String,
    pub capacity: u32,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodOption {
    pub name: String,
    pub description: Option<String>,
}

impl Retreat {
    pub const COLLECTION: &'static str = "retreats";
}
