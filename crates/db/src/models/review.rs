use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// All reviews one user has left on one retreat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub retreat_id: ObjectId,
    #[serde(default)]
    pub reviews: Vec<ReviewEntry>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub rating: i32,
    pub comment: String,
    #[serde(default)]
    pub helpful_count: i32,
    pub date_posted: DateTime,
    pub username: String,
}

impl Review {
    pub const COLLECTION: &'static str = "reviews";

    pub fn entry_mut(&mut self, entry_id: ObjectId) -> Option<&mut ReviewEntry> {
        self.reviews.iter_mut().find(|e| e.id == entry_id)
    }
}
