use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    pub author_id: ObjectId,
    pub image: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Blog {
    pub const COLLECTION: &'static str = "blogs";
}
