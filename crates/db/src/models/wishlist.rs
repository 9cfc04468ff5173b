use std::fmt;
use std::str::FromStr;

use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItem {
    pub service_type: ServiceType,
    pub service_id: ObjectId,
    pub added_at: DateTime,
}

/// Which collection a wishlist item points into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ServiceType {
    #[serde(alias = "retreat")]
    Retreat,
    #[serde(alias = "blog")]
    Blog,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Retreat => "Retreat",
            ServiceType::Blog => "Blog",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Retreat" | "retreat" => Ok(ServiceType::Retreat),
            "Blog" | "blog" => Ok(ServiceType::Blog),
            other => Err(format!("Unknown service type: {other}")),
        }
    }
}

impl Wishlist {
    pub const COLLECTION: &'static str = "wishlists";

    pub fn contains(&self, service_type: ServiceType, service_id: ObjectId) -> bool {
        self.items
            .iter()
            .any(|i| i.service_type == service_type && i.service_id == service_id)
    }
}
