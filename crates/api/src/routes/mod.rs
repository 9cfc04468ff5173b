pub mod auth;
pub mod blog;
pub mod booking;
pub mod category;
pub mod chat;
pub mod dashboard;
pub mod retreat;
pub mod review;
pub mod user;
pub mod wishlist;

use bson::{oid::ObjectId, DateTime};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub(crate) fn parse_id(raw: &str, field: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {field}")))
}

pub(crate) fn parse_optional_id(raw: Option<&str>, field: &str) -> Result<Option<ObjectId>, ApiError> {
    raw.map(|r| parse_id(r, field)).transpose()
}

pub(crate) fn rfc3339(dt: DateTime) -> String {
    dt.to_chrono().to_rfc3339()
}

/// Date range as carried over the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DatesBody {
    pub start: chrono::DateTime<Utc>,
    pub end: chrono::DateTime<Utc>,
}

impl From<DatesBody> for retreats_db::models::DateWindow {
    fn from(body: DatesBody) -> Self {
        Self {
            start: DateTime::from_chrono(body.start),
            end: DateTime::from_chrono(body.end),
        }
    }
}

impl From<retreats_db::models::DateWindow> for DatesBody {
    fn from(window: retreats_db::models::DateWindow) -> Self {
        Self {
            start: window.start.to_chrono(),
            end: window.end.to_chrono(),
        }
    }
}
