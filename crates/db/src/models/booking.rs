use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use super::DateWindow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub retreat_id: ObjectId,
    pub dates: DateWindow,
    pub occupancy: u32,
    pub accommodation: Accommodation,
    pub total_amount: f64,
    pub order_id: String,
    pub status: Option<BookingStatus>,
    pub cancellation_reason: Option<String>,
    pub date_of_booking: DateTime,
}

/// Room details copied from the retreat when the booking is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Accommodation {
    pub room_type: String,
    pub rooms: u32,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Stored as a plain string; values outside the known lifecycle survive a
/// round trip as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
            BookingStatus::Other(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BookingStatus::Other(s) if s.trim().is_empty())
    }
}

impl From<String> for BookingStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => BookingStatus::Pending,
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            "completed" => BookingStatus::Completed,
            _ => BookingStatus::Other(value),
        }
    }
}

impl From<BookingStatus> for String {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl Booking {
    pub const COLLECTION: &'static str = "bookings";
}
