use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Database;
use retreats_db::models::{
    Accommodation, Booking, BookingStatus, DateWindow, Retreat, User, UserNotification,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult};
use super::user::UserDao;
use crate::aggregate::{BookingBuckets, Categorize, categorize};

const ORDER_ID_ALPHABET: [char; 32] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

pub struct Checkout {
    pub dates: DateWindow,
    pub occupancy: u32,
    pub room_type: String,
    pub rooms: u32,
}

/// A booking joined with the display fields of its retreat and guest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRow {
    #[serde(rename = "_id")]
    pub id: ObjectId,
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
    pub retreat_title: Option<String>,
    pub retreat_address: Option<String>,
    pub organizer_id: Option<ObjectId>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_mobile: Option<String>,
}

impl Categorize for BookingRow {
    fn status(&self) -> Option<&BookingStatus> {
        self.status.as_ref()
    }

    fn start(&self) -> DateTime {
        self.dates.start
    }
}

pub struct BookingDao {
    pub base: BaseDao<Booking>,
}

impl BookingDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Booking::COLLECTION),
        }
    }

    /// Books a room type of `retreat`, snapshotting the room's price and images.
    pub async fn create(
        &self,
        user_id: ObjectId,
        retreat: &Retreat,
        checkout: Checkout,
    ) -> DaoResult<Booking> {
        let retreat_id = retreat
            .id
            .ok_or_else(|| DaoError::Internal("Retreat without id".to_string()))?;

        if !retreat.is_approved {
            return Err(DaoError::Validation(
                "Retreat is not open for booking".to_string(),
            ));
        }
        if checkout.dates.end < checkout.dates.start {
            return Err(DaoError::Validation(
                "Booking end date must not precede its start date".to_string(),
            ));
        }
        if checkout.occupancy == 0 || checkout.rooms == 0 {
            return Err(DaoError::Validation(
                "Occupancy and room count must be at least 1".to_string(),
            ));
        }

        let room = retreat
            .rooms
            .iter()
            .find(|r| r.room_type == checkout.room_type)
            .ok_or_else(|| {
                DaoError::Validation(format!(
                    "Retreat has no room of type '{}'",
                    checkout.room_type
                ))
            })?;

        let booking = Booking {
            id: None,
            user_id,
            retreat_id,
            dates: checkout.dates,
            occupancy: checkout.occupancy,
            accommodation: Accommodation {
                room_type: room.room_type.clone(),
                rooms: checkout.rooms,
                price: room.price,
                images: room.images.clone(),
            },
            total_amount: room.price * checkout.rooms as f64,
            order_id: format!("ORD-{}", nanoid::nanoid!(12, &ORDER_ID_ALPHABET)),
            status: Some(BookingStatus::Confirmed),
            cancellation_reason: None,
            date_of_booking: DateTime::now(),
        };

        let id = self.base.insert_one(&booking).await?;
        info!(%id, order_id = %booking.order_id, %retreat_id, "Booking created");
        self.base.find_by_id(id).await
    }

    /// Creates the booking, then notifies the guest. The two writes are not atomic.
    pub async fn create_and_notify(
        &self,
        users: &UserDao,
        user_id: ObjectId,
        retreat: &Retreat,
        checkout: Checkout,
    ) -> DaoResult<Booking> {
        let booking = self.create(user_id, retreat, checkout).await?;

        let notification = UserNotification::new(
            "Booking confirmed",
            format!(
                "Your booking {} for {} is confirmed.",
                booking.order_id, retreat.title
            ),
        );
        users.push_notification(user_id, &notification).await?;

        Ok(booking)
    }

    /// Bookings matching `filter`, each joined to its retreat and guest.
    /// `retreat_filter` is applied after the join, against `retreat.*` fields.
    pub async fn find_rows(
        &self,
        filter: Document,
        retreat_filter: Option<Document>,
    ) -> DaoResult<Vec<BookingRow>> {
        let mut pipeline = vec![
            doc! { "$match": filter },
            doc! { "$lookup": {
                "from": Retreat::COLLECTION,
                "localField": "retreat_id",
                "foreignField": "_id",
                "as": "retreat",
            } },
            doc! { "$unwind": { "path": "$retreat", "preserveNullAndEmptyArrays": true } },
        ];
        if let Some(retreat_filter) = retreat_filter {
            pipeline.push(doc! { "$match": retreat_filter });
        }
        pipeline.extend([
            doc! { "$lookup": {
                "from": User::COLLECTION,
                "localField": "user_id",
                "foreignField": "_id",
                "as": "guest",
            } },
            doc! { "$unwind": { "path": "$guest", "preserveNullAndEmptyArrays": true } },
            doc! { "$addFields": {
                "retreat_title": "$retreat.title",
                "retreat_address": "$retreat.location.address",
                "organizer_id": "$retreat.organizer_id",
                "user_name": "$guest.name",
                "user_email": "$guest.email",
                "user_mobile": "$guest.mobile",
            } },
            doc! { "$project": { "retreat": 0, "guest": 0 } },
        ]);

        self.base.aggregate(pipeline).await
    }

    pub async fn categorize_for_user(
        &self,
        user_id: ObjectId,
        now: DateTime,
    ) -> DaoResult<BookingBuckets<BookingRow>> {
        let rows = self.find_rows(doc! { "user_id": user_id }, None).await?;
        Ok(categorize(rows, now))
    }

    /// Fails with `NotFound` unless the organiser has an organization profile.
    pub async fn categorize_for_organizer(
        &self,
        users: &UserDao,
        organizer_id: ObjectId,
        now: DateTime,
    ) -> DaoResult<BookingBuckets<BookingRow>> {
        organization_name(users, organizer_id).await?;

        let rows = self
            .find_rows(doc! {}, Some(doc! { "retreat.organizer_id": organizer_id }))
            .await?;
        Ok(categorize(rows, now))
    }

    /// Confirmed bookings on the organiser's retreats, plus their organization name.
    pub async fn confirmed_for_organizer(
        &self,
        users: &UserDao,
        organizer_id: ObjectId,
    ) -> DaoResult<(Vec<BookingRow>, String)> {
        let organization = organization_name(users, organizer_id).await?;

        let rows = self
            .find_rows(
                doc! { "status": BookingStatus::Confirmed.as_str() },
                Some(doc! { "retreat.organizer_id": organizer_id }),
            )
            .await?;

        Ok((rows, organization))
    }

    pub async fn cancel(&self, booking_id: ObjectId, reason: &str) -> DaoResult<Booking> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DaoError::Validation(
                "A cancellation reason is required".to_string(),
            ));
        }

        let booking = self.base.find_by_id(booking_id).await?;
        match booking.status {
            Some(BookingStatus::Pending) | Some(BookingStatus::Confirmed) => {}
            _ => {
                return Err(DaoError::Validation(
                    "Only pending or confirmed bookings can be cancelled".to_string(),
                ));
            }
        }

        self.base
            .update_by_id(
                booking_id,
                doc! { "$set": {
                    "status": BookingStatus::Cancelled.as_str(),
                    "cancellation_reason": reason,
                } },
            )
            .await?;

        info!(%booking_id, order_id = %booking.order_id, "Booking cancelled");
        self.base.find_by_id(booking_id).await
    }

    /// Cancels the booking, then tells the guest why. A failed notification
    /// leaves the booking cancelled.
    pub async fn cancel_and_notify(
        &self,
        users: &UserDao,
        booking_id: ObjectId,
        reason: &str,
        retreat_title: &str,
    ) -> DaoResult<Booking> {
        let booking = self.cancel(booking_id, reason).await?;

        let notification = UserNotification::new(
            "Booking cancelled",
            format!(
                "Your booking {} for {} was cancelled. Reason: {}",
                booking.order_id,
                retreat_title,
                booking.cancellation_reason.as_deref().unwrap_or(reason)
            ),
        );
        users.push_notification(booking.user_id, &notification).await?;

        Ok(booking)
    }

    /// Admin override; the only path to `completed`.
    pub async fn set_status(
        &self,
        booking_id: ObjectId,
        status: BookingStatus,
    ) -> DaoResult<Booking> {
        if status.is_empty() {
            return Err(DaoError::Validation("Status cannot be empty".to_string()));
        }

        let matched = self
            .base
            .update_by_id(booking_id, doc! { "$set": { "status": status.as_str() } })
            .await?;
        if !matched {
            return Err(DaoError::not_found("Booking"));
        }

        info!(%booking_id, status = status.as_str(), "Booking status changed");
        self.base.find_by_id(booking_id).await
    }

    pub async fn find_by_retreats(&self, retreat_ids: &[ObjectId]) -> DaoResult<Vec<Booking>> {
        if retreat_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "retreat_id": { "$in": retreat_ids.to_vec() } }, None)
            .await
    }

    pub async fn find_by_users(&self, user_ids: &[ObjectId]) -> DaoResult<Vec<Booking>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "user_id": { "$in": user_ids.to_vec() } }, None)
            .await
    }
}

async fn organization_name(users: &UserDao, organizer_id: ObjectId) -> DaoResult<String> {
    users
        .base
        .find_by_id(organizer_id)
        .await?
        .organization
        .map(|o| o.name)
        .ok_or_else(|| DaoError::not_found("Organization"))
}
