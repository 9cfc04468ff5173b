use std::collections::HashMap;

use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use retreats_db::models::{Retreat, Role, User};
use serde::{Deserialize, Serialize};

use super::base::DaoResult;
use super::booking::BookingDao;
use super::retreat::RetreatDao;
use super::review::ReviewDao;
use super::user::UserDao;
use crate::aggregate::{
    BookingSummary, Bucket, MonthlyRevenue, classify, monthly_totals, revenue_by_month,
};

/// One booking on an organiser's retreat, as shown in the revenue report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRow {
    pub order_id: String,
    pub total_amount: f64,
    pub date_of_booking: DateTime,
    pub payer_name: Option<String>,
    pub payer_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RevenueReport {
    pub organizer_id: ObjectId,
    pub total_revenue: f64,
    pub revenue: Vec<MonthlyRevenue>,
    pub payment_details: Vec<PaymentRow>,
}

#[derive(Debug, Clone)]
pub struct RetreatSummary {
    pub retreat_id: ObjectId,
    pub title: String,
    pub summary: BookingSummary,
}

#[derive(Debug, Clone)]
pub struct OrganizerSummary {
    pub organizer_id: ObjectId,
    pub name: String,
    pub summary: BookingSummary,
    pub retreats: Vec<RetreatSummary>,
}

#[derive(Debug, Clone)]
pub struct UserActivity {
    pub user_id: ObjectId,
    pub name: String,
    pub email: String,
    pub total_bookings: u64,
    pub upcoming_bookings: u64,
}

#[derive(Debug, Clone)]
pub struct OrganizerActivity {
    pub organizer_id: ObjectId,
    pub name: String,
    pub organization: Option<String>,
    pub retreat_count: u64,
    pub review_count: u64,
}

/// Read-only reports spanning bookings, retreats, users and reviews.
pub struct DashboardDao {
    users: UserDao,
    retreats: RetreatDao,
    bookings: BookingDao,
    reviews: ReviewDao,
}

impl DashboardDao {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserDao::new(db),
            retreats: RetreatDao::new(db),
            bookings: BookingDao::new(db),
            reviews: ReviewDao::new(db),
        }
    }

    pub async fn monthly_revenue(&self, organizer_id: ObjectId) -> DaoResult<RevenueReport> {
        let pipeline = vec![
            doc! { "$lookup": {
                "from": Retreat::COLLECTION,
                "localField": "retreat_id",
                "foreignField": "_id",
                "as": "retreat",
            } },
            doc! { "$unwind": "$retreat" },
            doc! { "$match": { "retreat.organizer_id": organizer_id } },
            doc! { "$lookup": {
                "from": User::COLLECTION,
                "localField": "user_id",
                "foreignField": "_id",
                "as": "payer",
            } },
            doc! { "$project": {
                "_id": 0,
                "order_id": 1,
                "total_amount": 1,
                "date_of_booking": 1,
                "payer_name": { "$arrayElemAt": ["$payer.name", 0] },
                "payer_image": { "$arrayElemAt": ["$payer.profile_image", 0] },
            } },
            doc! { "$sort": { "date_of_booking": 1 } },
        ];

        let payment_details: Vec<PaymentRow> = self.bookings.base.aggregate(pipeline).await?;

        let totals = monthly_totals(
            payment_details
                .iter()
                .map(|p| (p.date_of_booking, p.total_amount)),
        );

        Ok(RevenueReport {
            organizer_id,
            total_revenue: totals.iter().sum(),
            revenue: revenue_by_month(totals),
            payment_details,
        })
    }

    pub async fn organizer_summary(&self, organizer_id: ObjectId) -> DaoResult<OrganizerSummary> {
        let organiser = self.users.find_organiser(organizer_id).await?;
        let retreats = self.retreats.find_by_organizer(organizer_id).await?;
        let retreat_ids: Vec<ObjectId> = retreats.iter().filter_map(|r| r.id).collect();
        let bookings = self.bookings.find_by_retreats(&retreat_ids).await?;

        let mut overall = BookingSummary::default();
        let mut per_retreat: HashMap<ObjectId, BookingSummary> = HashMap::new();
        for booking in &bookings {
            overall.record(booking.status.as_ref(), booking.total_amount);
            per_retreat
                .entry(booking.retreat_id)
                .or_default()
                .record(booking.status.as_ref(), booking.total_amount);
        }

        let retreats = retreats
            .into_iter()
            .filter_map(|r| {
                let id = r.id?;
                Some(RetreatSummary {
                    retreat_id: id,
                    title: r.title,
                    summary: per_retreat.remove(&id).unwrap_or_default(),
                })
            })
            .collect();

        Ok(OrganizerSummary {
            organizer_id,
            name: organiser.name,
            summary: overall,
            retreats,
        })
    }

    pub async fn users_dashboard(&self, limit: i64, now: DateTime) -> DaoResult<Vec<UserActivity>> {
        let users = self.users.find_by_role(Role::User, limit).await?;
        let user_ids: Vec<ObjectId> = users.iter().filter_map(|u| u.id).collect();
        let bookings = self.bookings.find_by_users(&user_ids).await?;

        let mut counts: HashMap<ObjectId, (u64, u64)> = HashMap::new();
        for booking in &bookings {
            let entry = counts.entry(booking.user_id).or_default();
            entry.0 += 1;
            if classify(booking.status.as_ref(), booking.dates.start, now) == Bucket::Upcoming {
                entry.1 += 1;
            }
        }

        Ok(users
            .into_iter()
            .filter_map(|u| {
                let id = u.id?;
                let (total, upcoming) = counts.get(&id).copied().unwrap_or_default();
                Some(UserActivity {
                    user_id: id,
                    name: u.name,
                    email: u.email,
                    total_bookings: total,
                    upcoming_bookings: upcoming,
                })
            })
            .collect())
    }

    pub async fn organizers_dashboard(&self, limit: i64) -> DaoResult<Vec<OrganizerActivity>> {
        let organisers = self.users.find_by_role(Role::Organiser, limit).await?;
        let organiser_ids: Vec<ObjectId> = organisers.iter().filter_map(|u| u.id).collect();
        let retreats = self.retreats.find_by_organizers(&organiser_ids).await?;

        let mut owner_of: HashMap<ObjectId, ObjectId> = HashMap::new();
        let mut retreat_counts: HashMap<ObjectId, u64> = HashMap::new();
        for retreat in &retreats {
            if let (Some(id), Some(owner)) = (retreat.id, retreat.organizer_id) {
                owner_of.insert(id, owner);
                *retreat_counts.entry(owner).or_default() += 1;
            }
        }

        let retreat_ids: Vec<ObjectId> = owner_of.keys().copied().collect();
        let reviews = self.reviews.find_by_retreats(&retreat_ids).await?;

        let mut review_counts: HashMap<ObjectId, u64> = HashMap::new();
        for container in &reviews {
            if let Some(owner) = owner_of.get(&container.retreat_id) {
                *review_counts.entry(*owner).or_default() += container.reviews.len() as u64;
            }
        }

        Ok(organisers
            .into_iter()
            .filter_map(|u| {
                let id = u.id?;
                Some(OrganizerActivity {
                    organizer_id: id,
                    name: u.name,
                    organization: u.organization.map(|o| o.name),
                    retreat_count: retreat_counts.get(&id).copied().unwrap_or(0),
                    review_count: review_counts.get(&id).copied().unwrap_or(0),
                })
            })
            .collect())
    }
}
