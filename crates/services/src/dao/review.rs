use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Database;
use retreats_db::models::{Review, ReviewEntry, User};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult};
use super::retreat::RetreatDao;
use super::user::UserDao;
use crate::aggregate::{average_rating, rating_in_range};

pub struct NewReview {
    pub rating: i32,
    pub comment: String,
}

/// One review entry flattened out of its container, with the poster's current name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRow {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub rating: i32,
    pub comment: String,
    #[serde(default)]
    pub helpful_count: i32,
    pub date_posted: DateTime,
    pub username: String,
    #[serde(default)]
    pub retreat_name: String,
}

pub struct ReviewDao {
    pub base: BaseDao<Review>,
}

impl ReviewDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Review::COLLECTION),
        }
    }

    /// Appends to the (user, retreat) container, creating it on first review.
    /// Returns the container's full entry list and the poster's name.
    pub async fn add_or_append(
        &self,
        users: &UserDao,
        retreats: &RetreatDao,
        user_id: ObjectId,
        retreat_id: ObjectId,
        entries: Vec<NewReview>,
    ) -> DaoResult<(Vec<ReviewEntry>, String)> {
        if entries.is_empty() {
            return Err(DaoError::Validation(
                "At least one review is required".to_string(),
            ));
        }
        for entry in &entries {
            validate_entry(entry.rating, &entry.comment)?;
        }

        let poster = users.base.find_by_id(user_id).await?;
        retreats.base.find_by_id(retreat_id).await?;

        let now = DateTime::now();
        let stamped: Vec<ReviewEntry> = entries
            .into_iter()
            .map(|e| ReviewEntry {
                id: ObjectId::new(),
                rating: e.rating,
                comment: e.comment.trim().to_string(),
                helpful_count: 0,
                date_posted: now,
                username: poster.name.clone(),
            })
            .collect();

        let filter = doc! { "user_id": user_id, "retreat_id": retreat_id };
        match self.base.find_one(filter.clone()).await? {
            Some(_) => {
                self.base
                    .update_one(
                        filter.clone(),
                        doc! {
                            "$push": { "reviews": { "$each": bson::to_bson(&stamped)? } },
                            "$set": { "updated_at": now },
                        },
                    )
                    .await?;
            }
            None => {
                let container = Review {
                    id: None,
                    user_id,
                    retreat_id,
                    reviews: stamped,
                    created_at: now,
                    updated_at: now,
                };
                self.base.insert_one(&container).await?;
            }
        }

        let container = self
            .base
            .find_one(filter)
            .await?
            .ok_or_else(|| DaoError::not_found("Review"))?;

        Ok((container.reviews, poster.name))
    }

    /// Every entry posted on the retreat, joined to its poster and tagged with the retreat title.
    pub async fn for_retreat(
        &self,
        retreats: &RetreatDao,
        retreat_id: ObjectId,
    ) -> DaoResult<Vec<ReviewRow>> {
        let retreat = retreats.base.find_by_id(retreat_id).await?;

        let pipeline = vec![
            doc! { "$match": { "retreat_id": retreat_id } },
            doc! { "$unwind": "$reviews" },
            doc! { "$lookup": {
                "from": User::COLLECTION,
                "localField": "user_id",
                "foreignField": "_id",
                "as": "poster",
            } },
            doc! { "$project": {
                "_id": "$reviews._id",
                "user_id": 1,
                "rating": "$reviews.rating",
                "comment": "$reviews.comment",
                "helpful_count": "$reviews.helpful_count",
                "date_posted": "$reviews.date_posted",
                "username": {
                    "$ifNull": [{ "$arrayElemAt": ["$poster.name", 0] }, "Anonymous"]
                },
            } },
        ];

        let mut rows: Vec<ReviewRow> = self.base.aggregate(pipeline).await?;
        if rows.is_empty() {
            return Err(DaoError::NotFound(
                "No reviews found for this retreat".to_string(),
            ));
        }
        for row in &mut rows {
            row.retreat_name = retreat.title.clone();
        }
        Ok(rows)
    }

    pub async fn average_rating(&self, retreat_id: ObjectId) -> DaoResult<f64> {
        let containers = self
            .base
            .find_many(doc! { "retreat_id": retreat_id }, None)
            .await?;

        Ok(average_rating(
            containers
                .iter()
                .flat_map(|c| c.reviews.iter().map(|e| e.rating)),
        ))
    }

    /// Edits an entry only if it sits in `user_id`'s own container.
    pub async fn edit(
        &self,
        user_id: ObjectId,
        review_id: ObjectId,
        rating: i32,
        comment: &str,
    ) -> DaoResult<ReviewEntry> {
        self.apply_edit(
            doc! { "user_id": user_id, "reviews._id": review_id },
            review_id,
            rating,
            comment,
        )
        .await
    }

    /// Edits an entry wherever it lives; callers must already hold admin rights.
    pub async fn admin_edit(
        &self,
        review_id: ObjectId,
        rating: i32,
        comment: &str,
    ) -> DaoResult<ReviewEntry> {
        self.apply_edit(doc! { "reviews._id": review_id }, review_id, rating, comment)
            .await
    }

    async fn apply_edit(
        &self,
        filter: Document,
        review_id: ObjectId,
        rating: i32,
        comment: &str,
    ) -> DaoResult<ReviewEntry> {
        validate_entry(rating, comment)?;

        let mut container = self
            .base
            .find_one(filter)
            .await?
            .ok_or_else(|| DaoError::not_found("Review"))?;
        let container_id = container
            .id
            .ok_or_else(|| DaoError::Internal("Review container without id".to_string()))?;

        let now = DateTime::now();
        let entry = container
            .entry_mut(review_id)
            .ok_or_else(|| DaoError::not_found("Review"))?;
        entry.rating = rating;
        entry.comment = comment.trim().to_string();
        entry.date_posted = now;
        let edited = entry.clone();

        self.base
            .update_by_id(
                container_id,
                doc! { "$set": {
                    "reviews": bson::to_bson(&container.reviews)?,
                    "updated_at": now,
                } },
            )
            .await?;

        info!(%review_id, "Review edited");
        Ok(edited)
    }

    pub async fn mark_helpful(&self, review_id: ObjectId) -> DaoResult<()> {
        let matched = self
            .base
            .update_one(
                doc! { "reviews._id": review_id },
                doc! { "$inc": { "reviews.$.helpful_count": 1 } },
            )
            .await?;
        if !matched {
            return Err(DaoError::not_found("Review"));
        }
        Ok(())
    }

    pub async fn admin_delete(&self, review_id: ObjectId) -> DaoResult<()> {
        let matched = self
            .base
            .update_one(
                doc! { "reviews._id": review_id },
                doc! {
                    "$pull": { "reviews": { "_id": review_id } },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .await?;
        if !matched {
            return Err(DaoError::not_found("Review"));
        }
        info!(%review_id, "Review deleted by admin");
        Ok(())
    }

    pub async fn find_by_retreats(&self, retreat_ids: &[ObjectId]) -> DaoResult<Vec<Review>> {
        if retreat_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "retreat_id": { "$in": retreat_ids.to_vec() } }, None)
            .await
    }
}

fn validate_entry(rating: i32, comment: &str) -> DaoResult<()> {
    if !rating_in_range(rating) {
        return Err(DaoError::Validation(
            "Rating must be between 1 and 5".to_string(),
        ));
    }
    if comment.trim().is_empty() {
        return Err(DaoError::Validation("Comment cannot be empty".to_string()));
    }
    Ok(())
}
