use bson::{Document, doc};
use mongodb::{Database, IndexModel, options::IndexOptions};
use tracing::{debug, info};

use crate::models::{Blog, Booking, Category, Chat, Retreat, Review, User, Wishlist};

/// Uniqueness here backs the duplicate checks the DAOs report as conflicts:
/// user email, retreat title, booking order id, one review container per
/// (user, retreat), one chat per (retreat, guest), one wishlist per user.
fn index_plan() -> Vec<(&'static str, Vec<IndexModel>)> {
    vec![
        (
            User::COLLECTION,
            vec![unique(doc! { "email": 1 }), plain(doc! { "role": 1 })],
        ),
        (
            Retreat::COLLECTION,
            vec![
                unique(doc! { "title": 1 }),
                plain(doc! { "organizer_id": 1 }),
                plain(doc! { "is_approved": 1, "created_at": -1 }),
            ],
        ),
        (
            Booking::COLLECTION,
            vec![
                unique(doc! { "order_id": 1 }),
                plain(doc! { "user_id": 1, "date_of_booking": -1 }),
                plain(doc! { "retreat_id": 1, "status": 1 }),
            ],
        ),
        (
            Review::COLLECTION,
            vec![
                unique(doc! { "user_id": 1, "retreat_id": 1 }),
                plain(doc! { "retreat_id": 1 }),
                plain(doc! { "reviews._id": 1 }),
            ],
        ),
        (
            Chat::COLLECTION,
            vec![
                unique(doc! { "retreat_id": 1, "user_id": 1 }),
                plain(doc! { "organizer_id": 1, "updated_at": -1 }),
            ],
        ),
        (Wishlist::COLLECTION, vec![unique(doc! { "user_id": 1 })]),
        (Category::COLLECTION, vec![unique(doc! { "name": 1 })]),
        (Blog::COLLECTION, vec![plain(doc! { "created_at": -1 })]),
    ]
}

pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let plan = index_plan();
    let collections = plan.len();

    for (collection, models) in plan {
        let count = models.len();
        db.collection::<Document>(collection)
            .create_indexes(models)
            .await?;
        debug!(collection, count, "Indexes ensured");
    }

    info!(collections, "Indexes ready");
    Ok(())
}

fn plain(keys: Document) -> IndexModel {
    IndexModel::builder().keys(keys).build()
}

fn unique(keys: Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}
