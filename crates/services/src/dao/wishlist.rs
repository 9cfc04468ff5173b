use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use retreats_db::models::{ServiceType, Wishlist, WishlistItem};
use tracing::{debug, info};

use super::base::{BaseDao, DaoError, DaoResult};
use crate::aggregate::{WishlistGroup, group_by_service_type};
use crate::resolver::{ResolverTable, WishlistEntity};

pub struct WishlistDao {
    pub base: BaseDao<Wishlist>,
    resolvers: ResolverTable,
}

impl WishlistDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Wishlist::COLLECTION),
            resolvers: ResolverTable::new(db),
        }
    }

    async fn find_for_user(&self, user_id: ObjectId) -> DaoResult<Option<Wishlist>> {
        self.base.find_one(doc! { "user_id": user_id }).await
    }

    async fn require_for_user(&self, user_id: ObjectId) -> DaoResult<Wishlist> {
        self.find_for_user(user_id)
            .await?
            .ok_or_else(|| DaoError::not_found("Wishlist"))
    }

    pub async fn add_item(
        &self,
        user_id: ObjectId,
        service_type: ServiceType,
        service_id: ObjectId,
    ) -> DaoResult<Wishlist> {
        if self.resolvers.resolve(service_type, service_id).await?.is_none() {
            return Err(DaoError::not_found(service_type.as_str()));
        }

        let now = DateTime::now();
        let item = WishlistItem {
            service_type,
            service_id,
            added_at: now,
        };

        // Matches only when the pair is not saved yet.
        let pushed = self
            .base
            .update_one(
                doc! {
                    "user_id": user_id,
                    "items": { "$not": { "$elemMatch": {
                        "service_type": service_type.as_str(),
                        "service_id": service_id,
                    } } },
                },
                doc! {
                    "$push": { "items": bson::to_bson(&item)? },
                    "$set": { "updated_at": now },
                },
            )
            .await?;

        if !pushed {
            if self.find_for_user(user_id).await?.is_some() {
                return Err(DaoError::DuplicateKey(
                    "Item is already in the wishlist".to_string(),
                ));
            }
            let wishlist = Wishlist {
                id: None,
                user_id,
                items: vec![item],
                created_at: now,
                updated_at: now,
            };
            self.base.insert_one(&wishlist).await?;
        }

        info!(%user_id, %service_type, %service_id, "Wishlist item added");
        self.require_for_user(user_id).await
    }

    pub async fn remove_item(
        &self,
        user_id: ObjectId,
        service_type: ServiceType,
        service_id: ObjectId,
    ) -> DaoResult<Wishlist> {
        let wishlist = self.require_for_user(user_id).await?;
        if !wishlist.contains(service_type, service_id) {
            return Err(DaoError::NotFound(
                "Item is not in the wishlist".to_string(),
            ));
        }

        self.base
            .update_one(
                doc! { "user_id": user_id },
                doc! {
                    "$pull": { "items": {
                        "service_type": service_type.as_str(),
                        "service_id": service_id,
                    } },
                    "$set": { "updated_at": DateTime::now() },
                },
            )
            .await?;

        self.require_for_user(user_id).await
    }

    /// Raw items; a user who never saved anything has an empty list.
    pub async fn list_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<WishlistItem>> {
        Ok(self
            .find_for_user(user_id)
            .await?
            .map(|w| w.items)
            .unwrap_or_default())
    }

    /// Resolves the items of one type. Referents that no longer exist are skipped.
    pub async fn list_for_user_by_service_type(
        &self,
        user_id: ObjectId,
        service_type: ServiceType,
    ) -> DaoResult<Vec<WishlistGroup<WishlistEntity>>> {
        let items = self.list_for_user(user_id).await?;

        let mut resolved = Vec::new();
        for item in items.iter().filter(|i| i.service_type == service_type) {
            match self.resolvers.resolve(item.service_type, item.service_id).await? {
                Some(entity) => resolved.push((item.service_type, entity)),
                None => {
                    debug!(
                        %user_id,
                        service_type = %item.service_type,
                        service_id = %item.service_id,
                        "Skipping wishlist item with missing referent"
                    );
                }
            }
        }

        Ok(group_by_service_type(resolved))
    }

    pub async fn clear(&self, user_id: ObjectId) -> DaoResult<()> {
        let matched = self
            .base
            .update_one(
                doc! { "user_id": user_id },
                doc! { "$set": { "items": [], "updated_at": DateTime::now() } },
            )
            .await?;
        if !matched {
            return Err(DaoError::not_found("Wishlist"));
        }
        Ok(())
    }
}
