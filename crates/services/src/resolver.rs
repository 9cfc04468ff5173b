//! Maps a wishlist item's service type to the collection that holds its referent.

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use retreats_db::models::{Blog, Retreat, ServiceType};

use crate::dao::base::{BaseDao, DaoResult};

#[derive(Debug, Clone)]
pub enum WishlistEntity {
    Retreat(Retreat),
    Blog(Blog),
}

/// Looks up the entity a wishlist item points at.
#[async_trait]
pub trait ServiceResolver: Send + Sync {
    fn service_type(&self) -> ServiceType;

    /// `Ok(None)` when the referent no longer exists.
    async fn resolve(&self, id: ObjectId) -> DaoResult<Option<WishlistEntity>>;
}

pub struct RetreatResolver {
    retreats: BaseDao<Retreat>,
}

#[async_trait]
impl ServiceResolver for RetreatResolver {
    fn service_type(&self) -> ServiceType {
        ServiceType::Retreat
    }

    async fn resolve(&self, id: ObjectId) -> DaoResult<Option<WishlistEntity>> {
        Ok(self
            .retreats
            .find_one(doc! { "_id": id })
            .await?
            .map(WishlistEntity::Retreat))
    }
}

pub struct BlogResolver {
    blogs: BaseDao<Blog>,
}

#[async_trait]
impl ServiceResolver for BlogResolver {
    fn service_type(&self) -> ServiceType {
        ServiceType::Blog
    }

    async fn resolve(&self, id: ObjectId) -> DaoResult<Option<WishlistEntity>> {
        Ok(self
            .blogs
            .find_one(doc! { "_id": id })
            .await?
            .map(WishlistEntity::Blog))
    }
}

pub struct ResolverTable {
    resolvers: HashMap<ServiceType, Box<dyn ServiceResolver>>,
}

impl ResolverTable {
    pub fn new(db: &Database) -> Self {
        let entries: Vec<Box<dyn ServiceResolver>> = vec![
            Box::new(RetreatResolver {
                retreats: BaseDao::new(db, Retreat::COLLECTION),
            }),
            Box::new(BlogResolver {
                blogs: BaseDao::new(db, Blog::COLLECTION),
            }),
        ];

        Self {
            resolvers: entries
                .into_iter()
                .map(|r| (r.service_type(), r))
                .collect(),
        }
    }

    pub async fn resolve(
        &self,
        service_type: ServiceType,
        id: ObjectId,
    ) -> DaoResult<Option<WishlistEntity>> {
        match self.resolvers.get(&service_type) {
            Some(resolver) => resolver.resolve(id).await,
            None => Ok(None),
        }
    }
}
