use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use retreats_db::models::Blog;

use super::base::{BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams};

pub struct BlogDao {
    pub base: BaseDao<Blog>,
}

impl BlogDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Blog::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        author_id: ObjectId,
        title: String,
        content: String,
        image: Option<String>,
    ) -> DaoResult<Blog> {
        if title.trim().is_empty() || content.trim().is_empty() {
            return Err(DaoError::Validation(
                "Blog title and content are required".to_string(),
            ));
        }

        let now = DateTime::now();
        let blog = Blog {
            id: None,
            title,
            content,
            author_id,
            image,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&blog).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list(&self, params: &PaginationParams) -> DaoResult<PaginatedResult<Blog>> {
        self.base.find_paginated(doc! {}, None, params).await
    }
}
