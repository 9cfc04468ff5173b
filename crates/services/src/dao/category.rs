use bson::{doc, DateTime};
use mongodb::Database;
use retreats_db::models::Category;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct CategoryDao {
    pub base: BaseDao<Category>,
}

impl CategoryDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Category::COLLECTION),
        }
    }

    pub async fn create(&self, name: String, description: Option<String>) -> DaoResult<Category> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(DaoError::Validation("Category name is required".to_string()));
        }

        let category = Category {
            id: None,
            name,
            description,
            created_at: DateTime::now(),
        };

        let id = self.base.insert_one(&category).await?;
        self.base.find_by_id(id).await
    }

    pub async fn list(&self) -> DaoResult<Vec<Category>> {
        self.base.find_many(doc! {}, Some(doc! { "name": 1 })).await
    }
}
