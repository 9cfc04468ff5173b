use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use retreats_db::models::{DateWindow, FoodOption, Location, Retreat, Role, Room, Teacher};
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams};

pub struct NewRetreat {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub location: Location,
    pub dates: DateWindow,
    pub rooms: Vec<Room>,
    pub teachers: Vec<Teacher>,
    pub food: Vec<FoodOption>,
    pub category_id: Option<ObjectId>,
    pub images: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RetreatUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub location: Option<Location>,
    pub dates: Option<DateWindow>,
    pub rooms: Option<Vec<Room>>,
    pub teachers: Option<Vec<Teacher>>,
    pub food: Option<Vec<FoodOption>>,
    pub category_id: Option<ObjectId>,
    pub images: Option<Vec<String>>,
}

pub struct RetreatDao {
    pub base: BaseDao<Retreat>,
}

impl RetreatDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Retreat::COLLECTION),
        }
    }

    /// Organisers own what they create and wait for approval; admin-created
    /// retreats have no owner and are approved immediately.
    pub async fn create(
        &self,
        creator_id: ObjectId,
        creator_role: Role,
        new_retreat: NewRetreat,
    ) -> DaoResult<Retreat> {
        let is_admin = match creator_role {
            Role::Admin => true,
            Role::Organiser => false,
            Role::User => {
                return Err(DaoError::Forbidden(
                    "Only organisers and admins can create retreats".to_string(),
                ));
            }
        };

        validate_window(&new_retreat.dates)?;
        if new_retreat.price < 0.0 {
            return Err(DaoError::Validation("Price cannot be negative".to_string()));
        }
        self.ensure_title_free(&new_retreat.title, None).await?;

        let now = DateTime::now();
        let retreat = Retreat {
            id: None,
            title: new_retreat.title,
            description: new_retreat.description,
            price: new_retreat.price,
            organizer_id: (!is_admin).then_some(creator_id),
            location: new_retreat.location,
            dates: new_retreat.dates,
            rooms: new_retreat.rooms,
            teachers: new_retreat.teachers,
            food: new_retreat.food,
            category_id: new_retreat.category_id,
            images: new_retreat.images,
            is_approved: is_admin,
            is_created_by_admin: is_admin,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&retreat).await?;
        info!(%id, title = %retreat.title, by_admin = is_admin, "Retreat created");
        self.base.find_by_id(id).await
    }

    async fn ensure_title_free(&self, title: &str, except: Option<ObjectId>) -> DaoResult<()> {
        let mut filter = doc! { "title": title };
        if let Some(id) = except {
            filter.insert("_id", doc! { "$ne": id });
        }
        if self.base.find_one(filter).await?.is_some() {
            return Err(DaoError::DuplicateKey(format!(
                "A retreat titled '{title}' already exists"
            )));
        }
        Ok(())
    }

    pub async fn find_approved(
        &self,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Retreat>> {
        self.base
            .find_paginated(doc! { "is_approved": true }, None, params)
            .await
    }

    pub async fn find_all(&self, params: &PaginationParams) -> DaoResult<PaginatedResult<Retreat>> {
        self.base.find_paginated(doc! {}, None, params).await
    }

    pub async fn find_by_organizer(&self, organizer_id: ObjectId) -> DaoResult<Vec<Retreat>> {
        self.base
            .find_many(
                doc! { "organizer_id": organizer_id },
                Some(doc! { "created_at": -1 }),
            )
            .await
    }

    pub async fn find_by_organizers(&self, organizer_ids: &[ObjectId]) -> DaoResult<Vec<Retreat>> {
        if organizer_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(doc! { "organizer_id": { "$in": organizer_ids.to_vec() } }, None)
            .await
    }

    pub async fn approve(&self, retreat_id: ObjectId) -> DaoResult<Retreat> {
        let matched = self
            .base
            .update_by_id(
                retreat_id,
                doc! { "$set": { "is_approved": true, "updated_at": DateTime::now() } },
            )
            .await?;
        if !matched {
            return Err(DaoError::not_found("Retreat"));
        }
        info!(%retreat_id, "Retreat approved");
        self.base.find_by_id(retreat_id).await
    }

    pub async fn update(&self, retreat_id: ObjectId, update: RetreatUpdate) -> DaoResult<Retreat> {
        let mut set = bson::Document::new();
        if let Some(title) = update.title {
            self.ensure_title_free(&title, Some(retreat_id)).await?;
            set.insert("title", title);
        }
        if let Some(description) = update.description {
            set.insert("description", description);
        }
        if let Some(price) = update.price {
            if price < 0.0 {
                return Err(DaoError::Validation("Price cannot be negative".to_string()));
            }
            set.insert("price", price);
        }
        if let Some(location) = update.location {
            set.insert("location", bson::to_bson(&location)?);
        }
        if let Some(dates) = update.dates {
            validate_window(&dates)?;
            set.insert("dates", bson::to_bson(&dates)?);
        }
        if let Some(rooms) = update.rooms {
            set.insert("rooms", bson::to_bson(&rooms)?);
        }
        if let Some(teachers) = update.teachers {
            set.insert("teachers", bson::to_bson(&teachers)?);
        }
        if let Some(food) = update.food {
            set.insert("food", bson::to_bson(&food)?);
        }
        if let Some(category_id) = update.category_id {
            set.insert("category_id", category_id);
        }
        if let Some(images) = update.images {
            set.insert("images", images);
        }

        if !set.is_empty() {
            set.insert("updated_at", DateTime::now());
            if !self.base.update_by_id(retreat_id, doc! { "$set": set }).await? {
                return Err(DaoError::not_found("Retreat"));
            }
        }

        self.base.find_by_id(retreat_id).await
    }

    pub async fn delete(&self, retreat_id: ObjectId) -> DaoResult<()> {
        let deleted = self.base.hard_delete(doc! { "_id": retreat_id }).await?;
        if deleted == 0 {
            return Err(DaoError::not_found("Retreat"));
        }
        info!(%retreat_id, "Retreat deleted");
        Ok(())
    }
}

/// Whether `user_id` with `role` may edit this retreat.
pub fn can_manage(retreat: &Retreat, user_id: ObjectId, role: Role) -> bool {
    role == Role::Admin || retreat.organizer_id == Some(user_id)
}

fn validate_window(dates: &DateWindow) -> DaoResult<()> {
    if dates.end < dates.start {
        return Err(DaoError::Validation(
            "Retreat end date must not precede its start date".to_string(),
        ));
    }
    Ok(())
}
