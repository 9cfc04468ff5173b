use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use retreats_db::models::{Organization, Role, User, UserNotification};
use tracing::info;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub organization: Option<Organization>,
}

#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub city: Option<String>,
    pub country_code: Option<String>,
    pub profile_image: Option<String>,
    pub organization: Option<Organization>,
}

pub struct UserDao {
    pub base: BaseDao<User>,
}

impl UserDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, User::COLLECTION),
        }
    }

    pub async fn create(&self, new_user: NewUser) -> DaoResult<User> {
        if new_user.role == Role::Organiser && new_user.organization.is_none() {
            return Err(DaoError::Validation(
                "Organisers must provide an organization".to_string(),
            ));
        }
        if new_user.role != Role::Organiser && new_user.organization.is_some() {
            return Err(DaoError::Validation(
                "Only organisers can have an organization".to_string(),
            ));
        }

        let now = DateTime::now();
        let user = User {
            id: None,
            name: new_user.name,
            email: new_user.email.to_lowercase(),
            password_hash: Some(new_user.password_hash),
            role: new_user.role,
            mobile: new_user.mobile,
            city: new_user.city,
            country_code: new_user.country_code,
            profile_image: None,
            organization: new_user.organization,
            notifications: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&user).await?;
        self.base.find_by_id(id).await
    }

    pub async fn find_by_email(&self, email: &str) -> DaoResult<User> {
        self.base
            .find_one(doc! { "email": email.to_lowercase() })
            .await?
            .ok_or_else(|| DaoError::not_found("User"))
    }

    /// Organiser lookup used by organiser-scoped reports.
    pub async fn find_organiser(&self, user_id: ObjectId) -> DaoResult<User> {
        self.base
            .find_one(doc! { "_id": user_id, "role": Role::Organiser.as_str() })
            .await?
            .ok_or_else(|| DaoError::not_found("Organiser"))
    }

    pub async fn update_profile(&self, user_id: ObjectId, update: ProfileUpdate) -> DaoResult<User> {
        let mut set = bson::Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(mobile) = update.mobile {
            set.insert("mobile", mobile);
        }
        if let Some(city) = update.city {
            set.insert("city", city);
        }
        if let Some(code) = update.country_code {
            set.insert("country_code", code);
        }
        if let Some(image) = update.profile_image {
            set.insert("profile_image", image);
        }
        if let Some(org) = update.organization {
            let user = self.base.find_by_id(user_id).await?;
            if user.role != Role::Organiser {
                return Err(DaoError::Validation(
                    "Only organisers can have an organization".to_string(),
                ));
            }
            set.insert("organization", bson::to_bson(&org)?);
        }

        if !set.is_empty() {
            set.insert("updated_at", DateTime::now());
            if !self.base.update_by_id(user_id, doc! { "$set": set }).await? {
                return Err(DaoError::not_found("User"));
            }
        }

        self.base.find_by_id(user_id).await
    }

    pub async fn push_notification(
        &self,
        user_id: ObjectId,
        notification: &UserNotification,
    ) -> DaoResult<()> {
        let pushed = self
            .base
            .update_by_id(
                user_id,
                doc! { "$push": { "notifications": bson::to_bson(notification)? } },
            )
            .await?;

        if !pushed {
            return Err(DaoError::not_found("User"));
        }
        Ok(())
    }

    /// Appends the notification to every user, or only to users with `role`.
    pub async fn broadcast(
        &self,
        role: Option<Role>,
        notification: &UserNotification,
    ) -> DaoResult<u64> {
        let filter = match role {
            Some(role) => doc! { "role": role.as_str() },
            None => doc! {},
        };

        let reached = self
            .base
            .update_many(
                filter,
                doc! { "$push": { "notifications": bson::to_bson(notification)? } },
            )
            .await?;

        info!(reached, role = ?role, title = %notification.title, "Broadcast notification");
        Ok(reached)
    }

    pub async fn mark_notification_read(
        &self,
        user_id: ObjectId,
        notification_id: ObjectId,
    ) -> DaoResult<()> {
        let matched = self
            .base
            .update_one(
                doc! { "_id": user_id, "notifications._id": notification_id },
                doc! { "$set": { "notifications.$.is_read": true } },
            )
            .await?;

        if !matched {
            return Err(DaoError::not_found("Notification"));
        }
        Ok(())
    }

    pub async fn find_by_role(&self, role: Role, limit: i64) -> DaoResult<Vec<User>> {
        self.base
            .find_limited(doc! { "role": role.as_str() }, doc! { "created_at": -1 }, limit)
            .await
    }
}
