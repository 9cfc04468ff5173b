use bson::{doc, oid::ObjectId, DateTime};
use mongodb::Database;
use retreats_db::models::{Chat, ChatMessage, ChatParty, Retreat};

use super::base::{BaseDao, DaoError, DaoResult};

pub struct ChatDao {
    pub base: BaseDao<Chat>,
}

impl ChatDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Chat::COLLECTION),
        }
    }

    /// Appends to the (retreat, guest) conversation, starting it if needed.
    pub async fn send(
        &self,
        retreat: &Retreat,
        user_id: ObjectId,
        sent_by: ChatParty,
        text: &str,
    ) -> DaoResult<Chat> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DaoError::Validation("Message cannot be empty".to_string()));
        }
        let retreat_id = retreat
            .id
            .ok_or_else(|| DaoError::Internal("Retreat without id".to_string()))?;

        let now = DateTime::now();
        let message = ChatMessage {
            id: ObjectId::new(),
            sent_by,
            text: text.to_string(),
            timestamp: now,
        };

        let filter = doc! { "retreat_id": retreat_id, "user_id": user_id };
        let appended = self
            .base
            .update_one(
                filter.clone(),
                doc! {
                    "$push": { "messages": bson::to_bson(&message)? },
                    "$set": { "updated_at": now },
                },
            )
            .await?;

        if !appended {
            let chat = Chat {
                id: None,
                retreat_id,
                user_id,
                organizer_id: retreat.organizer_id,
                messages: vec![message],
                created_at: now,
                updated_at: now,
            };
            self.base.insert_one(&chat).await?;
        }

        self.base
            .find_one(filter)
            .await?
            .ok_or_else(|| DaoError::not_found("Chat"))
    }

    pub async fn find_for_user(&self, user_id: ObjectId) -> DaoResult<Vec<Chat>> {
        self.base
            .find_many(doc! { "user_id": user_id }, Some(doc! { "updated_at": -1 }))
            .await
    }

    pub async fn find_for_organizer(&self, organizer_id: ObjectId) -> DaoResult<Vec<Chat>> {
        self.base
            .find_many(
                doc! { "organizer_id": organizer_id },
                Some(doc! { "updated_at": -1 }),
            )
            .await
    }

    pub async fn find_for_retreat(&self, retreat_id: ObjectId) -> DaoResult<Vec<Chat>> {
        self.base
            .find_many(
                doc! { "retreat_id": retreat_id },
                Some(doc! { "updated_at": -1 }),
            )
            .await
    }
}
