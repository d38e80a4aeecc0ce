use bson::{DateTime, doc};
use mongodb::Database;
use liveroom_db::models::{LiveRoomLog, LogCounter};

use super::base::{BaseDao, DaoError, DaoResult};

/// Activity log of the currently open session of each channel.
pub struct LiveRoomLogDao {
    pub base: BaseDao<LiveRoomLog>,
}

impl LiveRoomLogDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, LiveRoomLog::COLLECTION),
        }
    }

    pub async fn increase_counter(&self, channel_id: &str, counter: LogCounter) -> DaoResult<()> {
        let mut inc = bson::Document::new();
        inc.insert(counter.field(), 1_i64);
        self.upsert_open(
            channel_id,
            doc! {
                "$inc": inc,
                "$setOnInsert": { "created_at": DateTime::now() },
            },
        )
        .await
    }

    pub async fn add_attendee(&self, channel_id: &str, user_id: &str) -> DaoResult<()> {
        self.upsert_open(
            channel_id,
            doc! {
                "$addToSet": { "attendee_ids": user_id },
                "$setOnInsert": { "created_at": DateTime::now() },
            },
        )
        .await
    }

    /// Applies `update` to the open log, creating it if needed. Losing the
    /// insert race to another writer surfaces as a duplicate key on the open
    /// log index; the retry then matches the winner's document.
    async fn upsert_open(&self, channel_id: &str, update: bson::Document) -> DaoResult<()> {
        let filter = doc! { "channel_id": channel_id, "is_completed": false };
        match self.base.upsert_one(filter.clone(), update.clone()).await {
            Err(DaoError::DuplicateKey(_)) => self.base.upsert_one(filter, update).await,
            result => result,
        }
    }

    pub async fn complete(&self, channel_id: &str) -> DaoResult<()> {
        self.base
            .update_one(
                doc! { "channel_id": channel_id, "is_completed": false },
                doc! { "$set": { "is_completed": true } },
            )
            .await?;
        Ok(())
    }
}
