use bson::{DateTime, doc};
use mongodb::{ClientSession, Database};
use liveroom_db::models::LiveRoom;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct LiveRoomDao {
    pub base: BaseDao<LiveRoom>,
}

impl LiveRoomDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, LiveRoom::COLLECTION),
        }
    }

    pub async fn find_by_channel_name(&self, channel_name: &str) -> DaoResult<LiveRoom> {
        self.base
            .find_one(doc! { "channel_name": channel_name })
            .await?
            .ok_or(DaoError::NotFound)
    }

    pub async fn find_by_channel_id(&self, channel_id: &str) -> DaoResult<LiveRoom> {
        self.base.find_by_id(channel_id).await
    }

    /// Fails with `DuplicateKey` when another caller created the same channel name first.
    pub async fn create(&self, room: &LiveRoom) -> DaoResult<()> {
        self.base.insert_one(room).await
    }

    /// Fills in the whiteboard room of a room that has none yet.
    pub async fn set_whiteboard_room_id(
        &self,
        channel_id: &str,
        whiteboard_room_id: &str,
    ) -> DaoResult<()> {
        let matched = self
            .base
            .update_one(
                doc! {
                    "_id": channel_id,
                    "whiteboard_room_id": { "$in": ["", null] },
                },
                doc! { "$set": {
                    "whiteboard_room_id": whiteboard_room_id,
                    "updated_at": DateTime::now(),
                } },
            )
            .await?;
        if !matched {
            return Err(DaoError::NoRowsUpdated);
        }
        Ok(())
    }

    pub async fn end_in(&self, session: &mut ClientSession, channel_id: &str) -> DaoResult<()> {
        let result = self
            .base
            .update_one_in(
                session,
                doc! { "_id": channel_id },
                doc! { "$set": { "ended_at": DateTime::now() } },
                false,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(DaoError::NotFound);
        }
        Ok(())
    }
}
