use bson::{Bson, doc};
use mongodb::{ClientSession, Database};
use liveroom_db::models::LiveRoomState;

use super::base::{BaseDao, DaoError, DaoResult};

pub struct LiveRoomStateDao {
    pub base: BaseDao<LiveRoomState>,
}

impl LiveRoomStateDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, LiveRoomState::COLLECTION),
        }
    }

    pub async fn find(&self, channel_id: &str) -> DaoResult<Option<LiveRoomState>> {
        self.base.find_one(doc! { "_id": channel_id }).await
    }

    pub async fn find_in(
        &self,
        session: &mut ClientSession,
        channel_id: &str,
    ) -> DaoResult<Option<LiveRoomState>> {
        self.base.find_one_in(session, doc! { "_id": channel_id }).await
    }

    /// Writes one top-level field, creating the state row if the channel has none.
    pub async fn set_field_in(
        &self,
        session: &mut ClientSession,
        channel_id: &str,
        field: &str,
        value: Bson,
    ) -> DaoResult<()> {
        let mut set = bson::Document::new();
        set.insert(field, value);
        self.base
            .update_one_in(session, doc! { "_id": channel_id }, doc! { "$set": set }, true)
            .await?;
        Ok(())
    }

    /// Admits `learner_id` to the streaming set unless it is already there or the
    /// set holds `max` entries.
    pub async fn add_streaming_learner_in(
        &self,
        session: &mut ClientSession,
        channel_id: &str,
        learner_id: &str,
        max: u32,
    ) -> DaoResult<()> {
        let max = i64::from(max);
        // The guarded update below never upserts, so make sure the row exists.
        self.base
            .update_one_in(
                session,
                doc! { "_id": channel_id },
                doc! { "$setOnInsert": { "streaming_learners": [] } },
                true,
            )
            .await?;

        let result = self
            .base
            .update_one_in(
                session,
                doc! {
                    "_id": channel_id,
                    "streaming_learners": { "$ne": learner_id },
                    "$expr": {
                        "$lt": [
                            { "$size": { "$ifNull": ["$streaming_learners", []] } },
                            max,
                        ]
                    },
                },
                doc! { "$addToSet": { "streaming_learners": learner_id } },
                false,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(DaoError::NoRowsUpdated);
        }
        Ok(())
    }

    pub async fn remove_streaming_learner_in(
        &self,
        session: &mut ClientSession,
        channel_id: &str,
        learner_id: &str,
    ) -> DaoResult<()> {
        let result = self
            .base
            .update_one_in(
                session,
                doc! { "_id": channel_id, "streaming_learners": learner_id },
                doc! { "$pull": { "streaming_learners": learner_id } },
                false,
            )
            .await?;
        if result.matched_count == 0 {
            return Err(DaoError::NoRowsUpdated);
        }
        Ok(())
    }
}
