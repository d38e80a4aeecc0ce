use bson::doc;
use mongodb::{ClientSession, Database};
use liveroom_db::models::LiveRoomPoll;

use super::base::{BaseDao, DaoResult};

pub struct LiveRoomPollDao {
    pub base: BaseDao<LiveRoomPoll>,
}

impl LiveRoomPollDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, LiveRoomPoll::COLLECTION),
        }
    }

    pub async fn create_in(&self, session: &mut ClientSession, poll: &LiveRoomPoll) -> DaoResult<()> {
        self.base.insert_one_in(session, poll).await
    }

    /// Most recently ended first.
    pub async fn list_by_channel(&self, channel_id: &str) -> DaoResult<Vec<LiveRoomPoll>> {
        self.base
            .find_many(doc! { "channel_id": channel_id }, Some(doc! { "ended_at": -1 }))
            .await
    }
}
