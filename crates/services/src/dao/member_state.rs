use bson::{DateTime, Document, doc};
use mongodb::{ClientSession, Database};
use liveroom_db::models::{LiveRoomMemberState, MemberStateFilter, MemberStateType, StateValue};

use super::base::{BaseDao, DaoResult};

pub struct MemberStateDao {
    pub base: BaseDao<LiveRoomMemberState>,
}

impl MemberStateDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, LiveRoomMemberState::COLLECTION),
        }
    }

    pub async fn find(&self, filter: &MemberStateFilter) -> DaoResult<Vec<LiveRoomMemberState>> {
        self.base
            .find_many(to_document(filter), Some(doc! { "user_id": 1, "state_type": 1 }))
            .await
    }

    pub async fn find_in(
        &self,
        session: &mut ClientSession,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>> {
        self.base.find_many_in(session, to_document(filter)).await
    }

    pub async fn upsert_in(
        &self,
        session: &mut ClientSession,
        channel_id: &str,
        user_id: &str,
        state_type: MemberStateType,
        value: &StateValue,
    ) -> DaoResult<()> {
        self.base
            .update_one_in(
                session,
                doc! {
                    "channel_id": channel_id,
                    "user_id": user_id,
                    "state_type": state_type.as_str(),
                },
                doc! {
                    "$set": value_document(value),
                    "$setOnInsert": { "created_at": DateTime::now() },
                },
                true,
            )
            .await?;
        Ok(())
    }

    /// Overwrites the value of every row of `state_type` in the channel.
    pub async fn update_all_in(
        &self,
        session: &mut ClientSession,
        channel_id: &str,
        state_type: MemberStateType,
        value: &StateValue,
    ) -> DaoResult<u64> {
        self.base
            .update_many_in(
                session,
                doc! { "channel_id": channel_id, "state_type": state_type.as_str() },
                doc! { "$set": value_document(value) },
            )
            .await
    }
}

fn value_document(value: &StateValue) -> Document {
    doc! {
        "bool_value": value.bool_value,
        "string_array_value": value.string_array_value.clone(),
    }
}

fn to_document(filter: &MemberStateFilter) -> Document {
    let mut query = doc! { "channel_id": filter.channel_id.as_str() };
    if let Some(user_id) = &filter.user_id {
        query.insert("user_id", user_id.as_str());
    }
    if let Some(state_type) = filter.state_type {
        query.insert("state_type", state_type.as_str());
    }
    query
}
