use std::sync::Arc;

use async_trait::async_trait;
use bson::{Bson, DateTime};
use mongodb::{Client, ClientSession, Database};
use liveroom_db::models::{
    CurrentMaterial, CurrentPolling, LiveRoom, LiveRoomMemberState, LiveRoomPoll, LiveRoomState,
    MemberStateFilter, MemberStateType, RecordingState, StateValue, WhiteboardZoomState,
};
use tracing::debug;

use super::{LiveRoomStore, LiveRoomTx};
use crate::dao::{
    DaoResult, live_room::LiveRoomDao, live_room_poll::LiveRoomPollDao,
    live_room_state::LiveRoomStateDao, member_state::MemberStateDao,
};

struct Daos {
    rooms: LiveRoomDao,
    states: LiveRoomStateDao,
    members: MemberStateDao,
    polls: LiveRoomPollDao,
}

/// MongoDB-backed store. Transactions need a replica set deployment.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    daos: Arc<Daos>,
}

impl MongoStore {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            daos: Arc::new(Daos {
                rooms: LiveRoomDao::new(db),
                states: LiveRoomStateDao::new(db),
                members: MemberStateDao::new(db),
                polls: LiveRoomPollDao::new(db),
            }),
        }
    }
}

#[async_trait]
impl LiveRoomStore for MongoStore {
    async fn begin(&self) -> DaoResult<Box<dyn LiveRoomTx>> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;
        Ok(Box::new(MongoTx {
            session,
            daos: self.daos.clone(),
        }))
    }

    async fn get_live_room_by_channel_name(&self, channel_name: &str) -> DaoResult<LiveRoom> {
        self.daos.rooms.find_by_channel_name(channel_name).await
    }

    async fn get_live_room_by_channel_id(&self, channel_id: &str) -> DaoResult<LiveRoom> {
        self.daos.rooms.find_by_channel_id(channel_id).await
    }

    async fn create_live_room(&self, room: &LiveRoom) -> DaoResult<()> {
        self.daos.rooms.create(room).await
    }

    async fn update_whiteboard_room_id(
        &self,
        channel_id: &str,
        whiteboard_room_id: &str,
    ) -> DaoResult<()> {
        self.daos
            .rooms
            .set_whiteboard_room_id(channel_id, whiteboard_room_id)
            .await
    }

    async fn get_state(&self, channel_id: &str) -> DaoResult<Option<LiveRoomState>> {
        self.daos.states.find(channel_id).await
    }

    async fn get_member_states(
        &self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>> {
        self.daos.members.find(filter).await
    }

    async fn list_polls(&self, channel_id: &str) -> DaoResult<Vec<LiveRoomPoll>> {
        self.daos.polls.list_by_channel(channel_id).await
    }
}

/// One multi-document transaction. Dropping it without commit aborts it.
pub struct MongoTx {
    session: ClientSession,
    daos: Arc<Daos>,
}

impl MongoTx {
    async fn set_state_field(&mut self, channel_id: &str, field: &str, value: Bson) -> DaoResult<()> {
        self.daos
            .states
            .set_field_in(&mut self.session, channel_id, field, value)
            .await
    }
}

#[async_trait]
impl LiveRoomTx for MongoTx {
    async fn end_live_room(&mut self, channel_id: &str) -> DaoResult<()> {
        self.daos.rooms.end_in(&mut self.session, channel_id).await
    }

    async fn get_state(&mut self, channel_id: &str) -> DaoResult<Option<LiveRoomState>> {
        self.daos.states.find_in(&mut self.session, channel_id).await
    }

    async fn upsert_current_material(
        &mut self,
        channel_id: &str,
        material: Option<CurrentMaterial>,
    ) -> DaoResult<()> {
        let value = bson::to_bson(&material)?;
        self.set_state_field(channel_id, "current_material", value).await
    }

    async fn upsert_current_polling(
        &mut self,
        channel_id: &str,
        polling: Option<CurrentPolling>,
    ) -> DaoResult<()> {
        let value = bson::to_bson(&polling)?;
        self.set_state_field(channel_id, "current_polling", value).await
    }

    async fn upsert_whiteboard_zoom(
        &mut self,
        channel_id: &str,
        zoom: WhiteboardZoomState,
    ) -> DaoResult<()> {
        let value = bson::to_bson(&zoom)?;
        self.set_state_field(channel_id, "whiteboard_zoom_state", value).await
    }

    async fn upsert_recording(
        &mut self,
        channel_id: &str,
        recording: Option<RecordingState>,
    ) -> DaoResult<()> {
        let value = bson::to_bson(&recording)?;
        self.set_state_field(channel_id, "recording", value).await
    }

    async fn set_spotlight(&mut self, channel_id: &str, user_id: Option<&str>) -> DaoResult<()> {
        let value = user_id.map_or(Bson::Null, Bson::from);
        self.set_state_field(channel_id, "spotlighted_user", value).await
    }

    async fn upsert_session_time(&mut self, channel_id: &str) -> DaoResult<()> {
        self.set_state_field(channel_id, "session_time", Bson::DateTime(DateTime::now()))
            .await
    }

    async fn get_streaming_learners(&mut self, channel_id: &str) -> DaoResult<Vec<String>> {
        Ok(self
            .get_state(channel_id)
            .await?
            .map(|state| state.streaming_learners)
            .unwrap_or_default())
    }

    async fn increase_streaming(
        &mut self,
        channel_id: &str,
        learner_id: &str,
        max: u32,
    ) -> DaoResult<()> {
        self.daos
            .states
            .add_streaming_learner_in(&mut self.session, channel_id, learner_id, max)
            .await
    }

    async fn decrease_streaming(&mut self, channel_id: &str, learner_id: &str) -> DaoResult<()> {
        self.daos
            .states
            .remove_streaming_learner_in(&mut self.session, channel_id, learner_id)
            .await
    }

    async fn get_member_states(
        &mut self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>> {
        self.daos.members.find_in(&mut self.session, filter).await
    }

    async fn upsert_member_state(
        &mut self,
        channel_id: &str,
        user_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        self.daos
            .members
            .upsert_in(&mut self.session, channel_id, user_id, state_type, &value)
            .await
    }

    async fn bulk_upsert_member_states(
        &mut self,
        channel_id: &str,
        user_ids: &[String],
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        for user_id in user_ids {
            self.daos
                .members
                .upsert_in(&mut self.session, channel_id, user_id, state_type, &value)
                .await?;
        }
        Ok(())
    }

    async fn update_all_member_states(
        &mut self,
        channel_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        let modified = self
            .daos
            .members
            .update_all_in(&mut self.session, channel_id, state_type, &value)
            .await?;
        debug!(channel_id, %state_type, modified, "Member states overwritten");
        Ok(())
    }

    async fn create_poll(&mut self, poll: LiveRoomPoll) -> DaoResult<()> {
        self.daos.polls.create_in(&mut self.session, &poll).await
    }

    async fn commit(mut self: Box<Self>) -> DaoResult<()> {
        self.session.commit_transaction().await?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> DaoResult<()> {
        self.session.abort_transaction().await?;
        Ok(())
    }
}
