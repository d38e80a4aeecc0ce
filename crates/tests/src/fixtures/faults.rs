use async_trait::async_trait;
use futures::StreamExt;
use liveroom_db::models::{
    CurrentMaterial, CurrentPolling, LiveRoom, LiveRoomMemberState, LiveRoomPoll, LiveRoomState,
    MemberStateFilter, MemberStateType, RecordingState, StateValue, WhiteboardZoomState,
};
use liveroom_services::{
    dao::{DaoError, DaoResult},
    events::{BusError, EventBus, EventStream},
    store::{LiveRoomStore, LiveRoomTx, MemoryStore},
};

/// A bus that accepts subscriptions but refuses every publish.
pub struct FailingBus;

#[async_trait]
impl EventBus for FailingBus {
    async fn publish(&self, _subject: &str, _payload: Vec<u8>) -> Result<String, BusError> {
        Err(BusError::Unavailable("bus is down".to_string()))
    }

    async fn subscribe(&self, _subject: &str) -> Result<EventStream, BusError> {
        Ok(futures::stream::pending().boxed())
    }
}

/// A memory store whose transactions fail when resetting member state of
/// one type in bulk, after earlier writes of the same transaction went through.
pub struct FaultyStore {
    inner: MemoryStore,
    fail_on: MemberStateType,
}

impl FaultyStore {
    pub fn failing_bulk_upsert(fail_on: MemberStateType) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_on,
        }
    }
}

#[async_trait]
impl LiveRoomStore for FaultyStore {
    async fn begin(&self) -> DaoResult<Box<dyn LiveRoomTx>> {
        Ok(Box::new(FaultyTx {
            inner: self.inner.begin().await?,
            fail_on: self.fail_on,
        }))
    }

    async fn get_live_room_by_channel_name(&self, channel_name: &str) -> DaoResult<LiveRoom> {
        self.inner.get_live_room_by_channel_name(channel_name).await
    }

    async fn get_live_room_by_channel_id(&self, channel_id: &str) -> DaoResult<LiveRoom> {
        self.inner.get_live_room_by_channel_id(channel_id).await
    }

    async fn create_live_room(&self, room: &LiveRoom) -> DaoResult<()> {
        self.inner.create_live_room(room).await
    }

    async fn update_whiteboard_room_id(
        &self,
        channel_id: &str,
        whiteboard_room_id: &str,
    ) -> DaoResult<()> {
        self.inner
            .update_whiteboard_room_id(channel_id, whiteboard_room_id)
            .await
    }

    async fn get_state(&self, channel_id: &str) -> DaoResult<Option<LiveRoomState>> {
        self.inner.get_state(channel_id).await
    }

    async fn get_member_states(
        &self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>> {
        self.inner.get_member_states(filter).await
    }

    async fn list_polls(&self, channel_id: &str) -> DaoResult<Vec<LiveRoomPoll>> {
        self.inner.list_polls(channel_id).await
    }
}

struct FaultyTx {
    inner: Box<dyn LiveRoomTx>,
    fail_on: MemberStateType,
}

#[async_trait]
impl LiveRoomTx for FaultyTx {
    async fn end_live_room(&mut self, channel_id: &str) -> DaoResult<()> {
        self.inner.end_live_room(channel_id).await
    }

    async fn get_state(&mut self, channel_id: &str) -> DaoResult<Option<LiveRoomState>> {
        self.inner.get_state(channel_id).await
    }

    async fn upsert_current_material(
        &mut self,
        channel_id: &str,
        material: Option<CurrentMaterial>,
    ) -> DaoResult<()> {
        self.inner.upsert_current_material(channel_id, material).await
    }

    async fn upsert_current_polling(
        &mut self,
        channel_id: &str,
        polling: Option<CurrentPolling>,
    ) -> DaoResult<()> {
        self.inner.upsert_current_polling(channel_id, polling).await
    }

    async fn upsert_whiteboard_zoom(
        &mut self,
        channel_id: &str,
        zoom: WhiteboardZoomState,
    ) -> DaoResult<()> {
        self.inner.upsert_whiteboard_zoom(channel_id, zoom).await
    }

    async fn upsert_recording(
        &mut self,
        channel_id: &str,
        recording: Option<RecordingState>,
    ) -> DaoResult<()> {
        self.inner.upsert_recording(channel_id, recording).await
    }

    async fn set_spotlight(&mut self, channel_id: &str, user_id: Option<&str>) -> DaoResult<()> {
        self.inner.set_spotlight(channel_id, user_id).await
    }

    async fn upsert_session_time(&mut self, channel_id: &str) -> DaoResult<()> {
        self.inner.upsert_session_time(channel_id).await
    }

    async fn get_streaming_learners(&mut self, channel_id: &str) -> DaoResult<Vec<String>> {
        self.inner.get_streaming_learners(channel_id).await
    }

    async fn increase_streaming(
        &mut self,
        channel_id: &str,
        learner_id: &str,
        max: u32,
    ) -> DaoResult<()> {
        self.inner
            .increase_streaming(channel_id, learner_id, max)
            .await
    }

    async fn decrease_streaming(&mut self, channel_id: &str, learner_id: &str) -> DaoResult<()> {
        self.inner.decrease_streaming(channel_id, learner_id).await
    }

    async fn get_member_states(
        &mut self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>> {
        self.inner.get_member_states(filter).await
    }

    async fn upsert_member_state(
        &mut self,
        channel_id: &str,
        user_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        self.inner
            .upsert_member_state(channel_id, user_id, state_type, value)
            .await
    }

    async fn bulk_upsert_member_states(
        &mut self,
        channel_id: &str,
        user_ids: &[String],
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        if state_type == self.fail_on {
            return Err(DaoError::NoRowsUpdated);
        }
        self.inner
            .bulk_upsert_member_states(channel_id, user_ids, state_type, value)
            .await
    }

    async fn update_all_member_states(
        &mut self,
        channel_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        self.inner
            .update_all_member_states(channel_id, state_type, value)
            .await
    }

    async fn create_poll(&mut self, poll: LiveRoomPoll) -> DaoResult<()> {
        self.inner.create_poll(poll).await
    }

    async fn commit(self: Box<Self>) -> DaoResult<()> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> DaoResult<()> {
        self.inner.rollback().await
    }
}
