//! Transactional access to rooms, room state and member state.
//!
//! Every command runs against one [`LiveRoomTx`]: reads inside it see the
//! transaction's own writes, and nothing becomes visible to other callers
//! until [`LiveRoomTx::commit`].

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use liveroom_db::models::{
    CurrentMaterial, CurrentPolling, LiveRoom, LiveRoomMemberState, LiveRoomPoll, LiveRoomState,
    MemberStateFilter, MemberStateType, RecordingState, StateValue, WhiteboardZoomState,
};

use crate::dao::DaoResult;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait LiveRoomStore: Send + Sync {
    async fn begin(&self) -> DaoResult<Box<dyn LiveRoomTx>>;

    async fn get_live_room_by_channel_name(&self, channel_name: &str) -> DaoResult<LiveRoom>;
    async fn get_live_room_by_channel_id(&self, channel_id: &str) -> DaoResult<LiveRoom>;
    /// `DuplicateKey` when the channel name is already taken.
    async fn create_live_room(&self, room: &LiveRoom) -> DaoResult<()>;
    /// `NoRowsUpdated` when the room is missing or already has a whiteboard room.
    async fn update_whiteboard_room_id(
        &self,
        channel_id: &str,
        whiteboard_room_id: &str,
    ) -> DaoResult<()>;

    async fn get_state(&self, channel_id: &str) -> DaoResult<Option<LiveRoomState>>;
    async fn get_member_states(
        &self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>>;
    async fn list_polls(&self, channel_id: &str) -> DaoResult<Vec<LiveRoomPoll>>;
}

#[async_trait]
pub trait LiveRoomTx: Send {
    async fn end_live_room(&mut self, channel_id: &str) -> DaoResult<()>;

    async fn get_state(&mut self, channel_id: &str) -> DaoResult<Option<LiveRoomState>>;
    async fn upsert_current_material(
        &mut self,
        channel_id: &str,
        material: Option<CurrentMaterial>,
    ) -> DaoResult<()>;
    async fn upsert_current_polling(
        &mut self,
        channel_id: &str,
        polling: Option<CurrentPolling>,
    ) -> DaoResult<()>;
    async fn upsert_whiteboard_zoom(
        &mut self,
        channel_id: &str,
        zoom: WhiteboardZoomState,
    ) -> DaoResult<()>;
    async fn upsert_recording(
        &mut self,
        channel_id: &str,
        recording: Option<RecordingState>,
    ) -> DaoResult<()>;
    async fn set_spotlight(&mut self, channel_id: &str, user_id: Option<&str>) -> DaoResult<()>;
    async fn upsert_session_time(&mut self, channel_id: &str) -> DaoResult<()>;

    async fn get_streaming_learners(&mut self, channel_id: &str) -> DaoResult<Vec<String>>;
    /// `NoRowsUpdated` when the learner is already streaming or `max` is reached.
    async fn increase_streaming(
        &mut self,
        channel_id: &str,
        learner_id: &str,
        max: u32,
    ) -> DaoResult<()>;
    /// `NoRowsUpdated` when the learner is not streaming.
    async fn decrease_streaming(&mut self, channel_id: &str, learner_id: &str) -> DaoResult<()>;

    async fn get_member_states(
        &mut self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>>;
    async fn upsert_member_state(
        &mut self,
        channel_id: &str,
        user_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()>;
    async fn bulk_upsert_member_states(
        &mut self,
        channel_id: &str,
        user_ids: &[String],
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()>;
    /// Overwrites every existing row of `state_type` in the channel.
    async fn update_all_member_states(
        &mut self,
        channel_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()>;

    async fn create_poll(&mut self, poll: LiveRoomPoll) -> DaoResult<()>;

    async fn commit(self: Box<Self>) -> DaoResult<()>;
    async fn rollback(self: Box<Self>) -> DaoResult<()>;
}
