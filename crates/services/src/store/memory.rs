use std::collections::{BTreeMap, HashMap, hash_map};
use std::sync::Arc;

use async_trait::async_trait;
use bson::DateTime;
use dashmap::{DashMap, mapref::entry::Entry};
use liveroom_db::models::{
    CurrentMaterial, CurrentPolling, LiveRoom, LiveRoomMemberState, LiveRoomPoll, LiveRoomState,
    MemberStateFilter, MemberStateType, RecordingState, StateValue, WhiteboardZoomState,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{LiveRoomStore, LiveRoomTx};
use crate::dao::{DaoError, DaoResult};

type MemberKey = (String, MemberStateType);
type ChannelSlot = Arc<Mutex<ChannelTables>>;

/// Everything stored for one channel.
#[derive(Debug, Clone, Default)]
struct ChannelTables {
    room: Option<LiveRoom>,
    state: Option<LiveRoomState>,
    members: BTreeMap<MemberKey, LiveRoomMemberState>,
    polls: Vec<LiveRoomPoll>,
}

impl ChannelTables {
    fn state_mut(&mut self, channel_id: &str) -> &mut LiveRoomState {
        let state = self
            .state
            .get_or_insert_with(|| LiveRoomState::empty(channel_id));
        state.updated_at = DateTime::now();
        state
    }

    fn member_states(&self, filter: &MemberStateFilter) -> Vec<LiveRoomMemberState> {
        self.members
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect()
    }

    fn polls_newest_first(&self) -> Vec<LiveRoomPoll> {
        let mut polls = self.polls.clone();
        polls.sort_by(|a, b| b.ended_at.cmp(&a.ended_at));
        polls
    }

    fn upsert_member(
        &mut self,
        channel_id: &str,
        user_id: &str,
        state_type: MemberStateType,
        value: &StateValue,
    ) {
        let key = (user_id.to_string(), state_type);
        match self.members.get_mut(&key) {
            Some(row) => {
                row.bool_value = value.bool_value;
                row.string_array_value = value.string_array_value.clone();
                row.updated_at = DateTime::now();
            }
            None => {
                let row = LiveRoomMemberState::new(channel_id, user_id, state_type, value.clone());
                self.members.insert(key, row);
            }
        }
    }
}

/// In-process store for tests and single-node runs.
///
/// Each channel sits behind its own lock. A transaction locks a channel the
/// first time it touches it, works on a private copy and holds the lock until
/// commit or rollback, so commits are all-or-nothing and transactions on the
/// same channel are serialised while other channels proceed. Store methods
/// must not be called for a channel the same task holds in an open
/// transaction.
#[derive(Clone, Default)]
pub struct MemoryStore {
    channels: Arc<DashMap<String, ChannelSlot>>,
    names: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, channel_id: &str) -> ChannelSlot {
        self.channels
            .entry(channel_id.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn existing_slot(&self, channel_id: &str) -> Option<ChannelSlot> {
        self.channels.get(channel_id).map(|slot| slot.value().clone())
    }
}

#[async_trait]
impl LiveRoomStore for MemoryStore {
    async fn begin(&self) -> DaoResult<Box<dyn LiveRoomTx>> {
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            locked: HashMap::new(),
        }))
    }

    async fn get_live_room_by_channel_name(&self, channel_name: &str) -> DaoResult<LiveRoom> {
        let channel_id = self
            .names
            .get(channel_name)
            .map(|id| id.value().clone())
            .ok_or(DaoError::NotFound)?;
        self.get_live_room_by_channel_id(&channel_id).await
    }

    async fn get_live_room_by_channel_id(&self, channel_id: &str) -> DaoResult<LiveRoom> {
        let slot = self.existing_slot(channel_id).ok_or(DaoError::NotFound)?;
        let room = slot.lock().await.room.clone();
        room.ok_or(DaoError::NotFound)
    }

    async fn create_live_room(&self, room: &LiveRoom) -> DaoResult<()> {
        let duplicate = || {
            DaoError::DuplicateKey(format!("live room {} already exists", room.channel_name))
        };
        let slot = self.slot(&room.channel_id);
        let mut tables = slot.lock().await;
        if tables.room.is_some() {
            return Err(duplicate());
        }
        match self.names.entry(room.channel_name.clone()) {
            Entry::Occupied(_) => return Err(duplicate()),
            Entry::Vacant(entry) => {
                entry.insert(room.channel_id.clone());
            }
        }
        tables.room = Some(room.clone());
        Ok(())
    }

    async fn update_whiteboard_room_id(
        &self,
        channel_id: &str,
        whiteboard_room_id: &str,
    ) -> DaoResult<()> {
        let slot = self.existing_slot(channel_id).ok_or(DaoError::NoRowsUpdated)?;
        let mut tables = slot.lock().await;
        let room = tables
            .room
            .as_mut()
            .filter(|r| r.whiteboard_room_id.is_empty())
            .ok_or(DaoError::NoRowsUpdated)?;
        room.whiteboard_room_id = whiteboard_room_id.to_string();
        room.updated_at = DateTime::now();
        Ok(())
    }

    async fn get_state(&self, channel_id: &str) -> DaoResult<Option<LiveRoomState>> {
        let Some(slot) = self.existing_slot(channel_id) else {
            return Ok(None);
        };
        let state = slot.lock().await.state.clone();
        Ok(state)
    }

    async fn get_member_states(
        &self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>> {
        let Some(slot) = self.existing_slot(&filter.channel_id) else {
            return Ok(Vec::new());
        };
        let rows = slot.lock().await.member_states(filter);
        Ok(rows)
    }

    async fn list_polls(&self, channel_id: &str) -> DaoResult<Vec<LiveRoomPoll>> {
        let Some(slot) = self.existing_slot(channel_id) else {
            return Ok(Vec::new());
        };
        let polls = slot.lock().await.polls_newest_first();
        Ok(polls)
    }
}

struct LockedChannel {
    guard: OwnedMutexGuard<ChannelTables>,
    working: ChannelTables,
}

pub struct MemoryTx {
    store: MemoryStore,
    locked: HashMap<String, LockedChannel>,
}

impl MemoryTx {
    /// The working copy of `channel_id`, locking the channel on first use.
    async fn channel(&mut self, channel_id: &str) -> &mut ChannelTables {
        match self.locked.entry(channel_id.to_string()) {
            hash_map::Entry::Occupied(entry) => &mut entry.into_mut().working,
            hash_map::Entry::Vacant(entry) => {
                let guard = self.store.slot(channel_id).lock_owned().await;
                let working = guard.clone();
                &mut entry.insert(LockedChannel { guard, working }).working
            }
        }
    }
}

#[async_trait]
impl LiveRoomTx for MemoryTx {
    async fn end_live_room(&mut self, channel_id: &str) -> DaoResult<()> {
        let room = self
            .channel(channel_id)
            .await
            .room
            .as_mut()
            .ok_or(DaoError::NotFound)?;
        let now = DateTime::now();
        room.ended_at = Some(now);
        room.updated_at = now;
        Ok(())
    }

    async fn get_state(&mut self, channel_id: &str) -> DaoResult<Option<LiveRoomState>> {
        Ok(self.channel(channel_id).await.state.clone())
    }

    async fn upsert_current_material(
        &mut self,
        channel_id: &str,
        material: Option<CurrentMaterial>,
    ) -> DaoResult<()> {
        self.channel(channel_id).await.state_mut(channel_id).current_material = material;
        Ok(())
    }

    async fn upsert_current_polling(
        &mut self,
        channel_id: &str,
        polling: Option<CurrentPolling>,
    ) -> DaoResult<()> {
        self.channel(channel_id).await.state_mut(channel_id).current_polling = polling;
        Ok(())
    }

    async fn upsert_whiteboard_zoom(
        &mut self,
        channel_id: &str,
        zoom: WhiteboardZoomState,
    ) -> DaoResult<()> {
        self.channel(channel_id)
            .await
            .state_mut(channel_id)
            .whiteboard_zoom_state = zoom;
        Ok(())
    }

    async fn upsert_recording(
        &mut self,
        channel_id: &str,
        recording: Option<RecordingState>,
    ) -> DaoResult<()> {
        self.channel(channel_id).await.state_mut(channel_id).recording = recording;
        Ok(())
    }

    async fn set_spotlight(&mut self, channel_id: &str, user_id: Option<&str>) -> DaoResult<()> {
        self.channel(channel_id).await.state_mut(channel_id).spotlighted_user =
            user_id.map(str::to_string);
        Ok(())
    }

    async fn upsert_session_time(&mut self, channel_id: &str) -> DaoResult<()> {
        self.channel(channel_id).await.state_mut(channel_id).session_time = Some(DateTime::now());
        Ok(())
    }

    async fn get_streaming_learners(&mut self, channel_id: &str) -> DaoResult<Vec<String>> {
        Ok(self
            .channel(channel_id)
            .await
            .state
            .as_ref()
            .map(|s| s.streaming_learners.clone())
            .unwrap_or_default())
    }

    async fn increase_streaming(
        &mut self,
        channel_id: &str,
        learner_id: &str,
        max: u32,
    ) -> DaoResult<()> {
        let state = self.channel(channel_id).await.state_mut(channel_id);
        if state.streaming_learners.iter().any(|l| l == learner_id)
            || state.streaming_learners.len() >= max as usize
        {
            return Err(DaoError::NoRowsUpdated);
        }
        state.streaming_learners.push(learner_id.to_string());
        Ok(())
    }

    async fn decrease_streaming(&mut self, channel_id: &str, learner_id: &str) -> DaoResult<()> {
        let state = self
            .channel(channel_id)
            .await
            .state
            .as_mut()
            .ok_or(DaoError::NoRowsUpdated)?;
        let before = state.streaming_learners.len();
        state.streaming_learners.retain(|l| l != learner_id);
        if state.streaming_learners.len() == before {
            return Err(DaoError::NoRowsUpdated);
        }
        state.updated_at = DateTime::now();
        Ok(())
    }

    async fn get_member_states(
        &mut self,
        filter: &MemberStateFilter,
    ) -> DaoResult<Vec<LiveRoomMemberState>> {
        Ok(self.channel(&filter.channel_id).await.member_states(filter))
    }

    async fn upsert_member_state(
        &mut self,
        channel_id: &str,
        user_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        self.channel(channel_id)
            .await
            .upsert_member(channel_id, user_id, state_type, &value);
        Ok(())
    }

    async fn bulk_upsert_member_states(
        &mut self,
        channel_id: &str,
        user_ids: &[String],
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        let tables = self.channel(channel_id).await;
        for user_id in user_ids {
            tables.upsert_member(channel_id, user_id, state_type, &value);
        }
        Ok(())
    }

    async fn update_all_member_states(
        &mut self,
        channel_id: &str,
        state_type: MemberStateType,
        value: StateValue,
    ) -> DaoResult<()> {
        let now = DateTime::now();
        for row in self
            .channel(channel_id)
            .await
            .members
            .values_mut()
            .filter(|m| m.state_type == state_type)
        {
            row.bool_value = value.bool_value;
            row.string_array_value = value.string_array_value.clone();
            row.updated_at = now;
        }
        Ok(())
    }

    async fn create_poll(&mut self, poll: LiveRoomPoll) -> DaoResult<()> {
        let channel_id = poll.channel_id.clone();
        let tables = self.channel(&channel_id).await;
        if tables.polls.iter().any(|p| p.poll_id == poll.poll_id) {
            return Err(DaoError::DuplicateKey(poll.poll_id));
        }
        tables.polls.push(poll);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> DaoResult<()> {
        for (_, LockedChannel { mut guard, working }) in self.locked {
            *guard = working;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DaoResult<()> {
        Ok(())
    }
}
