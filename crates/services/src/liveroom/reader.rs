use std::collections::BTreeMap;
use std::sync::Arc;

use bson::DateTime;
use liveroom_db::models::{
    CurrentPolling, LiveRoomMemberState, LiveRoomPoll, LiveRoomState, LogCounter,
    MaterialPlayback, Media, MemberStateFilter, MemberStateType, RecordingState,
    WhiteboardZoomState,
};
use tracing::{debug, error};

use super::hooks::{HookRunner, PostCommitHook};
use crate::error::{RoomError, RoomResult};
use crate::media::MediaLookup;
use crate::store::LiveRoomStore;

/// Everything a participant's client needs to render the room.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRoomSnapshot {
    pub channel_id: String,
    pub current_material: Option<MaterialView>,
    pub spotlighted_user: Option<String>,
    pub whiteboard_zoom_state: WhiteboardZoomState,
    pub recording: Option<RecordingState>,
    pub current_polling: Option<CurrentPolling>,
    pub session_time: Option<DateTime>,
    pub users: Vec<UserStateView>,
    pub current_time: DateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialView {
    pub media: Media,
    pub updated_at: DateTime,
    pub playback: MaterialPlayback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagView {
    pub value: bool,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerView {
    pub answers: Vec<String>,
    pub updated_at: DateTime,
}

/// The member rows of one user, folded together.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStateView {
    pub user_id: String,
    pub chat: Option<FlagView>,
    pub annotation: Option<FlagView>,
    pub hands_up: Option<FlagView>,
    pub polling_answer: Option<AnswerView>,
}

impl UserStateView {
    fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            chat: None,
            annotation: None,
            hands_up: None,
            polling_answer: None,
        }
    }
}

pub fn group_by_user(rows: Vec<LiveRoomMemberState>) -> Vec<UserStateView> {
    let mut users: BTreeMap<String, UserStateView> = BTreeMap::new();
    for row in rows {
        let view = users
            .entry(row.user_id.clone())
            .or_insert_with(|| UserStateView::new(&row.user_id));
        let flag = FlagView {
            value: row.bool_value,
            updated_at: row.updated_at,
        };
        match row.state_type {
            MemberStateType::Chat => view.chat = Some(flag),
            MemberStateType::Annotation => view.annotation = Some(flag),
            MemberStateType::HandsUp => view.hands_up = Some(flag),
            MemberStateType::PollingAnswer => {
                view.polling_answer = Some(AnswerView {
                    answers: row.string_array_value,
                    updated_at: row.updated_at,
                })
            }
        }
    }
    users.into_values().collect()
}

#[derive(Clone)]
pub struct StateReader {
    store: Arc<dyn LiveRoomStore>,
    media: Arc<dyn MediaLookup>,
    hooks: HookRunner,
}

impl StateReader {
    pub fn new(
        store: Arc<dyn LiveRoomStore>,
        media: Arc<dyn MediaLookup>,
        hooks: HookRunner,
    ) -> Self {
        Self {
            store,
            media,
            hooks,
        }
    }

    /// The channel's state, or the default state when nothing was written yet.
    pub async fn get_room_state(&self, channel_id: &str) -> RoomResult<LiveRoomState> {
        Ok(self
            .store
            .get_state(channel_id)
            .await?
            .unwrap_or_else(|| LiveRoomState::empty(channel_id)))
    }

    pub async fn get_live_room_state(&self, channel_id: &str) -> RoomResult<LiveRoomSnapshot> {
        let state = self.get_room_state(channel_id).await?;

        let current_material = match state.current_material {
            Some(material) => {
                let medias = self
                    .media
                    .retrieve_medias_by_ids(std::slice::from_ref(&material.media_id))
                    .await
                    .map_err(|e| {
                        error!(channel_id, media_id = %material.media_id, error = %e, "Media lookup failed");
                        RoomError::Dependency(format!("media lookup failed: {e}"))
                    })?;
                let media = medias
                    .into_iter()
                    .find(|m| m.media_id == material.media_id)
                    .ok_or_else(|| {
                        RoomError::Dependency(format!(
                            "shared material {} does not exist",
                            material.media_id
                        ))
                    })?;
                Some(MaterialView {
                    media,
                    updated_at: material.updated_at,
                    playback: material.playback,
                })
            }
            None => None,
        };

        let rows = self
            .store
            .get_member_states(&MemberStateFilter::channel(channel_id))
            .await?;
        let users = group_by_user(rows);
        debug!(channel_id, users = users.len(), "Room state composed");

        self.hooks
            .run(vec![PostCommitHook::IncreaseCounter {
                channel_id: channel_id.to_string(),
                counter: LogCounter::GettingRoomState,
            }])
            .await;

        Ok(LiveRoomSnapshot {
            channel_id: channel_id.to_string(),
            current_material,
            spotlighted_user: state.spotlighted_user,
            whiteboard_zoom_state: state.whiteboard_zoom_state,
            recording: state.recording,
            current_polling: state.current_polling,
            session_time: state.session_time,
            users,
            current_time: DateTime::now(),
        })
    }

    /// Ended polls of the channel, most recent first.
    pub async fn list_polls(&self, channel_id: &str) -> RoomResult<Vec<LiveRoomPoll>> {
        Ok(self.store.list_polls(channel_id).await?)
    }
}
