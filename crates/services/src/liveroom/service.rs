use std::sync::Arc;

use bson::oid::ObjectId;
use liveroom_db::models::LiveRoom;
use serde::Serialize;
use tracing::{info, warn};

use super::command::{Command, RoomAction};
use super::dispatcher::Dispatcher;
use super::hooks::{HookRunner, PostCommitHook};
use crate::dao::DaoError;
use crate::error::{RoomError, RoomResult};
use crate::events::{EventPublisher, LiveRoomEvent};
use crate::roles::RoleResolver;
use crate::store::{LiveRoomStore, LiveRoomTx};
use crate::whiteboard::WhiteboardService;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JoinedRoom {
    pub channel_id: String,
    pub whiteboard_room_id: String,
    pub whiteboard_token: String,
    pub whiteboard_app_id: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishStatus {
    None,
    PreparedBefore,
    ReachedMaxUpstreamLimit,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnpublishStatus {
    None,
    UnpublishedBefore,
}

/// Room lifecycle: join, leave, end and upstream publishing slots.
#[derive(Clone)]
pub struct LiveRoomService {
    store: Arc<dyn LiveRoomStore>,
    roles: Arc<dyn RoleResolver>,
    whiteboard: Arc<dyn WhiteboardService>,
    publisher: EventPublisher,
    hooks: HookRunner,
    dispatcher: Dispatcher,
    max_streaming_learners: u32,
}

impl LiveRoomService {
    pub fn new(
        store: Arc<dyn LiveRoomStore>,
        roles: Arc<dyn RoleResolver>,
        whiteboard: Arc<dyn WhiteboardService>,
        publisher: EventPublisher,
        hooks: HookRunner,
        dispatcher: Dispatcher,
        max_streaming_learners: u32,
    ) -> Self {
        Self {
            store,
            roles,
            whiteboard,
            publisher,
            hooks,
            dispatcher,
            max_streaming_learners,
        }
    }

    pub async fn join(&self, channel_name: &str, user_id: &str) -> RoomResult<JoinedRoom> {
        let room = match self.store.get_live_room_by_channel_name(channel_name).await {
            Ok(room) if room.whiteboard_room_id.is_empty() => self.backfill_whiteboard(room).await?,
            Ok(room) => room,
            Err(DaoError::NotFound) => self.create_room(channel_name).await?,
            Err(e) => return Err(e.into()),
        };

        let whiteboard_token = self
            .whiteboard
            .fetch_room_token(&room.whiteboard_room_id)
            .await?;
        let is_learner = self.roles.is_learner(user_id).await?;

        self.publisher
            .publish(&LiveRoomEvent::JoinLiveRoom {
                channel_id: room.channel_id.clone(),
                user_id: user_id.to_string(),
                is_learner,
            })
            .await?;
        info!(channel_id = %room.channel_id, user_id, is_learner, "Joined live room");

        self.hooks
            .run(vec![PostCommitHook::AddAttendee {
                channel_id: room.channel_id.clone(),
                user_id: user_id.to_string(),
            }])
            .await;

        Ok(JoinedRoom {
            channel_id: room.channel_id,
            whiteboard_room_id: room.whiteboard_room_id,
            whiteboard_token,
            whiteboard_app_id: self.whiteboard.app_id().to_string(),
        })
    }

    /// Gives a room created without a whiteboard its whiteboard room. When
    /// another join filled it first, the stored ID wins.
    async fn backfill_whiteboard(&self, room: LiveRoom) -> RoomResult<LiveRoom> {
        let whiteboard_room_id = self.whiteboard.create_room().await?;
        match self
            .store
            .update_whiteboard_room_id(&room.channel_id, &whiteboard_room_id)
            .await
        {
            Ok(()) => Ok(LiveRoom {
                whiteboard_room_id,
                ..room
            }),
            Err(DaoError::NoRowsUpdated) => {
                info!(channel_id = %room.channel_id, "Whiteboard room filled concurrently, re-reading");
                Ok(self
                    .store
                    .get_live_room_by_channel_id(&room.channel_id)
                    .await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn create_room(&self, channel_name: &str) -> RoomResult<LiveRoom> {
        let whiteboard_room_id = self.whiteboard.create_room().await?;
        let room = LiveRoom::new(ObjectId::new().to_hex(), channel_name, whiteboard_room_id);

        match self.store.create_live_room(&room).await {
            Ok(()) => {
                info!(channel_id = %room.channel_id, channel_name, "Live room created");
                Ok(room)
            }
            Err(DaoError::DuplicateKey(_)) => {
                info!(channel_name, "Live room created concurrently, re-reading");
                Ok(self.store.get_live_room_by_channel_name(channel_name).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn leave(&self, channel_id: &str, user_id: &str) -> RoomResult<()> {
        self.store.get_live_room_by_channel_id(channel_id).await?;
        info!(channel_id, user_id, "Left live room");
        self.hooks
            .run(vec![PostCommitHook::Publish(LiveRoomEvent::LeaveLiveRoom {
                channel_id: channel_id.to_string(),
                user_id: user_id.to_string(),
            })])
            .await;
        Ok(())
    }

    pub async fn end(&self, channel_id: &str, user_id: &str) -> RoomResult<()> {
        self.store.get_live_room_by_channel_id(channel_id).await?;
        self.dispatcher
            .dispatch(Command::new(channel_id, user_id, RoomAction::ResetAllStates))
            .await?;

        let mut tx = self.store.begin().await?;
        match tx.end_live_room(channel_id).await {
            Ok(()) => tx.commit().await?,
            Err(e) => {
                rollback(tx).await;
                return Err(e.into());
            }
        }
        info!(channel_id, user_id, "Live room ended");

        self.hooks
            .run(vec![PostCommitHook::CompleteLog {
                channel_id: channel_id.to_string(),
            }])
            .await;
        self.publisher
            .publish(&LiveRoomEvent::EndLiveRoom {
                channel_id: channel_id.to_string(),
                user_id: user_id.to_string(),
            })
            .await?;
        Ok(())
    }

    /// Reserves an upstream publishing slot for `learner_id`.
    pub async fn prepare_publish(
        &self,
        channel_id: &str,
        learner_id: &str,
    ) -> RoomResult<PublishStatus> {
        let mut tx = self.store.begin().await?;
        let learners = match tx.get_streaming_learners(channel_id).await {
            Ok(learners) => learners,
            Err(e) => {
                rollback(tx).await;
                return Err(e.into());
            }
        };
        if learners.iter().any(|l| l == learner_id) {
            rollback(tx).await;
            return Ok(PublishStatus::PreparedBefore);
        }

        match tx
            .increase_streaming(channel_id, learner_id, self.max_streaming_learners)
            .await
        {
            Ok(()) => {
                tx.commit().await?;
                info!(channel_id, learner_id, "Upstream slot reserved");
                Ok(PublishStatus::None)
            }
            Err(DaoError::NoRowsUpdated) => {
                rollback(tx).await;
                Ok(PublishStatus::ReachedMaxUpstreamLimit)
            }
            Err(e) => {
                rollback(tx).await;
                Err(e.into())
            }
        }
    }

    pub async fn unpublish(
        &self,
        channel_id: &str,
        learner_id: &str,
    ) -> RoomResult<UnpublishStatus> {
        let mut tx = self.store.begin().await?;
        match tx.decrease_streaming(channel_id, learner_id).await {
            Ok(()) => {
                tx.commit().await?;
                info!(channel_id, learner_id, "Upstream slot released");
                Ok(UnpublishStatus::None)
            }
            Err(DaoError::NoRowsUpdated) => {
                rollback(tx).await;
                Ok(UnpublishStatus::UnpublishedBefore)
            }
            Err(e) => {
                rollback(tx).await;
                Err(RoomError::from(e))
            }
        }
    }
}

async fn rollback(tx: Box<dyn LiveRoomTx>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}
