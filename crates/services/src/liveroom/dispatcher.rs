use std::sync::Arc;

use bson::DateTime;
use liveroom_db::models::{
    CurrentMaterial, CurrentPolling, LiveRoomState, LogCounter, MemberStateFilter,
    MemberStateType, RecordingState, StateValue, WhiteboardZoomState,
};
use tracing::{debug, info, warn};

use super::command::{Command, RoomAction};
use super::hooks::{HookRunner, PostCommitHook};
use super::{permission, polling};
use crate::error::{RoomError, RoomResult};
use crate::roles::RoleResolver;
use crate::store::{LiveRoomStore, LiveRoomTx};

/// Runs commands: authorize, open a transaction, apply, commit, then the
/// post-commit hooks.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn LiveRoomStore>,
    roles: Arc<dyn RoleResolver>,
    hooks: HookRunner,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn LiveRoomStore>,
        roles: Arc<dyn RoleResolver>,
        hooks: HookRunner,
    ) -> Self {
        Self {
            store,
            roles,
            hooks,
        }
    }

    pub async fn dispatch(&self, command: Command) -> RoomResult<()> {
        let kind = command.action.kind();
        let is_learner = self.roles.is_learner(&command.commander_id).await?;
        if let Err(e) = permission::authorize(kind, is_learner) {
            warn!(
                channel_id = %command.channel_id,
                commander_id = %command.commander_id,
                %kind,
                "Command rejected"
            );
            return Err(e);
        }

        let mut tx = self.store.begin().await?;
        let hooks = match execute(tx.as_mut(), &command).await {
            Ok(hooks) => {
                tx.commit().await?;
                hooks
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                debug!(channel_id = %command.channel_id, %kind, error = %e, "Command failed");
                return Err(e);
            }
        };

        info!(
            channel_id = %command.channel_id,
            commander_id = %command.commander_id,
            %kind,
            "Command applied"
        );
        self.hooks.run(hooks).await;
        Ok(())
    }
}

async fn load_state(tx: &mut dyn LiveRoomTx, channel_id: &str) -> RoomResult<LiveRoomState> {
    Ok(tx
        .get_state(channel_id)
        .await?
        .unwrap_or_else(|| LiveRoomState::empty(channel_id)))
}

async fn current_polling(
    tx: &mut dyn LiveRoomTx,
    channel_id: &str,
) -> RoomResult<Option<CurrentPolling>> {
    Ok(load_state(tx, channel_id).await?.current_polling)
}

fn require_users(user_ids: &[String]) -> RoomResult<()> {
    if user_ids.is_empty() || user_ids.iter().any(|u| u.trim().is_empty()) {
        return Err(RoomError::Validation("user_ids must not be empty".to_string()));
    }
    Ok(())
}

fn require_id(value: &str, field: &str) -> RoomResult<()> {
    if value.trim().is_empty() {
        return Err(RoomError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

async fn set_flags(
    tx: &mut dyn LiveRoomTx,
    channel_id: &str,
    user_ids: &[String],
    state_type: MemberStateType,
    value: bool,
) -> RoomResult<()> {
    require_users(user_ids)?;
    tx.bulk_upsert_member_states(channel_id, user_ids, state_type, StateValue::flag(value))
        .await?;
    Ok(())
}

async fn execute(tx: &mut dyn LiveRoomTx, command: &Command) -> RoomResult<Vec<PostCommitHook>> {
    let channel_id = command.channel_id.as_str();
    let commander_id = command.commander_id.as_str();
    let now = DateTime::now();

    match &command.action {
        RoomAction::EnableChat { user_ids } => {
            set_flags(tx, channel_id, user_ids, MemberStateType::Chat, true).await?
        }
        RoomAction::DisableChat { user_ids } => {
            set_flags(tx, channel_id, user_ids, MemberStateType::Chat, false).await?
        }
        RoomAction::EnableAnnotation { user_ids } => {
            set_flags(tx, channel_id, user_ids, MemberStateType::Annotation, true).await?
        }
        RoomAction::DisableAnnotation { user_ids } => {
            set_flags(tx, channel_id, user_ids, MemberStateType::Annotation, false).await?
        }
        RoomAction::DisableAllAnnotation => {
            tx.update_all_member_states(
                channel_id,
                MemberStateType::Annotation,
                StateValue::flag(false),
            )
            .await?
        }
        RoomAction::StartPolling { question, options } => {
            let current = current_polling(tx, channel_id).await?;
            let started = polling::start(current.as_ref(), question.clone(), options.clone(), now)?;
            tx.upsert_current_polling(channel_id, Some(started)).await?
        }
        RoomAction::StopPolling => {
            let current = current_polling(tx, channel_id).await?;
            let stopped = polling::stop(current, now)?;
            tx.upsert_current_polling(channel_id, Some(stopped)).await?
        }
        RoomAction::EndPolling => end_polling(tx, channel_id, now).await?,
        RoomAction::SharePolling { is_shared } => {
            let current = current_polling(tx, channel_id).await?;
            let shared = polling::share(current, *is_shared, now)?;
            tx.upsert_current_polling(channel_id, Some(shared)).await?
        }
        RoomAction::SubmitPollingAnswer { answers } => {
            let current = current_polling(tx, channel_id).await?;
            polling::validate_answers(current.as_ref(), answers)?;
            tx.upsert_member_state(
                channel_id,
                commander_id,
                MemberStateType::PollingAnswer,
                StateValue::answers(answers.clone()),
            )
            .await?
        }
        RoomAction::RaiseHand | RoomAction::LowerHand => {
            let raised = matches!(command.action, RoomAction::RaiseHand);
            tx.upsert_member_state(
                channel_id,
                commander_id,
                MemberStateType::HandsUp,
                StateValue::flag(raised),
            )
            .await?
        }
        RoomAction::FoldUserHand { user_id } => {
            require_id(user_id, "user_id")?;
            tx.upsert_member_state(
                channel_id,
                user_id,
                MemberStateType::HandsUp,
                StateValue::flag(false),
            )
            .await?
        }
        RoomAction::FoldAllHands => {
            tx.update_all_member_states(channel_id, MemberStateType::HandsUp, StateValue::flag(false))
                .await?
        }
        RoomAction::SetSpotlight { user_id } => {
            require_id(user_id, "user_id")?;
            tx.set_spotlight(channel_id, Some(user_id.as_str())).await?
        }
        RoomAction::ClearSpotlight => tx.set_spotlight(channel_id, None).await?,
        RoomAction::UpdateWhiteboardZoomState(zoom) => {
            if !zoom.is_finite() {
                return Err(RoomError::Validation(
                    "whiteboard zoom values must be finite".to_string(),
                ));
            }
            tx.upsert_whiteboard_zoom(channel_id, zoom.clone()).await?
        }
        RoomAction::ShareMaterial { media_id, playback } => {
            require_id(media_id, "media_id")?;
            let material = CurrentMaterial {
                media_id: media_id.clone(),
                updated_at: now,
                playback: playback.clone(),
            };
            tx.upsert_current_material(channel_id, Some(material)).await?
        }
        RoomAction::StopSharingMaterial => tx.upsert_current_material(channel_id, None).await?,
        RoomAction::UpsertSessionTime => tx.upsert_session_time(channel_id).await?,
        RoomAction::RequestRecording => {
            let state = load_state(tx, channel_id).await?;
            if state.recording.as_ref().is_some_and(|r| r.is_recording) {
                debug!(channel_id, "Recording already in progress");
            } else {
                let recording = RecordingState {
                    is_recording: true,
                    creator: Some(commander_id.to_string()),
                };
                tx.upsert_recording(channel_id, Some(recording)).await?
            }
        }
        RoomAction::StopRecording => {
            let state = load_state(tx, channel_id).await?;
            let creator = state.recording.and_then(|r| r.creator);
            if creator.as_deref().is_some_and(|c| c != commander_id) {
                debug!(channel_id, commander_id, "Recording owned by another user");
            } else {
                tx.upsert_recording(channel_id, Some(RecordingState::default()))
                    .await?
            }
        }
        RoomAction::ResetAllStates => reset_all_states(tx, channel_id).await?,
    }

    Ok(vec![PostCommitHook::IncreaseCounter {
        channel_id: channel_id.to_string(),
        counter: LogCounter::UpdatingRoomState,
    }])
}

async fn end_polling(tx: &mut dyn LiveRoomTx, channel_id: &str, now: DateTime) -> RoomResult<()> {
    let current = current_polling(tx, channel_id).await?;
    let polling = polling::ensure_endable(current)?;
    let members = tx
        .get_member_states(
            &MemberStateFilter::channel(channel_id).with_state_type(MemberStateType::PollingAnswer),
        )
        .await?;

    let closed = polling::close(
        polling,
        channel_id,
        &members,
        uuid::Uuid::new_v4().to_string(),
        now,
    );
    debug!(
        channel_id,
        poll_id = %closed.record.poll_id,
        answers = closed.record.students_answers.len(),
        "Poll ended"
    );
    tx.create_poll(closed.record).await?;
    tx.upsert_current_polling(channel_id, None).await?;
    tx.bulk_upsert_member_states(
        channel_id,
        &closed.answered_user_ids,
        MemberStateType::PollingAnswer,
        StateValue::answers(Vec::new()),
    )
    .await?;
    Ok(())
}

async fn reset_all_states(tx: &mut dyn LiveRoomTx, channel_id: &str) -> RoomResult<()> {
    tx.upsert_current_material(channel_id, None).await?;
    tx.update_all_member_states(channel_id, MemberStateType::Annotation, StateValue::flag(true))
        .await?;
    tx.update_all_member_states(channel_id, MemberStateType::HandsUp, StateValue::flag(false))
        .await?;

    if current_polling(tx, channel_id).await?.is_some() {
        tx.upsert_current_polling(channel_id, None).await?;
        tx.update_all_member_states(
            channel_id,
            MemberStateType::PollingAnswer,
            StateValue::answers(Vec::new()),
        )
        .await?;
    }

    tx.upsert_whiteboard_zoom(channel_id, WhiteboardZoomState::default())
        .await?;
    tx.set_spotlight(channel_id, None).await?;
    tx.update_all_member_states(channel_id, MemberStateType::Chat, StateValue::flag(true))
        .await?;
    tx.upsert_recording(channel_id, None).await?;
    Ok(())
}
