use std::fmt;

use liveroom_db::models::{MaterialPlayback, PollingOption, WhiteboardZoomState};
use serde::{Deserialize, Serialize};

/// One state-mutating request against a single channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub channel_id: String,
    pub commander_id: String,
    pub action: RoomAction,
}

impl Command {
    pub fn new(
        channel_id: impl Into<String>,
        commander_id: impl Into<String>,
        action: RoomAction,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            commander_id: commander_id.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomAction {
    EnableChat {
        user_ids: Vec<String>,
    },
    DisableChat {
        user_ids: Vec<String>,
    },
    EnableAnnotation {
        user_ids: Vec<String>,
    },
    DisableAnnotation {
        user_ids: Vec<String>,
    },
    DisableAllAnnotation,
    StartPolling {
        #[serde(default)]
        question: String,
        options: Vec<PollingOption>,
    },
    StopPolling,
    EndPolling,
    SharePolling {
        is_shared: bool,
    },
    SubmitPollingAnswer {
        answers: Vec<String>,
    },
    RaiseHand,
    LowerHand,
    FoldUserHand {
        user_id: String,
    },
    FoldAllHands,
    SetSpotlight {
        user_id: String,
    },
    ClearSpotlight,
    UpdateWhiteboardZoomState(WhiteboardZoomState),
    ShareMaterial {
        media_id: String,
        #[serde(default)]
        playback: MaterialPlayback,
    },
    StopSharingMaterial,
    UpsertSessionTime,
    RequestRecording,
    StopRecording,
    /// Only issued by ending the room.
    #[serde(skip)]
    ResetAllStates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    EnableChat,
    DisableChat,
    EnableAnnotation,
    DisableAnnotation,
    DisableAllAnnotation,
    StartPolling,
    StopPolling,
    EndPolling,
    SharePolling,
    SubmitPollingAnswer,
    RaiseHand,
    LowerHand,
    FoldUserHand,
    FoldAllHands,
    SetSpotlight,
    ClearSpotlight,
    UpdateWhiteboardZoomState,
    ShareMaterial,
    StopSharingMaterial,
    UpsertSessionTime,
    RequestRecording,
    StopRecording,
    ResetAllStates,
}

impl CommandKind {
    pub const ALL: [CommandKind; 23] = [
        CommandKind::EnableChat,
        CommandKind::DisableChat,
        CommandKind::EnableAnnotation,
        CommandKind::DisableAnnotation,
        CommandKind::DisableAllAnnotation,
        CommandKind::StartPolling,
        CommandKind::StopPolling,
        CommandKind::EndPolling,
        CommandKind::SharePolling,
        CommandKind::SubmitPollingAnswer,
        CommandKind::RaiseHand,
        CommandKind::LowerHand,
        CommandKind::FoldUserHand,
        CommandKind::FoldAllHands,
        CommandKind::SetSpotlight,
        CommandKind::ClearSpotlight,
        CommandKind::UpdateWhiteboardZoomState,
        CommandKind::ShareMaterial,
        CommandKind::StopSharingMaterial,
        CommandKind::UpsertSessionTime,
        CommandKind::RequestRecording,
        CommandKind::StopRecording,
        CommandKind::ResetAllStates,
    ];
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl RoomAction {
    pub fn kind(&self) -> CommandKind {
        match self {
            RoomAction::EnableChat { .. } => CommandKind::EnableChat,
            RoomAction::DisableChat { .. } => CommandKind::DisableChat,
            RoomAction::EnableAnnotation { .. } => CommandKind::EnableAnnotation,
            RoomAction::DisableAnnotation { .. } => CommandKind::DisableAnnotation,
            RoomAction::DisableAllAnnotation => CommandKind::DisableAllAnnotation,
            RoomAction::StartPolling { .. } => CommandKind::StartPolling,
            RoomAction::StopPolling => CommandKind::StopPolling,
            RoomAction::EndPolling => CommandKind::EndPolling,
            RoomAction::SharePolling { .. } => CommandKind::SharePolling,
            RoomAction::SubmitPollingAnswer { .. } => CommandKind::SubmitPollingAnswer,
            RoomAction::RaiseHand => CommandKind::RaiseHand,
            RoomAction::LowerHand => CommandKind::LowerHand,
            RoomAction::FoldUserHand { .. } => CommandKind::FoldUserHand,
            RoomAction::FoldAllHands => CommandKind::FoldAllHands,
            RoomAction::SetSpotlight { .. } => CommandKind::SetSpotlight,
            RoomAction::ClearSpotlight => CommandKind::ClearSpotlight,
            RoomAction::UpdateWhiteboardZoomState(_) => CommandKind::UpdateWhiteboardZoomState,
            RoomAction::ShareMaterial { .. } => CommandKind::ShareMaterial,
            RoomAction::StopSharingMaterial => CommandKind::StopSharingMaterial,
            RoomAction::UpsertSessionTime => CommandKind::UpsertSessionTime,
            RoomAction::RequestRecording => CommandKind::RequestRecording,
            RoomAction::StopRecording => CommandKind::StopRecording,
            RoomAction::ResetAllStates => CommandKind::ResetAllStates,
        }
    }
}
