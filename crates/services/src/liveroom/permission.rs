//! Who may issue which command.

use super::command::CommandKind;
use crate::error::{RoomError, RoomResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Non-learners only.
    Teacher,
    /// Learners only; the command acts on the commander's own state.
    Learner,
    /// No role check.
    Anyone,
}

pub fn audience(kind: CommandKind) -> Audience {
    use CommandKind::*;

    match kind {
        EnableAnnotation
        | DisableAnnotation
        | DisableAllAnnotation
        | EnableChat
        | DisableChat
        | StartPolling
        | StopPolling
        | EndPolling
        | SharePolling
        | SetSpotlight
        | ClearSpotlight
        | FoldUserHand
        | FoldAllHands
        | UpdateWhiteboardZoomState
        | UpsertSessionTime
        | RequestRecording
        | StopRecording
        | ResetAllStates => Audience::Teacher,

        RaiseHand | LowerHand | SubmitPollingAnswer => Audience::Learner,

        // Either role may drive the shared material.
        ShareMaterial | StopSharingMaterial => Audience::Anyone,
    }
}

pub fn allowed(kind: CommandKind, is_learner: bool) -> bool {
    match audience(kind) {
        Audience::Teacher => !is_learner,
        Audience::Learner => is_learner,
        Audience::Anyone => true,
    }
}

pub fn authorize(kind: CommandKind, is_learner: bool) -> RoomResult<()> {
    if allowed(kind, is_learner) {
        return Ok(());
    }
    let role = if is_learner { "learner" } else { "teacher" };
    Err(RoomError::Unauthorized(format!(
        "a {role} may not issue {kind}"
    )))
}
