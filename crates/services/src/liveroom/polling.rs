//! Polling lifecycle: `absent -> started -> stopped -> ended (absent again)`.
//!
//! Everything here is pure; the dispatcher loads the current poll inside its
//! transaction, runs the transition and writes the result back.

use std::collections::HashSet;

use bson::DateTime;
use liveroom_db::models::{
    CurrentPolling, LiveRoomMemberState, LiveRoomPoll, MemberStateType, PollAnswer,
    PollingOption, PollingStatus,
};

use crate::error::{RoomError, RoomResult};

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;

fn no_poll() -> RoomError {
    RoomError::NotFound("no poll in progress".to_string())
}

pub fn validate_options(options: &[PollingOption]) -> RoomResult<()> {
    if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&options.len()) {
        return Err(RoomError::Validation(format!(
            "a poll needs between {MIN_OPTIONS} and {MAX_OPTIONS} options, got {}",
            options.len()
        )));
    }
    let mut seen = HashSet::new();
    for option in options {
        if option.answer.trim().is_empty() {
            return Err(RoomError::Validation("option labels must not be empty".to_string()));
        }
        if !seen.insert(option.answer.as_str()) {
            return Err(RoomError::Validation(format!(
                "duplicate option label {}",
                option.answer
            )));
        }
    }
    if !options.iter().any(|o| o.is_correct) {
        return Err(RoomError::Validation(
            "at least one option must be correct".to_string(),
        ));
    }
    Ok(())
}

pub fn start(
    current: Option<&CurrentPolling>,
    question: String,
    options: Vec<PollingOption>,
    now: DateTime,
) -> RoomResult<CurrentPolling> {
    if let Some(current) = current {
        return Err(RoomError::InvalidTransition(format!(
            "a poll is already {}",
            status_name(current.status)
        )));
    }
    validate_options(&options)?;
    Ok(CurrentPolling {
        question,
        options,
        status: PollingStatus::Started,
        is_shared: false,
        created_at: now,
        updated_at: now,
        stopped_at: None,
        ended_at: None,
    })
}

pub fn stop(current: Option<CurrentPolling>, now: DateTime) -> RoomResult<CurrentPolling> {
    let mut polling = current.ok_or_else(no_poll)?;
    if polling.status != PollingStatus::Started {
        return Err(RoomError::InvalidTransition(
            "only a started poll can be stopped".to_string(),
        ));
    }
    polling.status = PollingStatus::Stopped;
    polling.stopped_at = Some(now);
    polling.updated_at = now;
    Ok(polling)
}

/// Checks that `current` may be ended and hands it back.
pub fn ensure_endable(current: Option<CurrentPolling>) -> RoomResult<CurrentPolling> {
    let polling = current.ok_or_else(no_poll)?;
    if polling.status != PollingStatus::Stopped {
        return Err(RoomError::InvalidTransition(
            "a poll must be stopped before it is ended".to_string(),
        ));
    }
    Ok(polling)
}

pub fn share(
    current: Option<CurrentPolling>,
    is_shared: bool,
    now: DateTime,
) -> RoomResult<CurrentPolling> {
    let mut polling = current.ok_or_else(no_poll)?;
    if polling.status != PollingStatus::Stopped {
        return Err(RoomError::InvalidTransition(
            "results can only be shared once the poll is stopped".to_string(),
        ));
    }
    polling.is_shared = is_shared;
    polling.updated_at = now;
    Ok(polling)
}

pub fn validate_answers(current: Option<&CurrentPolling>, answers: &[String]) -> RoomResult<()> {
    let polling = current.ok_or_else(no_poll)?;
    if polling.status != PollingStatus::Started {
        return Err(RoomError::InvalidTransition(
            "answers are only accepted while the poll is started".to_string(),
        ));
    }
    if answers.is_empty() {
        return Err(RoomError::Validation("answers must not be empty".to_string()));
    }
    let mut seen = HashSet::new();
    for answer in answers {
        if !polling.options.iter().any(|o| &o.answer == answer) {
            return Err(RoomError::Validation(format!("{answer} is not an option")));
        }
        if !seen.insert(answer.as_str()) {
            return Err(RoomError::Validation(format!("{answer} is answered twice")));
        }
    }
    Ok(())
}

/// A poll being closed: the history row to persist and the users whose
/// polling answers have to be cleared.
#[derive(Debug)]
pub struct ClosedPoll {
    pub record: LiveRoomPoll,
    pub answered_user_ids: Vec<String>,
}

pub fn close(
    polling: CurrentPolling,
    channel_id: &str,
    members: &[LiveRoomMemberState],
    poll_id: String,
    now: DateTime,
) -> ClosedPoll {
    let answer_rows: Vec<_> = members
        .iter()
        .filter(|m| m.channel_id == channel_id && m.state_type == MemberStateType::PollingAnswer)
        .collect();

    let students_answers = answer_rows
        .iter()
        .filter(|m| !m.string_array_value.is_empty())
        .map(|m| PollAnswer {
            user_id: m.user_id.clone(),
            answers: m.string_array_value.clone(),
            updated_at: m.updated_at,
        })
        .collect();

    ClosedPoll {
        record: LiveRoomPoll {
            poll_id,
            channel_id: channel_id.to_string(),
            question: polling.question,
            options: polling.options,
            students_answers,
            created_at: polling.created_at,
            stopped_at: polling.stopped_at,
            ended_at: now,
        },
        answered_user_ids: answer_rows.iter().map(|m| m.user_id.clone()).collect(),
    }
}

fn status_name(status: PollingStatus) -> &'static str {
    match status {
        PollingStatus::Started => "started",
        PollingStatus::Stopped => "stopped",
    }
}
