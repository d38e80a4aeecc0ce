use bson::DateTime;
use liveroom_db::models::{
    CurrentPolling, LiveRoomPoll, MaterialPlayback, MediaType, PollingOption, PollingStatus,
    RecordingState, WhiteboardZoomState,
};
use liveroom_services::liveroom::reader::{FlagView, LiveRoomSnapshot, UserStateView};
use serde::Serialize;

fn rfc3339(dt: DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

#[derive(Debug, Serialize)]
pub struct LiveRoomStateResponse {
    pub channel_id: String,
    pub current_material: Option<MaterialResponse>,
    pub spotlighted_user: Option<String>,
    pub whiteboard_zoom_state: WhiteboardZoomState,
    pub recording: Option<RecordingState>,
    pub current_polling: Option<PollingResponse>,
    pub session_time: Option<String>,
    pub users: Vec<UserStateResponse>,
    pub current_time: String,
}

#[derive(Debug, Serialize)]
pub struct MaterialResponse {
    pub media_id: String,
    pub name: String,
    pub resource: String,
    pub media_type: MediaType,
    pub playback: MaterialPlayback,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct PollingResponse {
    pub question: String,
    pub options: Vec<PollingOption>,
    pub status: PollingStatus,
    pub is_shared: bool,
    pub created_at: String,
    pub stopped_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlagResponse {
    pub value: bool,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answers: Vec<String>,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct UserStateResponse {
    pub user_id: String,
    pub chat: Option<FlagResponse>,
    pub annotation: Option<FlagResponse>,
    pub hands_up: Option<FlagResponse>,
    pub polling_answer: Option<AnswerResponse>,
}

#[derive(Debug, Serialize)]
pub struct PollAnswerResponse {
    pub user_id: String,
    pub answers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub id: String,
    pub question: String,
    pub options: Vec<PollingOption>,
    pub students_answers: Vec<PollAnswerResponse>,
    pub created_at: String,
    pub stopped_at: Option<String>,
    pub ended_at: String,
}

pub fn to_state_response(s: LiveRoomSnapshot) -> LiveRoomStateResponse {
    LiveRoomStateResponse {
        channel_id: s.channel_id,
        current_material: s.current_material.map(|m| MaterialResponse {
            media_id: m.media.media_id,
            name: m.media.name,
            resource: m.media.resource,
            media_type: m.media.media_type,
            playback: m.playback,
            updated_at: rfc3339(m.updated_at),
        }),
        spotlighted_user: s.spotlighted_user,
        whiteboard_zoom_state: s.whiteboard_zoom_state,
        recording: s.recording,
        current_polling: s.current_polling.map(to_polling_response),
        session_time: s.session_time.map(rfc3339),
        users: s.users.into_iter().map(to_user_response).collect(),
        current_time: rfc3339(s.current_time),
    }
}

fn to_polling_response(p: CurrentPolling) -> PollingResponse {
    PollingResponse {
        question: p.question,
        options: p.options,
        status: p.status,
        is_shared: p.is_shared,
        created_at: rfc3339(p.created_at),
        stopped_at: p.stopped_at.map(rfc3339),
    }
}

fn to_user_response(u: UserStateView) -> UserStateResponse {
    let flag = |f: FlagView| FlagResponse {
        value: f.value,
        updated_at: rfc3339(f.updated_at),
    };
    UserStateResponse {
        user_id: u.user_id,
        chat: u.chat.map(flag),
        annotation: u.annotation.map(flag),
        hands_up: u.hands_up.map(flag),
        polling_answer: u.polling_answer.map(|a| AnswerResponse {
            answers: a.answers,
            updated_at: rfc3339(a.updated_at),
        }),
    }
}

pub fn to_poll_response(p: LiveRoomPoll) -> PollResponse {
    PollResponse {
        id: p.poll_id,
        question: p.question,
        options: p.options,
        students_answers: p
            .students_answers
            .into_iter()
            .map(|a| PollAnswerResponse {
                user_id: a.user_id,
                answers: a.answers,
            })
            .collect(),
        created_at: rfc3339(p.created_at),
        stopped_at: p.stopped_at.map(rfc3339),
        ended_at: rfc3339(p.ended_at),
    }
}
