use bson::DateTime;
use serde::{Deserialize, Serialize};

use super::live_room_state::PollingOption;

/// Historical record of a poll, written once when the poll ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveRoomPoll {
    #[serde(rename = "_id")]
    pub poll_id: String,
    pub channel_id: String,
    #[serde(default)]
    pub question: String,
    pub options: Vec<PollingOption>,
    pub students_answers: Vec<PollAnswer>,
    pub created_at: DateTime,
    pub stopped_at: Option<DateTime>,
    pub ended_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollAnswer {
    pub user_id: String,
    pub answers: Vec<String>,
    pub updated_at: DateTime,
}

impl LiveRoomPoll {
    pub const COLLECTION: &'static str = "live_room_polls";
}
