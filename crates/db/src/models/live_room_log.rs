use bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Per-session activity log. Only ever touched by best-effort side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveRoomLog {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub channel_id: String,
    #[serde(default)]
    pub attendee_ids: Vec<String>,
    #[serde(default)]
    pub total_times_updating_room_state: i64,
    #[serde(default)]
    pub total_times_getting_room_state: i64,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogCounter {
    UpdatingRoomState,
    GettingRoomState,
}

impl LogCounter {
    pub fn field(&self) -> &'static str {
        match self {
            LogCounter::UpdatingRoomState => "total_times_updating_room_state",
            LogCounter::GettingRoomState => "total_times_getting_room_state",
        }
    }
}

impl LiveRoomLog {
    pub const COLLECTION: &'static str = "live_room_logs";

    pub fn new(channel_id: impl Into<String>) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            channel_id: channel_id.into(),
            attendee_ids: Vec::new(),
            total_times_updating_room_state: 0,
            total_times_getting_room_state: 0,
            is_completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}
