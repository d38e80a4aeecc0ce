use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Identity of one live-room session. Created lazily on the first join.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveRoom {
    #[serde(rename = "_id")]
    pub channel_id: String,
    pub channel_name: String,
    #[serde(default)]
    pub whiteboard_room_id: String,
    pub ended_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl LiveRoom {
    pub const COLLECTION: &'static str = "live_rooms";

    pub fn new(
        channel_id: impl Into<String>,
        channel_name: impl Into<String>,
        whiteboard_room_id: impl Into<String>,
    ) -> Self {
        let now = DateTime::now();
        Self {
            channel_id: channel_id.into(),
            channel_name: channel_name.into(),
            whiteboard_room_id: whiteboard_room_id.into(),
            ended_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}
