use bson::DateTime;
use serde::{Deserialize, Serialize};

/// Mutable control-plane snapshot of one channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveRoomState {
    #[serde(rename = "_id")]
    pub channel_id: String,
    pub spotlighted_user: Option<String>,
    pub current_material: Option<CurrentMaterial>,
    #[serde(default)]
    pub whiteboard_zoom_state: WhiteboardZoomState,
    pub recording: Option<RecordingState>,
    pub current_polling: Option<CurrentPolling>,
    pub session_time: Option<DateTime>,
    #[serde(default)]
    pub streaming_learners: Vec<String>,
    pub updated_at: DateTime,
}

impl LiveRoomState {
    pub const COLLECTION: &'static str = "live_room_states";

    /// The state of a channel that has never been written to.
    pub fn empty(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            spotlighted_user: None,
            current_material: None,
            whiteboard_zoom_state: WhiteboardZoomState::default(),
            recording: None,
            current_polling: None,
            session_time: None,
            streaming_learners: Vec::new(),
            updated_at: DateTime::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentMaterial {
    pub media_id: String,
    pub updated_at: DateTime,
    #[serde(default)]
    pub playback: MaterialPlayback,
}

/// Extra playback state carried by the shared material. Documents and images
/// carry none; video and audio are mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaterialPlayback {
    #[default]
    Static,
    Video(PlaybackState),
    Audio(PlaybackState),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackState {
    pub current_time_ms: i64,
    pub player_state: PlayerState,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Playing,
    Paused,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WhiteboardZoomState {
    pub pdf_scale_ratio: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub pdf_width: f64,
    pub pdf_height: f64,
}

impl Default for WhiteboardZoomState {
    fn default() -> Self {
        Self {
            pdf_scale_ratio: 100.0,
            center_x: 0.0,
            center_y: 0.0,
            pdf_width: 0.0,
            pdf_height: 0.0,
        }
    }
}

impl WhiteboardZoomState {
    pub fn is_finite(&self) -> bool {
        [
            self.pdf_scale_ratio,
            self.center_x,
            self.center_y,
            self.pdf_width,
            self.pdf_height,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RecordingState {
    pub is_recording: bool,
    pub creator: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentPolling {
    #[serde(default)]
    pub question: String,
    pub options: Vec<PollingOption>,
    pub status: PollingStatus,
    #[serde(default)]
    pub is_shared: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    pub stopped_at: Option<DateTime>,
    pub ended_at: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollingOption {
    pub answer: String,
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PollingStatus {
    Started,
    Stopped,
}
