use bson::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One transient per-user flag or value inside a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveRoomMemberState {
    pub channel_id: String,
    pub user_id: String,
    pub state_type: MemberStateType,
    #[serde(default)]
    pub bool_value: bool,
    #[serde(default)]
    pub string_array_value: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl LiveRoomMemberState {
    pub const COLLECTION: &'static str = "live_room_member_states";

    pub fn new(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        state_type: MemberStateType,
        value: StateValue,
    ) -> Self {
        let now = DateTime::now();
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            state_type,
            bool_value: value.bool_value,
            string_array_value: value.string_array_value,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemberStateType {
    Chat,
    Annotation,
    HandsUp,
    PollingAnswer,
}

impl MemberStateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStateType::Chat => "chat",
            MemberStateType::Annotation => "annotation",
            MemberStateType::HandsUp => "hands_up",
            MemberStateType::PollingAnswer => "polling_answer",
        }
    }
}

impl fmt::Display for MemberStateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateValue {
    pub bool_value: bool,
    pub string_array_value: Vec<String>,
}

impl StateValue {
    pub fn flag(value: bool) -> Self {
        Self {
            bool_value: value,
            string_array_value: Vec::new(),
        }
    }

    pub fn answers(answers: Vec<String>) -> Self {
        Self {
            bool_value: false,
            string_array_value: answers,
        }
    }
}

/// Filter for member-state lookups. `None` fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MemberStateFilter {
    pub channel_id: String,
    pub user_id: Option<String>,
    pub state_type: Option<MemberStateType>,
}

impl MemberStateFilter {
    pub fn channel(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_state_type(mut self, state_type: MemberStateType) -> Self {
        self.state_type = Some(state_type);
        self
    }

    pub fn matches(&self, state: &LiveRoomMemberState) -> bool {
        state.channel_id == self.channel_id
            && self.user_id.as_ref().is_none_or(|u| *u == state.user_id)
            && self.state_type.is_none_or(|t| t == state.state_type)
    }
}
