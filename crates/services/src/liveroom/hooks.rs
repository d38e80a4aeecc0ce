use std::sync::Arc;

use liveroom_db::models::LogCounter;
use tracing::warn;

use crate::activity::ActivitySink;
use crate::error::RoomResult;
use crate::events::{EventPublisher, LiveRoomEvent};

/// Side effect that runs after a successful commit. Failures never reach the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum PostCommitHook {
    IncreaseCounter {
        channel_id: String,
        counter: LogCounter,
    },
    AddAttendee {
        channel_id: String,
        user_id: String,
    },
    CompleteLog {
        channel_id: String,
    },
    Publish(LiveRoomEvent),
}

impl PostCommitHook {
    pub fn name(&self) -> &'static str {
        match self {
            PostCommitHook::IncreaseCounter { .. } => "increase_counter",
            PostCommitHook::AddAttendee { .. } => "add_attendee",
            PostCommitHook::CompleteLog { .. } => "complete_log",
            PostCommitHook::Publish(_) => "publish",
        }
    }
}

#[derive(Clone)]
pub struct HookRunner {
    activity: Arc<dyn ActivitySink>,
    publisher: EventPublisher,
}

impl HookRunner {
    pub fn new(activity: Arc<dyn ActivitySink>, publisher: EventPublisher) -> Self {
        Self {
            activity,
            publisher,
        }
    }

    pub async fn run(&self, hooks: Vec<PostCommitHook>) {
        for hook in hooks {
            if let Err(e) = self.run_one(&hook).await {
                warn!(hook = hook.name(), error = %e, "Post-commit hook failed");
            }
        }
    }

    async fn run_one(&self, hook: &PostCommitHook) -> RoomResult<()> {
        match hook {
            PostCommitHook::IncreaseCounter {
                channel_id,
                counter,
            } => self.activity.increase_counter(channel_id, *counter).await?,
            PostCommitHook::AddAttendee {
                channel_id,
                user_id,
            } => self.activity.add_attendee(channel_id, user_id).await?,
            PostCommitHook::CompleteLog { channel_id } => {
                self.activity.complete(channel_id).await?
            }
            PostCommitHook::Publish(event) => {
                self.publisher.publish(event).await?;
            }
        }
        Ok(())
    }
}
