use std::collections::HashMap;

use async_trait::async_trait;
use liveroom_db::models::{LiveRoomLog, LogCounter};
use parking_lot::Mutex;

use crate::dao::{DaoResult, live_room_log::LiveRoomLogDao};

/// Fire-and-forget activity bookkeeping for the open session of a channel.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn increase_counter(&self, channel_id: &str, counter: LogCounter) -> DaoResult<()>;
    async fn add_attendee(&self, channel_id: &str, user_id: &str) -> DaoResult<()>;
    async fn complete(&self, channel_id: &str) -> DaoResult<()>;
}

#[async_trait]
impl ActivitySink for LiveRoomLogDao {
    async fn increase_counter(&self, channel_id: &str, counter: LogCounter) -> DaoResult<()> {
        LiveRoomLogDao::increase_counter(self, channel_id, counter).await
    }

    async fn add_attendee(&self, channel_id: &str, user_id: &str) -> DaoResult<()> {
        LiveRoomLogDao::add_attendee(self, channel_id, user_id).await
    }

    async fn complete(&self, channel_id: &str) -> DaoResult<()> {
        LiveRoomLogDao::complete(self, channel_id).await
    }
}

/// Keeps the open log of each channel in memory; completed logs are archived.
#[derive(Default)]
pub struct MemoryActivity {
    open: Mutex<HashMap<String, LiveRoomLog>>,
    completed: Mutex<Vec<LiveRoomLog>>,
}

impl MemoryActivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_log(&self, channel_id: &str) -> Option<LiveRoomLog> {
        self.open.lock().get(channel_id).cloned()
    }

    pub fn completed_logs(&self, channel_id: &str) -> Vec<LiveRoomLog> {
        self.completed
            .lock()
            .iter()
            .filter(|l| l.channel_id == channel_id)
            .cloned()
            .collect()
    }

    fn with_open_log(&self, channel_id: &str, f: impl FnOnce(&mut LiveRoomLog)) {
        let mut open = self.open.lock();
        let log = open
            .entry(channel_id.to_string())
            .or_insert_with(|| LiveRoomLog::new(channel_id));
        f(log);
        log.updated_at = bson::DateTime::now();
    }
}

#[async_trait]
impl ActivitySink for MemoryActivity {
    async fn increase_counter(&self, channel_id: &str, counter: LogCounter) -> DaoResult<()> {
        self.with_open_log(channel_id, |log| match counter {
            LogCounter::UpdatingRoomState => log.total_times_updating_room_state += 1,
            LogCounter::GettingRoomState => log.total_times_getting_room_state += 1,
        });
        Ok(())
    }

    async fn add_attendee(&self, channel_id: &str, user_id: &str) -> DaoResult<()> {
        self.with_open_log(channel_id, |log| {
            if !log.attendee_ids.iter().any(|a| a == user_id) {
                log.attendee_ids.push(user_id.to_string());
            }
        });
        Ok(())
    }

    async fn complete(&self, channel_id: &str) -> DaoResult<()> {
        let log = self.open.lock().remove(channel_id);
        if let Some(mut log) = log {
            log.is_completed = true;
            log.updated_at = bson::DateTime::now();
            self.completed.lock().push(log);
        }
        Ok(())
    }
}
