//! Room lifecycle events and the buses that carry them.

pub mod consumer;
pub mod memory;
pub mod redis_bus;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use consumer::LiveRoomEventConsumer;
pub use memory::MemoryBus;
pub use redis_bus::RedisBus;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Event encoding error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Bus unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LiveRoomEvent {
    JoinLiveRoom {
        channel_id: String,
        user_id: String,
        is_learner: bool,
    },
    LeaveLiveRoom {
        channel_id: String,
        user_id: String,
    },
    EndLiveRoom {
        channel_id: String,
        user_id: String,
    },
}

impl LiveRoomEvent {
    pub fn channel_id(&self) -> &str {
        match self {
            LiveRoomEvent::JoinLiveRoom { channel_id, .. }
            | LiveRoomEvent::LeaveLiveRoom { channel_id, .. }
            | LiveRoomEvent::EndLiveRoom { channel_id, .. } => channel_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LiveRoomEvent::JoinLiveRoom { .. } => "join_live_room",
            LiveRoomEvent::LeaveLiveRoom { .. } => "leave_live_room",
            LiveRoomEvent::EndLiveRoom { .. } => "end_live_room",
        }
    }
}

pub type EventStream = BoxStream<'static, Vec<u8>>;

#[async_trait]
pub trait EventBus: Send + Sync {
    /// Hands `payload` to the bus and returns the message ID.
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<String, BusError>;
    async fn subscribe(&self, subject: &str) -> Result<EventStream, BusError>;
}

/// Encodes [`LiveRoomEvent`]s onto one subject.
#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn EventBus>,
    subject: String,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn EventBus>, subject: impl Into<String>) -> Self {
        Self {
            bus,
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub async fn publish(&self, event: &LiveRoomEvent) -> Result<String, BusError> {
        let payload = serde_json::to_vec(event)?;
        let message_id = self.bus.publish(&self.subject, payload).await?;
        debug!(
            subject = %self.subject,
            event = event.name(),
            channel_id = event.channel_id(),
            %message_id,
            "Event published"
        );
        Ok(message_id)
    }

    pub async fn subscribe(&self) -> Result<EventStream, BusError> {
        self.bus.subscribe(&self.subject).await
    }
}
