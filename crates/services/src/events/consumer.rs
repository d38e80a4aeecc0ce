use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use liveroom_db::models::{MemberStateType, StateValue};
use tracing::{debug, error, info, warn};

use super::{EventPublisher, EventStream, LiveRoomEvent};
use crate::error::RoomResult;
use crate::store::LiveRoomStore;

pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Grants default chat and annotation permission to learners as they join.
#[derive(Clone)]
pub struct LiveRoomEventConsumer {
    store: Arc<dyn LiveRoomStore>,
}

impl LiveRoomEventConsumer {
    pub fn new(store: Arc<dyn LiveRoomStore>) -> Self {
        Self { store }
    }

    /// Consumes `stream` and, whenever the bus drops the subscription,
    /// subscribes again through `publisher`. Retries wait `retry_delay`,
    /// doubling up to [`MAX_RETRY_DELAY`] until events flow again.
    pub async fn supervise(
        self,
        publisher: EventPublisher,
        mut stream: EventStream,
        retry_delay: Duration,
    ) {
        let mut delay = retry_delay;
        loop {
            if self.drain(stream).await > 0 {
                delay = retry_delay;
            }
            warn!(subject = %publisher.subject(), "Live room event subscription ended");

            stream = loop {
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
                match publisher.subscribe().await {
                    Ok(stream) => {
                        info!(subject = %publisher.subject(), "Live room event consumer resubscribed");
                        break stream;
                    }
                    Err(e) => {
                        warn!(error = %e, retry_in_ms = delay.as_millis() as u64, "Resubscribe failed");
                    }
                }
            };
        }
    }

    /// Handles events until the stream ends and returns how many arrived.
    async fn drain(&self, mut stream: EventStream) -> usize {
        let mut received = 0;
        while let Some(payload) = stream.next().await {
            received += 1;
            if let Err(e) = self.handle(&payload).await {
                error!(error = %e, "Failed to handle live room event");
            }
        }
        received
    }

    pub async fn handle(&self, payload: &[u8]) -> RoomResult<()> {
        let event: LiveRoomEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Skipping malformed live room event");
                return Ok(());
            }
        };

        match event {
            LiveRoomEvent::JoinLiveRoom {
                channel_id,
                user_id,
                is_learner: true,
            } => self.grant_default_permissions(&channel_id, &user_id).await,
            other => {
                debug!(event = other.name(), channel_id = other.channel_id(), "Event acknowledged");
                Ok(())
            }
        }
    }

    async fn grant_default_permissions(&self, channel_id: &str, user_id: &str) -> RoomResult<()> {
        let mut tx = self.store.begin().await?;
        let result = async {
            for state_type in [MemberStateType::Chat, MemberStateType::Annotation] {
                tx.upsert_member_state(channel_id, user_id, state_type, StateValue::flag(true))
                    .await?;
            }
            Ok::<_, crate::dao::DaoError>(())
        }
        .await;

        match result {
            Ok(()) => {
                tx.commit().await?;
                debug!(channel_id, user_id, "Default learner permissions granted");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(e.into())
            }
        }
    }
}
