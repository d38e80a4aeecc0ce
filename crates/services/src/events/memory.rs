use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::broadcast;
use tracing::warn;

use super::{BusError, EventBus, EventStream};

/// In-process bus over a tokio broadcast channel. Messages published while
/// nobody is subscribed are dropped.
#[derive(Clone)]
pub struct MemoryBus {
    sender: broadcast::Sender<(String, Vec<u8>)>,
}

impl MemoryBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }
}

#[async_trait]
impl EventBus for MemoryBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<String, BusError> {
        let message_id = uuid::Uuid::new_v4().to_string();
        // Err only means there are no receivers right now.
        let _ = self.sender.send((subject.to_string(), payload));
        Ok(message_id)
    }

    async fn subscribe(&self, subject: &str) -> Result<EventStream, BusError> {
        let subject = subject.to_string();
        let rx = self.sender.subscribe();
        let stream = futures::stream::unfold(rx, move |mut rx| {
            let subject = subject.clone();
            async move {
                loop {
                    match rx.recv().await {
                        Ok((s, payload)) if s == subject => return Some((payload, rx)),
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(subject = %subject, skipped, "Subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
        });
        Ok(stream.boxed())
    }
}
