use std::collections::VecDeque;

use async_trait::async_trait;
use futures::StreamExt;
use redis::{
    AsyncCommands, RedisResult,
    aio::{ConnectionManager, MultiplexedConnection},
    streams::{StreamReadOptions, StreamReadReply},
};
use tracing::{debug, info, warn};

use super::{BusError, EventBus, EventStream};

const PAYLOAD_FIELD: &str = "payload";
const BLOCK_MS: usize = 5_000;
const BATCH_SIZE: usize = 16;

/// Redis Streams bus. Events are appended with XADD and read through a
/// consumer group, so replicas sharing the group split the work and events
/// published while no reader is connected wait in the stream.
#[derive(Clone)]
pub struct RedisBus {
    client: redis::Client,
    conn: ConnectionManager,
    group: String,
}

impl RedisBus {
    pub async fn connect(url: &str, group: &str) -> Result<Self, BusError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client.clone()).await?;
        info!(group, "Connected to Redis event bus");
        Ok(Self {
            client,
            conn,
            group: group.to_string(),
        })
    }

    async fn ensure_group(&self, subject: &str) -> Result<(), BusError> {
        let mut conn = self.conn.clone();
        let created: RedisResult<()> = conn
            .xgroup_create_mkstream(subject, &self.group, "$")
            .await;
        match created {
            Ok(()) => {
                info!(subject, group = %self.group, "Consumer group created");
                Ok(())
            }
            Err(e) if e.code() == Some("BUSYGROUP") => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl EventBus for RedisBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<String, BusError> {
        let mut conn = self.conn.clone();
        let message_id: String = conn
            .xadd(subject, "*", &[(PAYLOAD_FIELD, payload.as_slice())])
            .await?;
        debug!(subject, %message_id, "Appended to Redis stream");
        Ok(message_id)
    }

    async fn subscribe(&self, subject: &str) -> Result<EventStream, BusError> {
        self.ensure_group(subject).await?;
        // blocking reads get a connection of their own
        let conn = self.client.get_multiplexed_async_connection().await?;
        let reader = GroupReader {
            conn,
            subject: subject.to_string(),
            group: self.group.clone(),
            consumer: uuid::Uuid::new_v4().simple().to_string(),
            pending: VecDeque::new(),
        };
        info!(subject, group = %reader.group, consumer = %reader.consumer, "Reading Redis stream");

        let stream = futures::stream::unfold(reader, |mut reader| async move {
            loop {
                if let Some(payload) = reader.pending.pop_front() {
                    return Some((payload, reader));
                }
                if let Err(e) = reader.read_batch().await {
                    warn!(error = %e, subject = %reader.subject, "Redis stream read failed");
                    return None;
                }
            }
        });
        Ok(stream.boxed())
    }
}

/// One consumer of a consumer group.
struct GroupReader {
    conn: MultiplexedConnection,
    subject: String,
    group: String,
    consumer: String,
    pending: VecDeque<Vec<u8>>,
}

impl GroupReader {
    /// Blocks for the next batch of new entries and acknowledges each one as
    /// it is queued.
    async fn read_batch(&mut self) -> RedisResult<()> {
        let options = StreamReadOptions::default()
            .group(&self.group, &self.consumer)
            .block(BLOCK_MS)
            .count(BATCH_SIZE);
        let reply: Option<StreamReadReply> = self
            .conn
            .xread_options(&[&self.subject], &[">"], &options)
            .await?;

        for key in reply.map(|r| r.keys).unwrap_or_default() {
            for entry in key.ids {
                match entry.get::<Vec<u8>>(PAYLOAD_FIELD) {
                    Some(payload) => self.pending.push_back(payload),
                    None => warn!(entry_id = %entry.id, "Skipping stream entry without payload"),
                }
                let _: i64 = self
                    .conn
                    .xack(&self.subject, &self.group, &[&entry.id])
                    .await?;
            }
        }
        Ok(())
    }
}
