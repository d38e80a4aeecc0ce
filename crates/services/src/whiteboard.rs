use async_trait::async_trait;
use liveroom_config::WhiteboardSettings;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WhiteboardError {
    #[error("Whiteboard request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Whiteboard provider is not configured")]
    NotConfigured,
}

/// The parts of the whiteboard provider a live room needs.
#[async_trait]
pub trait WhiteboardService: Send + Sync {
    fn app_id(&self) -> &str;
    /// Creates a room and returns its ID.
    async fn create_room(&self) -> Result<String, WhiteboardError>;
    async fn fetch_room_token(&self, room_id: &str) -> Result<String, WhiteboardError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    is_record: bool,
}

#[derive(Debug, Deserialize)]
struct CreateRoomResponse {
    uuid: String,
}

#[derive(Debug, Serialize)]
struct RoomTokenRequest {
    lifespan: u64,
    role: &'static str,
}

/// Netless-style REST client.
pub struct HttpWhiteboard {
    client: reqwest::Client,
    settings: WhiteboardSettings,
}

impl HttpWhiteboard {
    pub fn new(settings: WhiteboardSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }

    fn sdk_token(&self) -> Result<&str, WhiteboardError> {
        if self.settings.sdk_token.is_empty() {
            return Err(WhiteboardError::NotConfigured);
        }
        Ok(&self.settings.sdk_token)
    }
}

#[async_trait]
impl WhiteboardService for HttpWhiteboard {
    fn app_id(&self) -> &str {
        &self.settings.app_id
    }

    async fn create_room(&self) -> Result<String, WhiteboardError> {
        let resp = self
            .client
            .post(format!("{}/rooms", self.settings.endpoint))
            .header("token", self.sdk_token()?)
            .json(&CreateRoomRequest { is_record: false })
            .send()
            .await?
            .error_for_status()?
            .json::<CreateRoomResponse>()
            .await?;
        debug!(room_id = %resp.uuid, "Whiteboard room created");
        Ok(resp.uuid)
    }

    async fn fetch_room_token(&self, room_id: &str) -> Result<String, WhiteboardError> {
        let token = self
            .client
            .post(format!(
                "{}/tokens/rooms/{}",
                self.settings.endpoint,
                urlencoding::encode(room_id)
            ))
            .header("token", self.sdk_token()?)
            .json(&RoomTokenRequest {
                lifespan: self.settings.token_lifespan_secs * 1000,
                role: "writer",
            })
            .send()
            .await?
            .error_for_status()?
            .json::<String>()
            .await?;
        Ok(token)
    }
}

/// Offline stand-in that mints random IDs and tokens.
pub struct FakeWhiteboard {
    app_id: String,
}

impl FakeWhiteboard {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }
}

#[async_trait]
impl WhiteboardService for FakeWhiteboard {
    fn app_id(&self) -> &str {
        &self.app_id
    }

    async fn create_room(&self) -> Result<String, WhiteboardError> {
        Ok(uuid::Uuid::new_v4().simple().to_string())
    }

    async fn fetch_room_token(&self, room_id: &str) -> Result<String, WhiteboardError> {
        Ok(format!("wb-token-{room_id}-{}", uuid::Uuid::new_v4().simple()))
    }
}
