use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub storage: StorageSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub redis: RedisSettings,
    pub bus: BusSettings,
    pub whiteboard: WhiteboardSettings,
    pub live_room: LiveRoomSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

/// Which store the API wires up at startup.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Mongo,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusBackend {
    Redis,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: Backend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub access_token_ttl_secs: u64,
    pub issuer: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusSettings {
    pub backend: BusBackend,
    pub subject: String,
    /// Redis stream consumer group the replicas of this service share.
    pub consumer_group: String,
    /// Capacity of the in-process broadcast channel when `backend = memory`.
    pub memory_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WhiteboardSettings {
    pub app_id: String,
    pub endpoint: String,
    pub sdk_token: String,
    pub token_lifespan_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LiveRoomSettings {
    pub max_streaming_learners: u32,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("LIVEROOM"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("storage.backend", "mongo")?
            .set_default("database.url", "mongodb://localhost:27017/?replicaSet=rs0")?
            .set_default("database.name", "liveroom")?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.access_token_ttl_secs", 3600)?
            .set_default("jwt.issuer", "liveroom")?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("bus.backend", "redis")?
            .set_default("bus.subject", "LiveRoom.Updated")?
            .set_default("bus.consumer_group", "liveroom")?
            .set_default("bus.memory_capacity", 1024)?
            .set_default("whiteboard.app_id", "")?
            .set_default("whiteboard.endpoint", "https://api.netless.link/v5")?
            .set_default("whiteboard.sdk_token", "")?
            .set_default("whiteboard.token_lifespan_secs", 0)?
            .set_default("live_room.max_streaming_learners", 5)?
            .build()?;

        config.try_deserialize()
    }
}
