use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use liveroom_api::{
    build_router,
    state::{AppState, Backends},
};
use liveroom_config::{Backend, BusBackend, Settings};
use liveroom_services::{
    AuthService,
    activity::MemoryActivity,
    events::MemoryBus,
    media::InMemoryMedia,
    roles::StaticRoles,
    store::MemoryStore,
    whiteboard::FakeWhiteboard,
};
use tokio::net::TcpListener;

/// A running test application backed by the in-memory store and bus.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub settings: Settings,
    pub client: reqwest::Client,
    pub auth: AuthService,
    pub roles: Arc<StaticRoles>,
    pub media: Arc<InMemoryMedia>,
    pub activity: Arc<MemoryActivity>,
}

impl TestApp {
    /// Spawn a new test server on a random port.
    ///
    /// `s1`, `s2` and `s3` are registered as learners; everyone else is a teacher.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn a test server after letting `mutator` swap out any backend,
    /// e.g. a bus that refuses to publish.
    pub async fn spawn_with(mutator: impl FnOnce(&mut Backends)) -> Self {
        let mut settings = Settings::load().unwrap_or_else(|_| test_settings());
        settings.storage.backend = Backend::Memory;
        settings.bus.backend = BusBackend::Memory;
        settings.live_room.max_streaming_learners = 2;

        let roles = Arc::new(StaticRoles::new());
        for learner in ["s1", "s2", "s3"] {
            roles.add_learner(learner);
        }
        let media = Arc::new(InMemoryMedia::new());
        let activity = Arc::new(MemoryActivity::new());

        let mut backends = Backends {
            store: Arc::new(MemoryStore::new()),
            roles: roles.clone(),
            media: media.clone(),
            activity: activity.clone(),
            whiteboard: Arc::new(FakeWhiteboard::new("test-app-id")),
            bus: Arc::new(MemoryBus::new(settings.bus.memory_capacity)),
        };
        mutator(&mut backends);

        let app_state = AppState::new(settings.clone(), backends);
        app_state
            .spawn_consumer()
            .await
            .expect("Failed to subscribe event consumer");
        let app = build_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = format!("http://{}", addr);
        let client = reqwest::Client::new();
        let auth = AuthService::new(settings.jwt.clone());

        Self {
            addr,
            base_url,
            settings,
            client,
            auth,
            roles,
            media,
            activity,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Mints an access token for `user_id`.
    pub fn token(&self, user_id: &str) -> String {
        self.auth
            .generate_access_token(user_id)
            .expect("Failed to mint access token")
    }

    /// Retries `check` until it passes; the join consumer runs in the background.
    pub async fn eventually<F, Fut>(&self, mut check: F)
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..50 {
            if check().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("condition not reached in time");
    }
}

fn test_settings() -> Settings {
    Settings {
        app: liveroom_config::AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        },
        storage: liveroom_config::StorageSettings {
            backend: Backend::Memory,
        },
        database: liveroom_config::DatabaseSettings {
            url: "mongodb://localhost:27017".to_string(),
            name: "liveroom_test".to_string(),
            max_pool_size: Some(5),
            min_pool_size: Some(1),
        },
        jwt: liveroom_config::JwtSettings {
            secret: "test-secret-key-for-jwt-signing-minimum-32-chars".to_string(),
            access_token_ttl_secs: 3600,
            issuer: "liveroom".to_string(),
        },
        redis: liveroom_config::RedisSettings {
            url: "redis://127.0.0.1:6379".to_string(),
        },
        bus: liveroom_config::BusSettings {
            backend: BusBackend::Memory,
            subject: "LiveRoom.Updated".to_string(),
            consumer_group: "liveroom-test".to_string(),
            memory_capacity: 256,
        },
        whiteboard: liveroom_config::WhiteboardSettings {
            app_id: "test-app-id".to_string(),
            endpoint: "http://localhost:9".to_string(),
            sdk_token: String::new(),
            token_lifespan_secs: 0,
        },
        live_room: liveroom_config::LiveRoomSettings {
            max_streaming_learners: 2,
        },
    }
}
