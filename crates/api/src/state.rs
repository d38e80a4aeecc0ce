use std::sync::Arc;
use std::time::Duration;

use liveroom_config::{Backend, BusBackend, Settings};
use liveroom_db::{connect, indexes::ensure_indexes};
use liveroom_services::{
    AuthService, Dispatcher, LiveRoomService, StateReader,
    activity::{ActivitySink, MemoryActivity},
    dao::{live_room_log::LiveRoomLogDao, media::MediaDao},
    events::{EventBus, EventPublisher, LiveRoomEventConsumer, MemoryBus, RedisBus},
    liveroom::HookRunner,
    media::{InMemoryMedia, MediaLookup},
    roles::{RoleResolver, StaticRoles, StudentRoles},
    store::{LiveRoomStore, MemoryStore, MongoStore},
    whiteboard::{FakeWhiteboard, HttpWhiteboard, WhiteboardService},
};
use tracing::{info, warn};

/// The pluggable collaborators behind the live-room services.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn LiveRoomStore>,
    pub roles: Arc<dyn RoleResolver>,
    pub media: Arc<dyn MediaLookup>,
    pub activity: Arc<dyn ActivitySink>,
    pub whiteboard: Arc<dyn WhiteboardService>,
    pub bus: Arc<dyn EventBus>,
}

impl Backends {
    /// Builds the backends selected by `storage.backend` and `bus.backend`.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let (store, roles, media, activity): (
            Arc<dyn LiveRoomStore>,
            Arc<dyn RoleResolver>,
            Arc<dyn MediaLookup>,
            Arc<dyn ActivitySink>,
        ) = match settings.storage.backend {
            Backend::Mongo => {
                let (client, db) = connect(settings).await?;
                ensure_indexes(&db).await?;
                (
                    Arc::new(MongoStore::new(client, &db)),
                    Arc::new(StudentRoles::new(&db)),
                    Arc::new(MediaDao::new(&db)),
                    Arc::new(LiveRoomLogDao::new(&db)),
                )
            }
            Backend::Memory => {
                warn!("Using in-memory storage; state is lost on restart");
                (
                    Arc::new(MemoryStore::new()),
                    Arc::new(StaticRoles::new()),
                    Arc::new(InMemoryMedia::new()),
                    Arc::new(MemoryActivity::new()),
                )
            }
        };

        let bus: Arc<dyn EventBus> = match settings.bus.backend {
            BusBackend::Redis => Arc::new(
                RedisBus::connect(&settings.redis.url, &settings.bus.consumer_group).await?,
            ),
            BusBackend::Memory => Arc::new(MemoryBus::new(settings.bus.memory_capacity)),
        };

        let whiteboard: Arc<dyn WhiteboardService> = if settings.whiteboard.sdk_token.is_empty() {
            warn!("No whiteboard SDK token configured; using offline whiteboard");
            Arc::new(FakeWhiteboard::new(settings.whiteboard.app_id.clone()))
        } else {
            Arc::new(HttpWhiteboard::new(settings.whiteboard.clone()))
        };

        Ok(Self {
            store,
            roles,
            media,
            activity,
            whiteboard,
            bus,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub dispatcher: Dispatcher,
    pub reader: StateReader,
    pub live_rooms: LiveRoomService,
    pub publisher: EventPublisher,
    pub consumer: LiveRoomEventConsumer,
}

impl AppState {
    pub fn new(settings: Settings, backends: Backends) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let publisher = EventPublisher::new(backends.bus, settings.bus.subject.clone());
        let hooks = HookRunner::new(backends.activity, publisher.clone());
        let dispatcher = Dispatcher::new(
            backends.store.clone(),
            backends.roles.clone(),
            hooks.clone(),
        );
        let reader = StateReader::new(backends.store.clone(), backends.media, hooks.clone());
        let live_rooms = LiveRoomService::new(
            backends.store.clone(),
            backends.roles,
            backends.whiteboard,
            publisher.clone(),
            hooks,
            dispatcher.clone(),
            settings.live_room.max_streaming_learners,
        );
        let consumer = LiveRoomEventConsumer::new(backends.store);

        Self {
            settings,
            auth,
            dispatcher,
            reader,
            live_rooms,
            publisher,
            consumer,
        }
    }

    /// Subscribes the join-event consumer and keeps it running in the
    /// background, resubscribing when the bus drops it.
    pub async fn spawn_consumer(&self) -> anyhow::Result<()> {
        let stream = self.publisher.subscribe().await?;
        let consumer = self.consumer.clone();
        tokio::spawn(consumer.supervise(
            self.publisher.clone(),
            stream,
            Duration::from_millis(500),
        ));
        info!(subject = %self.publisher.subject(), "Event consumer subscribed");
        Ok(())
    }
}
