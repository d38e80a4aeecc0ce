use liveroom_api::{
    build_router,
    state::{AppState, Backends},
};
use liveroom_config::Settings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (silently ignore if missing)
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "liveroom_api=debug,liveroom_services=debug,liveroom_db=debug,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let settings = Settings::load()?;
    info!("Starting live room API on {}:{}", settings.app.host, settings.app.port);
    info!(
        storage = ?settings.storage.backend,
        bus = ?settings.bus.backend,
        subject = %settings.bus.subject,
        max_streaming_learners = settings.live_room.max_streaming_learners,
        "Live room config"
    );

    // Storage, bus and external collaborators
    let backends = Backends::from_settings(&settings).await?;

    let app_state = AppState::new(settings.clone(), backends);
    app_state.spawn_consumer().await?;

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
