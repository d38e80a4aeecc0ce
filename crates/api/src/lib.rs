pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let live_room_routes = Router::new()
        .route("/join", post(routes::live_room::join))
        .route("/leave", post(routes::live_room::leave))
        .route("/end", post(routes::live_room::end))
        .route(
            "/{channel_id}/state",
            get(routes::live_room::get_state).post(routes::live_room::modify_state),
        )
        .route("/{channel_id}/poll", get(routes::live_room::list_polls))
        .route("/{channel_id}/publish", post(routes::live_room::prepare_publish))
        .route("/{channel_id}/unpublish", post(routes::live_room::unpublish));

    let api = Router::new().nest("/live-room", live_room_routes);

    // Health check
    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
