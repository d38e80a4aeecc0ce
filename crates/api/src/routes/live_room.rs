use axum::{
    Json,
    extract::{Path, State},
};
use liveroom_services::liveroom::{Command, JoinedRoom, RoomAction};
use serde::Deserialize;
use validator::Validate;

use super::response::{LiveRoomStateResponse, PollResponse, to_poll_response, to_state_response};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    #[validate(length(min = 1, message = "channel_name must not be empty"))]
    pub channel_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChannelRequest {
    #[validate(length(min = 1, message = "channel_id must not be empty"))]
    pub channel_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyStateRequest {
    pub command: RoomAction,
}

pub async fn join(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<JoinRequest>,
) -> Result<Json<JoinedRoom>, ApiError> {
    body.validate()?;
    let joined = state
        .live_rooms
        .join(body.channel_name.trim(), &auth.user_id)
        .await?;
    Ok(Json(joined))
}

pub async fn leave(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChannelRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()?;
    state.live_rooms.leave(&body.channel_id, &auth.user_id).await?;
    Ok(Json(serde_json::json!({ "left": true })))
}

pub async fn end(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ChannelRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    body.validate()?;
    state.live_rooms.end(&body.channel_id, &auth.user_id).await?;
    Ok(Json(serde_json::json!({ "ended": true })))
}

pub async fn modify_state(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(channel_id): Path<String>,
    Json(body): Json<ModifyStateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .dispatcher
        .dispatch(Command::new(channel_id, auth.user_id, body.command))
        .await?;
    Ok(Json(serde_json::json!({ "updated": true })))
}

pub async fn get_state(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(channel_id): Path<String>,
) -> Result<Json<LiveRoomStateResponse>, ApiError> {
    let snapshot = state.reader.get_live_room_state(&channel_id).await?;
    Ok(Json(to_state_response(snapshot)))
}

pub async fn list_polls(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(channel_id): Path<String>,
) -> Result<Json<Vec<PollResponse>>, ApiError> {
    let polls = state.reader.list_polls(&channel_id).await?;
    Ok(Json(polls.into_iter().map(to_poll_response).collect()))
}

pub async fn prepare_publish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(channel_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = state
        .live_rooms
        .prepare_publish(&channel_id, &auth.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "status": status })))
}

pub async fn unpublish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(channel_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let status = state
        .live_rooms
        .unpublish(&channel_id, &auth.user_id)
        .await?;
    Ok(Json(serde_json::json!({ "status": status })))
}
