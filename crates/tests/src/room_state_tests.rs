use crate::fixtures::{seed::user_state, test_app::TestApp};
use liveroom_db::models::MediaType;
use serde_json::json;

#[tokio::test]
async fn fresh_channel_reads_default_snapshot() {
    let app = TestApp::spawn().await;

    let state = app.room_state("never-used", "t1").await;
    assert_eq!(state["channel_id"], "never-used");
    assert!(state["current_material"].is_null());
    assert!(state["spotlighted_user"].is_null());
    assert!(state["current_polling"].is_null());
    assert!(state["recording"].is_null());
    assert!(state["session_time"].is_null());
    assert_eq!(state["whiteboard_zoom_state"]["pdf_scale_ratio"], 100.0);
    assert_eq!(state["whiteboard_zoom_state"]["center_x"], 0.0);
    assert_eq!(state["users"], json!([]));
    assert!(state["current_time"].is_string());
}

#[tokio::test]
async fn spotlight_set_then_cleared_reads_back_empty() {
    let app = TestApp::spawn().await;
    let room = app.join("spotlight-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "t1", json!({ "type": "set_spotlight", "user_id": "s1" }))
        .await;
    assert_eq!(app.room_state(c1, "t1").await["spotlighted_user"], "s1");

    app.command_ok(c1, "t1", json!({ "type": "clear_spotlight" })).await;
    assert!(app.room_state(c1, "t1").await["spotlighted_user"].is_null());
}

#[tokio::test]
async fn member_flags_are_grouped_per_user() {
    let app = TestApp::spawn().await;
    let room = app.join("flags-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "t1", json!({ "type": "disable_chat", "user_ids": ["s1", "s2"] }))
        .await;
    app.command_ok(c1, "t1", json!({ "type": "enable_annotation", "user_ids": ["s1"] }))
        .await;
    app.command_ok(c1, "s1", json!({ "type": "raise_hand" })).await;
    app.command_ok(c1, "s2", json!({ "type": "raise_hand" })).await;
    app.command_ok(c1, "t1", json!({ "type": "fold_user_hand", "user_id": "s2" }))
        .await;

    let state = app.room_state(c1, "t1").await;
    let s1 = user_state(&state, "s1").unwrap();
    assert_eq!(s1["chat"]["value"], false);
    assert_eq!(s1["annotation"]["value"], true);
    assert_eq!(s1["hands_up"]["value"], true);
    assert!(s1["hands_up"]["updated_at"].is_string());
    let s2 = user_state(&state, "s2").unwrap();
    assert_eq!(s2["hands_up"]["value"], false);
    assert!(s2["annotation"].is_null());

    app.command_ok(c1, "t1", json!({ "type": "fold_all_hands" })).await;
    app.command_ok(c1, "t1", json!({ "type": "disable_all_annotation" }))
        .await;
    let state = app.room_state(c1, "t1").await;
    let s1 = user_state(&state, "s1").unwrap();
    assert_eq!(s1["hands_up"]["value"], false);
    assert_eq!(s1["annotation"]["value"], false);
}

#[tokio::test]
async fn empty_user_list_is_rejected() {
    let app = TestApp::spawn().await;
    let room = app.join("empty-users-room", "t1").await;

    let resp = app
        .command(
            &room.channel_id,
            "t1",
            json!({ "type": "enable_chat", "user_ids": [] }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn shared_material_is_resolved_with_playback() {
    let app = TestApp::spawn().await;
    app.seed_media("v1", MediaType::Video);
    let room = app.join("video-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(
        c1,
        "t1",
        json!({
            "type": "share_material",
            "media_id": "v1",
            "playback": { "kind": "video", "current_time_ms": 1500, "player_state": "playing" }
        }),
    )
    .await;

    let material = &app.room_state(c1, "s1").await["current_material"];
    assert_eq!(material["media_id"], "v1");
    assert_eq!(material["media_type"], "video");
    assert_eq!(material["resource"], "https://cdn.example.com/v1");
    assert_eq!(material["playback"]["kind"], "video");
    assert_eq!(material["playback"]["current_time_ms"], 1500);
    assert_eq!(material["playback"]["player_state"], "playing");
}

#[tokio::test]
async fn unknown_shared_material_fails_the_read() {
    let app = TestApp::spawn().await;
    let room = app.join("missing-media-room", "t1").await;

    app.command_ok(
        &room.channel_id,
        "t1",
        json!({ "type": "share_material", "media_id": "ghost" }),
    )
    .await;

    let resp = app
        .auth_get(
            &format!("/api/live-room/{}/state", room.channel_id),
            &app.token("t1"),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 500);
}

#[tokio::test]
async fn whiteboard_zoom_and_session_time_are_stored() {
    let app = TestApp::spawn().await;
    let room = app.join("zoom-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(
        c1,
        "t1",
        json!({
            "type": "update_whiteboard_zoom_state",
            "pdf_scale_ratio": 150.0,
            "center_x": 10.5,
            "center_y": -4.0,
            "pdf_width": 800.0,
            "pdf_height": 600.0
        }),
    )
    .await;
    app.command_ok(c1, "t1", json!({ "type": "upsert_session_time" })).await;

    let state = app.room_state(c1, "t1").await;
    assert_eq!(state["whiteboard_zoom_state"]["pdf_scale_ratio"], 150.0);
    assert_eq!(state["whiteboard_zoom_state"]["center_x"], 10.5);
    assert!(state["session_time"].is_string());
}

#[tokio::test]
async fn recording_can_only_be_stopped_by_its_creator() {
    let app = TestApp::spawn().await;
    let room = app.join("recording-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "t1", json!({ "type": "request_recording" })).await;
    // A second request while recording keeps the original creator
    app.command_ok(c1, "t2", json!({ "type": "request_recording" })).await;
    let state = app.room_state(c1, "t1").await;
    assert_eq!(state["recording"]["is_recording"], true);
    assert_eq!(state["recording"]["creator"], "t1");

    app.command_ok(c1, "t2", json!({ "type": "stop_recording" })).await;
    assert_eq!(app.room_state(c1, "t1").await["recording"]["is_recording"], true);

    app.command_ok(c1, "t1", json!({ "type": "stop_recording" })).await;
    let state = app.room_state(c1, "t1").await;
    assert_eq!(state["recording"]["is_recording"], false);
    assert!(state["recording"]["creator"].is_null());
}

#[tokio::test]
async fn reads_and_writes_are_counted_in_the_activity_log() {
    let app = TestApp::spawn().await;
    let room = app.join("activity-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "t1", json!({ "type": "upsert_session_time" })).await;
    app.command_ok(c1, "t1", json!({ "type": "clear_spotlight" })).await;
    app.room_state(c1, "t1").await;

    let log = app.activity.open_log(c1).unwrap();
    assert_eq!(log.total_times_updating_room_state, 2);
    assert_eq!(log.total_times_getting_room_state, 1);
    assert_eq!(log.attendee_ids, vec!["t1".to_string()]);
}
