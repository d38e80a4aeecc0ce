use crate::fixtures::test_app::TestApp;
use liveroom_db::models::MediaType;
use serde_json::json;

#[tokio::test]
async fn learner_cannot_issue_teacher_commands() {
    let app = TestApp::spawn().await;
    let room = app.join("perm-room", "t1").await;
    let c1 = room.channel_id.as_str();

    for command in [
        json!({ "type": "start_polling", "options": [
            { "answer": "A", "is_correct": true },
            { "answer": "B", "is_correct": false }
        ] }),
        json!({ "type": "enable_chat", "user_ids": ["s2"] }),
        json!({ "type": "disable_all_annotation" }),
        json!({ "type": "set_spotlight", "user_id": "s1" }),
        json!({ "type": "fold_all_hands" }),
        json!({ "type": "request_recording" }),
        json!({ "type": "upsert_session_time" }),
    ] {
        let resp = app.command(c1, "s1", command.clone()).await;
        assert_eq!(resp.status().as_u16(), 403, "{command} should be rejected");
    }

    // Nothing was written
    let state = app.room_state(c1, "t1").await;
    assert!(state["current_polling"].is_null());
    assert!(state["spotlighted_user"].is_null());
}

#[tokio::test]
async fn teacher_cannot_issue_learner_commands() {
    let app = TestApp::spawn().await;
    let room = app.join("teacher-hand-room", "t1").await;

    let resp = app
        .command(&room.channel_id, "t1", json!({ "type": "raise_hand" }))
        .await;
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn anyone_can_share_and_stop_sharing_material() {
    let app = TestApp::spawn().await;
    app.seed_media("m1", MediaType::Pdf);
    let room = app.join("material-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "s1", json!({ "type": "share_material", "media_id": "m1" }))
        .await;
    let state = app.room_state(c1, "t1").await;
    assert_eq!(state["current_material"]["media_id"], "m1");

    app.command_ok(c1, "t1", json!({ "type": "stop_sharing_material" }))
        .await;
    let state = app.room_state(c1, "s1").await;
    assert!(state["current_material"].is_null());
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/api/live-room/c1/state"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let resp = app
        .client
        .post(app.url("/api/live-room/c1/state"))
        .header("Authorization", "Bearer not-a-jwt")
        .json(&json!({ "command": { "type": "raise_hand" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn reset_is_not_accepted_over_the_wire() {
    let app = TestApp::spawn().await;
    let room = app.join("reset-wire-room", "t1").await;

    let resp = app
        .command(&room.channel_id, "t1", json!({ "type": "reset_all_states" }))
        .await;
    assert!(resp.status().is_client_error());
}
