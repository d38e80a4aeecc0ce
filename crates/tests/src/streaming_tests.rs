use crate::fixtures::test_app::TestApp;
use serde_json::Value;

async fn call(app: &TestApp, channel_id: &str, action: &str, user_id: &str) -> String {
    let resp = app
        .auth_post(
            &format!("/api/live-room/{}/{}", channel_id, action),
            &app.token(user_id),
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    json["status"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn upstream_slots_are_capped_per_channel() {
    let app = TestApp::spawn().await;
    assert_eq!(app.settings.live_room.max_streaming_learners, 2);
    let room = app.join("stream-room", "t1").await;
    let c1 = room.channel_id.as_str();

    assert_eq!(call(&app, c1, "publish", "s1").await, "NONE");
    assert_eq!(call(&app, c1, "publish", "s1").await, "PREPARED_BEFORE");
    assert_eq!(call(&app, c1, "publish", "s2").await, "NONE");
    assert_eq!(call(&app, c1, "publish", "s3").await, "REACHED_MAX_UPSTREAM_LIMIT");

    assert_eq!(call(&app, c1, "unpublish", "s1").await, "NONE");
    assert_eq!(call(&app, c1, "unpublish", "s1").await, "UNPUBLISHED_BEFORE");
    assert_eq!(call(&app, c1, "publish", "s3").await, "NONE");
}

#[tokio::test]
async fn slots_are_independent_between_channels() {
    let app = TestApp::spawn().await;
    let a = app.join("stream-a", "t1").await;
    let b = app.join("stream-b", "t1").await;

    assert_eq!(call(&app, &a.channel_id, "publish", "s1").await, "NONE");
    assert_eq!(call(&app, &a.channel_id, "publish", "s2").await, "NONE");
    assert_eq!(call(&app, &b.channel_id, "publish", "s3").await, "NONE");
}
