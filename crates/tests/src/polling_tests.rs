use crate::fixtures::{seed::user_state, test_app::TestApp};
use serde_json::{Value, json};

fn start_polling() -> Value {
    json!({
        "type": "start_polling",
        "question": "Which are vowels?",
        "options": [
            { "answer": "A", "is_correct": true },
            { "answer": "B", "is_correct": false },
            { "answer": "C", "is_correct": false }
        ]
    })
}

fn submit(answers: &[&str]) -> Value {
    json!({ "type": "submit_polling_answer", "answers": answers })
}

#[tokio::test]
async fn poll_lifecycle_records_one_historical_poll() {
    let app = TestApp::spawn().await;
    let room = app.join("poll-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "t1", start_polling()).await;
    app.command_ok(c1, "s1", submit(&["A", "B"])).await;
    app.command_ok(c1, "s2", submit(&["A"])).await;

    let state = app.room_state(c1, "t1").await;
    assert_eq!(state["current_polling"]["status"], "started");
    assert_eq!(
        user_state(&state, "s1").unwrap()["polling_answer"]["answers"],
        json!(["A", "B"])
    );

    app.command_ok(c1, "t1", json!({ "type": "stop_polling" })).await;
    app.command_ok(c1, "t1", json!({ "type": "end_polling" })).await;

    let state = app.room_state(c1, "t1").await;
    assert!(state["current_polling"].is_null());
    assert_eq!(
        user_state(&state, "s1").unwrap()["polling_answer"]["answers"],
        json!([])
    );

    let polls = app.polls(c1, "t1").await;
    assert_eq!(polls.len(), 1);
    let answers = polls[0]["students_answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    let s1 = answers.iter().find(|a| a["user_id"] == "s1").unwrap();
    assert_eq!(s1["answers"], json!(["A", "B"]));
    let s2 = answers.iter().find(|a| a["user_id"] == "s2").unwrap();
    assert_eq!(s2["answers"], json!(["A"]));
    assert!(polls[0]["stopped_at"].is_string());
}

#[tokio::test]
async fn resubmitted_answer_overwrites_previous_one() {
    let app = TestApp::spawn().await;
    let room = app.join("resubmit-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "t1", start_polling()).await;
    app.command_ok(c1, "s1", submit(&["C"])).await;
    app.command_ok(c1, "s1", submit(&["A"])).await;
    app.command_ok(c1, "t1", json!({ "type": "stop_polling" })).await;
    app.command_ok(c1, "t1", json!({ "type": "end_polling" })).await;

    let polls = app.polls(c1, "t1").await;
    assert_eq!(polls[0]["students_answers"][0]["answers"], json!(["A"]));
}

#[tokio::test]
async fn polling_transitions_are_enforced() {
    let app = TestApp::spawn().await;
    let room = app.join("transition-room", "t1").await;
    let c1 = room.channel_id.as_str();

    // Nothing to stop, end or share yet
    for command in [
        json!({ "type": "stop_polling" }),
        json!({ "type": "end_polling" }),
        json!({ "type": "share_polling", "is_shared": true }),
    ] {
        let resp = app.command(c1, "t1", command).await;
        assert_eq!(resp.status().as_u16(), 404);
    }

    app.command_ok(c1, "t1", start_polling()).await;

    // A second poll cannot start while one exists
    let resp = app.command(c1, "t1", start_polling()).await;
    assert_eq!(resp.status().as_u16(), 409);

    // Ending requires a stopped poll
    let resp = app.command(c1, "t1", json!({ "type": "end_polling" })).await;
    assert_eq!(resp.status().as_u16(), 409);

    app.command_ok(c1, "t1", json!({ "type": "stop_polling" })).await;

    // Answers are closed once stopped
    let resp = app.command(c1, "s1", submit(&["A"])).await;
    assert_eq!(resp.status().as_u16(), 409);

    app.command_ok(c1, "t1", json!({ "type": "share_polling", "is_shared": true }))
        .await;
    let state = app.room_state(c1, "t1").await;
    assert_eq!(state["current_polling"]["is_shared"], true);
}

#[tokio::test]
async fn answers_outside_the_options_are_rejected() {
    let app = TestApp::spawn().await;
    let room = app.join("invalid-answer-room", "t1").await;
    let c1 = room.channel_id.as_str();

    app.command_ok(c1, "t1", start_polling()).await;
    let resp = app.command(c1, "s1", submit(&["Z"])).await;
    assert_eq!(resp.status().as_u16(), 422);

    let resp = app.command(c1, "s1", submit(&["A", "A"])).await;
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn poll_needs_at_least_two_distinct_options() {
    let app = TestApp::spawn().await;
    let room = app.join("bad-options-room", "t1").await;

    let resp = app
        .command(
            &room.channel_id,
            "t1",
            json!({
                "type": "start_polling",
                "options": [{ "answer": "A", "is_correct": true }]
            }),
        )
        .await;
    assert_eq!(resp.status().as_u16(), 422);
}

#[tokio::test]
async fn racing_teachers_start_a_single_poll() {
    let app = TestApp::spawn().await;
    let room = app.join("race-room", "t1").await;
    let c1 = room.channel_id.as_str();

    let responses = futures::future::join_all(
        ["t1", "t2", "t1", "t2"].map(|teacher| app.command(c1, teacher, start_polling())),
    )
    .await;
    let mut statuses: Vec<u16> = responses.iter().map(|r| r.status().as_u16()).collect();
    statuses.sort();
    assert_eq!(statuses, vec![200, 409, 409, 409]);

    let state = app.room_state(c1, "t1").await;
    assert_eq!(state["current_polling"]["status"], "started");
}
