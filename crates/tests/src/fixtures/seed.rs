use liveroom_db::models::{Media, MediaType};
use serde_json::Value;

use super::test_app::TestApp;

/// A room joined over HTTP.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub channel_id: String,
    pub whiteboard_room_id: String,
}

impl TestApp {
    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Joins `channel_name` as `user_id`, creating the room on first join.
    pub async fn join(&self, channel_name: &str, user_id: &str) -> JoinedRoom {
        let resp = self
            .auth_post("/api/live-room/join", &self.token(user_id))
            .json(&serde_json::json!({ "channel_name": channel_name }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200, "join failed");
        let json: Value = resp.json().await.unwrap();
        JoinedRoom {
            channel_id: json["channel_id"].as_str().unwrap().to_string(),
            whiteboard_room_id: json["whiteboard_room_id"].as_str().unwrap().to_string(),
        }
    }

    /// Sends one command and returns the raw response.
    pub async fn command(&self, channel_id: &str, user_id: &str, command: Value) -> reqwest::Response {
        self.auth_post(
            &format!("/api/live-room/{}/state", channel_id),
            &self.token(user_id),
        )
        .json(&serde_json::json!({ "command": command }))
        .send()
        .await
        .unwrap()
    }

    /// Sends one command that is expected to succeed.
    pub async fn command_ok(&self, channel_id: &str, user_id: &str, command: Value) {
        let resp = self.command(channel_id, user_id, command.clone()).await;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        assert_eq!(status, 200, "command {command} failed: {body}");
    }

    pub async fn room_state(&self, channel_id: &str, user_id: &str) -> Value {
        let resp = self
            .auth_get(
                &format!("/api/live-room/{}/state", channel_id),
                &self.token(user_id),
            )
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        resp.json().await.unwrap()
    }

    pub async fn polls(&self, channel_id: &str, user_id: &str) -> Vec<Value> {
        let resp = self
            .auth_get(
                &format!("/api/live-room/{}/poll", channel_id),
                &self.token(user_id),
            )
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        resp.json().await.unwrap()
    }

    pub fn seed_media(&self, media_id: &str, media_type: MediaType) {
        self.media.insert(Media::new(
            media_id,
            format!("{media_id}.bin"),
            format!("https://cdn.example.com/{media_id}"),
            media_type,
        ));
    }
}

/// The row of `user_id` in a room-state response.
pub fn user_state<'a>(state: &'a Value, user_id: &str) -> Option<&'a Value> {
    state["users"]
        .as_array()?
        .iter()
        .find(|u| u["user_id"] == user_id)
}
