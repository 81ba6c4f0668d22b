//! Authentication test helpers
//!
//! Registers users through the real endpoint so tokens and password hashes
//! go through the same path as production.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use super::TestApp;

/// A registered user and their bearer token
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

pub const TEST_PASSWORD: &str = "correct horse battery";

/// Register `name` with an email derived from it
pub async fn register_user(app: &TestApp, name: &str) -> TestUser {
    let email = format!("{}@example.com", name.to_lowercase());
    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({"name": name, "email": email, "password": TEST_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

    TestUser {
        id: body["user"]["id"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .expect("user id in register response"),
        name: name.to_string(),
        email,
        password: TEST_PASSWORD.to_string(),
        token: body["token"].as_str().expect("token in register response").to_string(),
    }
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

/// JSON `join` frame carrying the user's token
pub fn join_frame(user: &TestUser) -> String {
    json!({"type": "join", "userId": user.id, "token": user.token}).to_string()
}

/// JSON `message` frame
pub fn message_frame(to: &TestUser, content: &str) -> String {
    json!({"type": "message", "recipientId": to.id, "content": content}).to_string()
}
