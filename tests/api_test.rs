//! REST API integration tests
//!
//! Drive the full router (auth middleware, handlers, SQLite) with
//! `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{auth_header, register_user, TestApp, TEST_PASSWORD};

fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("array body")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}

// ========== Auth ==========

#[tokio::test]
async fn test_register_returns_token_and_user() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/register",
            None,
            json!({"name": "Ada", "email": "ada@example.com", "password": TEST_PASSWORD}),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["name"], "Ada");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_is_rejected() {
    let app = TestApp::new().await;
    register_user(&app, "Ada").await;

    let body = assert_error_response!(
        app.post(
            "/api/register",
            None,
            json!({"name": "Other", "email": "ADA@example.com", "password": TEST_PASSWORD}),
        )
        .await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new().await;

    assert_error_response!(
        app.post("/api/register", None, json!({"name": "Ada", "email": "ada@example.com"}))
            .await,
        StatusCode::BAD_REQUEST
    );
    assert_error_response!(
        app.post(
            "/api/register",
            None,
            json!({"name": "Ada", "email": "not-an-email", "password": TEST_PASSWORD}),
        )
        .await,
        StatusCode::BAD_REQUEST
    );
    assert_error_response!(
        app.post(
            "/api/register",
            None,
            json!({"name": "Ada", "email": "ada@example.com", "password": "short"}),
        )
        .await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_login() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;

    let (status, body) = app
        .post(
            "/api/login",
            None,
            json!({"email": ada.email, "password": ada.password}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], json!(ada.id));

    // The fresh token works on a protected route
    let token = body["token"].as_str().unwrap();
    let (status, _) = app.get("/api/profile", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;

    let wrong_password = assert_error_response!(
        app.post(
            "/api/login",
            None,
            json!({"email": ada.email, "password": "not the password"}),
        )
        .await,
        StatusCode::UNAUTHORIZED
    );
    let unknown_email = assert_error_response!(
        app.post(
            "/api/login",
            None,
            json!({"email": "nobody@example.com", "password": TEST_PASSWORD}),
        )
        .await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(wrong_password["error"], unknown_email["error"]);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new().await;

    for uri in [
        "/api/profile",
        "/api/friends",
        "/api/conversations",
        "/api/unread-messages",
        "/api/users?search=a",
    ] {
        assert_error_response!(app.get(uri, None).await, StatusCode::UNAUTHORIZED);
        assert_error_response!(app.get(uri, Some("garbage")).await, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let foreign = duochat::backend::auth::TokenService::new("another-secret", 3600)
        .create_token(ada.id, &ada.email, &ada.name)
        .unwrap();

    assert_error_response!(
        app.get("/api/profile", Some(&foreign)).await,
        StatusCode::UNAUTHORIZED
    );
}

// ========== Profile ==========

#[tokio::test]
async fn test_profile_update() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;

    let (status, body) = app
        .post(
            "/api/profile",
            Some(&ada.token),
            json!({"description": "Countess", "avatar": "https://example.com/ada.png"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["description"], "Countess");

    // Omitted fields are left alone
    app.post("/api/profile", Some(&ada.token), json!({"description": "Analyst"}))
        .await;
    let (_, profile) = app.get("/api/profile", Some(&ada.token)).await;
    assert_eq!(profile["description"], "Analyst");
    assert_eq!(profile["avatar"], "https://example.com/ada.png");

    assert_error_response!(
        app.post("/api/profile", Some(&ada.token), json!({"avatar": "ftp://nope"}))
            .await,
        StatusCode::BAD_REQUEST
    );
}

// ========== Users and friends ==========

#[tokio::test]
async fn test_search_users_excludes_caller() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let adam = register_user(&app, "Adam").await;
    register_user(&app, "Bob").await;

    let (status, body) = app.get("/api/users?search=ad", Some(&ada.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![adam.id.to_string()]);
}

#[tokio::test]
async fn test_friends() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let bob = register_user(&app, "Bob").await;

    let (status, body) = app
        .post("/api/friends", Some(&ada.token), json!({"userId": bob.id}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Bob");

    let again = assert_error_response!(
        app.post("/api/friends", Some(&ada.token), json!({"userId": bob.id}))
            .await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(again["error"], "Already a friend");

    assert_error_response!(
        app.post("/api/friends", Some(&ada.token), json!({"userId": ada.id}))
            .await,
        StatusCode::BAD_REQUEST
    );
    assert_error_response!(
        app.post(
            "/api/friends",
            Some(&ada.token),
            json!({"userId": uuid::Uuid::new_v4()}),
        )
        .await,
        StatusCode::NOT_FOUND
    );

    let (_, friends) = app.get("/api/friends", Some(&ada.token)).await;
    assert_eq!(ids(&friends), vec![bob.id.to_string()]);

    // One-directional
    let (_, friends) = app.get("/api/friends", Some(&bob.token)).await;
    assert!(ids(&friends).is_empty());
}

// ========== Conversations ==========

#[tokio::test]
async fn test_start_conversation_is_idempotent_across_directions() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let bob = register_user(&app, "Bob").await;

    let (status, first) = app
        .post(
            "/api/conversations",
            Some(&ada.token),
            json!({"participantId": bob.id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["participants"].as_array().unwrap().len(), 2);

    let (status, second) = app
        .post(
            "/api/conversations",
            Some(&bob.token),
            json!({"participantId": ada.id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["id"], second["id"]);

    let (_, list) = app.get("/api/conversations", Some(&ada.token)).await;
    assert_eq!(ids(&list), vec![first["id"].as_str().unwrap().to_string()]);
}

#[tokio::test]
async fn test_start_conversation_rejections() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;

    assert_error_response!(
        app.post(
            "/api/conversations",
            Some(&ada.token),
            json!({"participantId": ada.id}),
        )
        .await,
        StatusCode::BAD_REQUEST
    );
    assert_error_response!(
        app.post("/api/conversations", Some(&ada.token), json!({})).await,
        StatusCode::BAD_REQUEST
    );
    assert_error_response!(
        app.post(
            "/api/conversations",
            Some(&ada.token),
            json!({"participantId": uuid::Uuid::new_v4()}),
        )
        .await,
        StatusCode::NOT_FOUND
    );
}

// ========== Messages ==========

#[tokio::test]
async fn test_send_and_read_history() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let bob = register_user(&app, "Bob").await;

    for text in ["one", "two", "three"] {
        let (status, body) = app
            .post(
                "/api/messages",
                Some(&ada.token),
                json!({"friendId": bob.id, "message": text}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["sender"]["id"], json!(ada.id));
        assert_eq!(body["read"], false);
    }

    let uri = format!("/api/messages?friendId={}", ada.id);
    let (status, history) = app.get(&uri, Some(&bob.token)).await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<&str> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["one", "two", "three"]);

    let (_, conversations) = app.get("/api/conversations", Some(&bob.token)).await;
    assert_eq!(conversations[0]["unreadCount"], 3);
}

#[tokio::test]
async fn test_history_without_conversation_is_empty() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let bob = register_user(&app, "Bob").await;

    let uri = format!("/api/messages?friendId={}", bob.id);
    let (status, body) = app.get(&uri, Some(&ada.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    assert_error_response!(
        app.get("/api/messages", Some(&ada.token)).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_send_message_validation() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let bob = register_user(&app, "Bob").await;

    assert_error_response!(
        app.post(
            "/api/messages",
            Some(&ada.token),
            json!({"friendId": bob.id, "message": "   "}),
        )
        .await,
        StatusCode::BAD_REQUEST
    );
    assert_error_response!(
        app.post(
            "/api/messages",
            Some(&ada.token),
            json!({"friendId": ada.id, "message": "me"}),
        )
        .await,
        StatusCode::BAD_REQUEST
    );
    assert_error_response!(
        app.post(
            "/api/messages",
            Some(&ada.token),
            json!({"friendId": uuid::Uuid::new_v4(), "message": "hi"}),
        )
        .await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_mark_read_only_touches_callers_incoming_messages() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let bob = register_user(&app, "Bob").await;

    let (_, sent) = app
        .post(
            "/api/messages",
            Some(&ada.token),
            json!({"friendId": bob.id, "message": "hello"}),
        )
        .await;
    let message_id = sent["id"].clone();

    // The sender cannot mark their own message
    let (status, body) = app
        .patch(
            "/api/messages/read",
            Some(&ada.token),
            json!({"messageIds": [message_id]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "updated": 0}));

    let (_, unread) = app.get("/api/unread-messages", Some(&bob.token)).await;
    assert_eq!(ids(&unread), vec![message_id.as_str().unwrap().to_string()]);
    assert_eq!(unread[0]["sender"]["name"], "Ada");

    let (_, body) = app
        .patch(
            "/api/messages/read",
            Some(&bob.token),
            json!({"messageIds": [message_id]}),
        )
        .await;
    assert_eq!(body["updated"], 1);

    let (_, unread) = app.get("/api/unread-messages", Some(&bob.token)).await;
    assert_eq!(unread, json!([]));

    assert_error_response!(
        app.patch("/api/messages/read", Some(&bob.token), json!({"messageIds": []}))
            .await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_unread_identity_comes_from_token_not_header() {
    let app = TestApp::new().await;
    let ada = register_user(&app, "Ada").await;
    let bob = register_user(&app, "Bob").await;
    app.post(
        "/api/messages",
        Some(&ada.token),
        json!({"friendId": bob.id, "message": "for bob only"}),
    )
    .await;

    // Without a token the header alone is not enough
    let request = Request::get("/api/unread-messages")
        .header("userId", bob.id.to_string())
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // With Ada's token, naming Bob in the header still yields Ada's inbox
    let request = Request::get("/api/unread-messages")
        .header(header::AUTHORIZATION, auth_header(&ada.token))
        .header("userId", bob.id.to_string())
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let unread: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(unread, json!([]));

    let (_, unread) = app.get("/api/unread-messages", Some(&bob.token)).await;
    assert_eq!(unread[0]["content"], "for bob only");
}

// ========== Misc ==========

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new().await;
    assert_error_response!(app.get("/api/nope", None).await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "connections": 0, "onlineUsers": 0}));
}
