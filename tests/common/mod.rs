//! Common test utilities and helpers
//!
//! - `TestApp`: the full router over a fresh in-memory database, or over a
//!   file-backed pool for tests that need real concurrent connections
//! - Authentication helpers for registering users and building headers
//! - Assertion macros for JSON error bodies

#![allow(dead_code)]

pub mod assertions;
pub mod auth_helpers;

pub use auth_helpers::*;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

use duochat::backend::realtime::{ConnectionHandle, Session, SessionContext};
use duochat::backend::server::{
    build_app,
    config::{connect_in_memory, load_database},
    App, AppState,
};
use duochat::shared::config::AppConfigBuilder;
use duochat::shared::{AppConfig, ServerEvent, WsConfig};

pub const TEST_SECRET: &str = "integration-test-secret";

fn base_config() -> AppConfigBuilder {
    AppConfig::builder()
        .database_url("sqlite::memory:")
        .jwt_secret(TEST_SECRET)
        .password_hash_cost(4)
}

/// Full application wired to a migrated SQLite pool
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_join_token(true).await
    }

    pub async fn with_join_token(required: bool) -> Self {
        Self::in_memory(base_config().require_join_token(required)).await
    }

    /// In-memory app with custom live channel timings
    pub async fn with_ws(ws: WsConfig) -> Self {
        Self::in_memory(base_config().ws(ws)).await
    }

    /// App over a SQLite file in `dir`, pooled like production
    pub async fn file_backed(dir: &Path, max_connections: u32) -> Self {
        let url = format!("sqlite://{}", dir.join("duochat.db").display());
        let config = base_config()
            .database_url(url)
            .db_max_connections(max_connections)
            .build()
            .expect("test config is valid");
        let pool = load_database(&config).await.expect("file database");
        let App { router, state } = build_app(config, pool);
        Self { router, state }
    }

    async fn in_memory(builder: AppConfigBuilder) -> Self {
        let config = builder.build().expect("test config is valid");
        let pool = connect_in_memory().await.expect("in-memory database");
        let App { router, state } = build_app(config, pool);
        Self { router, state }
    }

    /// Serve the router on an ephemeral local port
    pub async fn serve(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("test server");
        });
        addr
    }

    /// Wait until the registry holds `expected` connections
    pub async fn wait_for_connections(&self, expected: usize, within: Duration) {
        let registry = &self.state.registry;
        let polled = tokio::time::timeout(within, async {
            while registry.connection_count() != expected {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        assert!(
            polled.is_ok(),
            "expected {} connections, found {}",
            expected,
            registry.connection_count()
        );
    }

    /// Send one request and decode the JSON body (`Value::Null` when empty)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, auth_header(token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON response body")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    /// A live-channel session sharing this app's registry and dispatcher
    pub fn open_session(&self) -> (Session, UnboundedReceiver<ServerEvent>) {
        let context = SessionContext {
            registry: self.state.registry.clone(),
            dispatcher: self.state.dispatcher.clone(),
            tokens: self.state.tokens.clone(),
            require_join_token: self.state.config.ws.require_join_token,
        };
        let (handle, events) = ConnectionHandle::channel();
        (Session::new(handle, context), events)
    }
}
