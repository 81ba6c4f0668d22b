/**
 * Live Channel Routes
 *
 * - `GET /ws` - WebSocket upgrade; identity comes from the `join` frame
 * - `GET /health` - Liveness plus live connection counts
 */

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::backend::realtime::{ws_upgrade, ConnectionRegistry};
use crate::backend::server::state::AppState;

/// Body of `GET /health`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
    pub online_users: usize,
}

pub async fn health(State(registry): State<ConnectionRegistry>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: registry.connection_count(),
        online_users: registry.user_count(),
    })
}

/// Add the live channel routes to `router`
pub fn configure_chat_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/ws", get(ws_upgrade))
        .route("/health", get(health))
}
