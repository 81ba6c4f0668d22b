/**
 * Router Configuration
 *
 * Combines the route groups into one Axum router:
 *
 * 1. Live channel routes (`/ws`, `/health`)
 * 2. API routes (public auth, then the authenticated group)
 * 3. JSON 404 fallback
 * 4. Tracing and CORS layers around everything
 */

use axum::{http::Uri, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::chat_routes::configure_chat_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_chat_routes(Router::new());
    let router = configure_api_routes(router, app_state.clone());

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

async fn not_found(uri: Uri) -> BackendError {
    BackendError::not_found(format!("No route for {}", uri.path()))
}
