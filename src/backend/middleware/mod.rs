//! Middleware Module
//!
//! - **`auth`** - Bearer token middleware and the `AuthUser` extractor
//!
//! ```rust,no_run
//! use axum::{middleware, routing::get, Router};
//! use duochat::backend::middleware::auth_middleware;
//! use duochat::backend::server::state::AppState;
//!
//! # fn example(state: AppState) -> Router<AppState> {
//! Router::new()
//!     .route("/api/profile", get(|| async { "ok" }))
//!     .route_layer(middleware::from_fn_with_state(state, auth_middleware))
//! # }
//! ```

pub mod auth;

pub use auth::{auth_middleware, bearer_token, AuthUser, AuthenticatedUser};
