/**
 * Authentication Middleware
 *
 * Protects the REST routes that act on behalf of a user. The bearer token is
 * verified, the user must still exist, and the caller is attached to the
 * request extensions for the `AuthUser` extractor.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

/// Read the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BackendError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BackendError::auth("Missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| BackendError::auth("Invalid Authorization header format"))
}

/// Authentication middleware
///
/// 1. Extracts JWT token from the Authorization header
/// 2. Verifies the token and parses the user ID
/// 3. Checks the user still exists
/// 4. Attaches `AuthenticatedUser` to request extensions
///
/// Every failure is a 401 with the JSON error body.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(request.headers()).inspect_err(|e| {
        tracing::warn!("[Auth] {}", e);
    })?;

    let user_id = app_state.tokens.user_id_from_token(token).inspect_err(|e| {
        tracing::warn!("[Auth] {}", e);
    })?;

    let user = get_user_by_id(&app_state.db_pool, user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("[Auth] Token for unknown user {}", user_id);
            BackendError::auth("User not found")
        })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: user.id,
        email: user.email,
        name: user.name,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for the user attached by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::auth("Authentication required")
            })?;

        Ok(AuthUser(user))
    }
}
