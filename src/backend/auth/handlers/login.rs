/**
 * Login Handler
 *
 * POST /api/login
 *
 * Unknown email and wrong password produce the same 401 so the endpoint
 * cannot be used to enumerate accounts.
 */
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest};
use crate::backend::auth::password::verify_password;
use crate::backend::auth::users::get_user_by_email;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - email or password missing
/// * `401 Unauthorized` - user not found or password incorrect
/// * `500 Internal Server Error` - storage, hash verification or token signing failed
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, BackendError> {
    let Json(request) = body?;
    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return Err(BackendError::validation("Email and password are required"));
    }
    tracing::info!("[Auth] Login request for {}", email);

    let user = get_user_by_email(&state.db_pool, email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("[Auth] Login for unknown email {}", email);
            BackendError::auth(INVALID_CREDENTIALS)
        })?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        tracing::warn!("[Auth] Invalid password for user {}", user.id);
        return Err(BackendError::auth(INVALID_CREDENTIALS));
    }

    let token = state
        .tokens
        .create_token(user.id, &user.email, &user.name)
        .map_err(|e| BackendError::internal(format!("Failed to create token: {}", e)))?;

    tracing::info!("[Auth] User logged in: {} ({})", user.name, user.id);

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: user.summary(),
    }))
}
