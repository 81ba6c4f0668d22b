/**
 * Register Handler
 *
 * POST /api/register
 *
 * # Registration Process
 *
 * 1. Validate name, email format and password length
 * 2. Hash password using bcrypt at the configured cost
 * 3. Create user; a duplicate email is a conflict
 * 4. Generate JWT token and return it with the user summary
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};

use crate::backend::auth::handlers::types::{AuthResponse, RegisterRequest};
use crate::backend::auth::password::hash_password;
use crate::backend::auth::users::{create_user, is_unique_violation};
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

const MAX_NAME_LENGTH: usize = 50;
const MIN_PASSWORD_LENGTH: usize = 8;

fn validate(request: &RegisterRequest) -> Result<(), BackendError> {
    let name = request.name.trim();
    if name.is_empty() || request.email.trim().is_empty() || request.password.is_empty() {
        return Err(BackendError::validation("Name, email and password are required"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(BackendError::validation(format!(
            "Name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    if !request.email.contains('@') {
        return Err(BackendError::validation("Invalid email format"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(BackendError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Register handler
///
/// # Errors
///
/// * `400 Bad Request` - missing fields, bad email, short password, or the
///   email is already registered
/// * `500 Internal Server Error` - hashing, storage or token signing failed
///
/// # Example Request
///
/// ```http
/// POST /api/register HTTP/1.1
/// Content-Type: application/json
///
/// {"name": "Ada", "email": "ada@example.com", "password": "analytical"}
/// ```
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), BackendError> {
    let Json(request) = body?;
    validate(&request)?;

    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();
    tracing::info!("[Auth] Register request for {}", email);

    let password_hash = hash_password(request.password, state.config.password_hash_cost).await?;

    let user = create_user(&state.db_pool, &name, &email, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                tracing::warn!("[Auth] Email already registered: {}", email);
                BackendError::conflict("User already exists")
            } else {
                BackendError::from(e)
            }
        })?;

    let token = state
        .tokens
        .create_token(user.id, &user.email, &user.name)
        .map_err(|e| BackendError::internal(format!("Failed to create token: {}", e)))?;

    tracing::info!("[Auth] User created: {} ({})", user.name, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: user.summary(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_validate() {
        assert!(validate(&request("Ada", "ada@example.com", "password123")).is_ok());
        assert!(validate(&request("", "ada@example.com", "password123")).is_err());
        assert!(validate(&request("Ada", "ada.example.com", "password123")).is_err());
        assert!(validate(&request("Ada", "ada@example.com", "short")).is_err());
        assert!(validate(&request(&"x".repeat(51), "ada@example.com", "password123")).is_err());
    }
}
