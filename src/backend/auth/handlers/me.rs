/**
 * Profile Handlers
 *
 * GET /api/profile and POST /api/profile for the authenticated user.
 * The avatar is stored as a URL; uploading image bytes is not handled here.
 */

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use sqlx::SqlitePool;

use crate::backend::auth::users::{get_user_by_id, update_profile as store_profile};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::messaging::{ProfileResponse, UpdateProfileRequest, UpdateProfileResponse};

const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Get the caller's profile
pub async fn get_profile(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileResponse>, BackendError> {
    let user = get_user_by_id(&pool, user.user_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    Ok(Json(user.profile()))
}

/// Update description and/or avatar URL
///
/// # Errors
///
/// * `400 Bad Request` - description too long or avatar not an http(s) URL
/// * `404 Not Found` - the account no longer exists
pub async fn update_profile(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<UpdateProfileResponse>, BackendError> {
    let Json(request) = body?;

    let description = request.description.as_deref().map(str::trim);
    if let Some(description) = description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(BackendError::validation(format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_LENGTH
            )));
        }
    }

    let avatar = request.avatar.as_deref().map(str::trim);
    if let Some(avatar) = avatar {
        if !avatar.is_empty() && !(avatar.starts_with("http://") || avatar.starts_with("https://")) {
            return Err(BackendError::validation("Avatar must be an http(s) URL"));
        }
    }

    let updated = store_profile(&pool, user.user_id, description, avatar)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    tracing::info!("[Auth] Profile updated for user {}", user.user_id);

    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully".to_string(),
        user: updated.profile(),
    }))
}
