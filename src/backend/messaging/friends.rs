//! Friend list and user search handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use sqlx::SqlitePool;

use super::db;
use crate::backend::auth::users::{get_user_by_id, search_users as find_users};
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::event::parse_identity;
use crate::shared::messaging::{AddFriendRequest, UserSearchQuery, UserSummary};

/// Search other users by name (`GET /api/users?search=`)
pub async fn search_users(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    query: Result<Query<UserSearchQuery>, QueryRejection>,
) -> Result<Json<Vec<UserSummary>>, BackendError> {
    let Query(params) = query?;
    let users = find_users(&pool, &params.search, user.user_id).await?;
    Ok(Json(users.iter().map(|u| u.summary()).collect()))
}

/// The caller's friends
pub async fn get_friends(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<UserSummary>>, BackendError> {
    let friends = db::get_friends_for_user(&pool, user.user_id).await?;
    Ok(Json(friends.iter().map(|u| u.summary()).collect()))
}

/// Add a user to the caller's friend list
///
/// # Errors
///
/// * `400 Bad Request` - missing id, adding yourself, or already a friend
/// * `404 Not Found` - no such user
pub async fn add_friend(
    State(pool): State<SqlitePool>,
    AuthUser(user): AuthUser,
    body: Result<Json<AddFriendRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserSummary>), BackendError> {
    let Json(request) = body?;
    let friend_id = parse_identity("userId", request.user_id.as_deref())?;
    if friend_id == user.user_id {
        return Err(BackendError::conflict("Cannot add yourself as a friend"));
    }

    let friend = get_user_by_id(&pool, friend_id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    if !db::add_friend(&pool, user.user_id, friend.id).await? {
        return Err(BackendError::conflict("Already a friend"));
    }

    tracing::info!("[Messaging] {} added {} as a friend", user.user_id, friend.id);
    Ok((StatusCode::CREATED, Json(friend.summary())))
}
