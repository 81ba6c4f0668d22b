//! User-facing views of accounts, friends and profiles.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public view of a user in search results and friend lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// The caller's own profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub description: Option<String>,
}

/// Body of `POST /api/profile`; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub description: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: ProfileResponse,
}

/// Body of `POST /api/friends`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFriendRequest {
    pub user_id: Option<String>,
}

/// Query of `GET /api/users`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSearchQuery {
    #[serde(default)]
    pub search: String,
}
